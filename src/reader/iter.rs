//! Idiomatic [`Iterator`] sugar layered over the raw first/next cursor API.
//!
//! `Iterator::next(&mut self)` can't yield a value borrowing from the
//! iterator's own scratch buffer without generic associated types, so these
//! adaptors own their payloads (`OwnedValue` holds a `String` rather than
//! `&str`). The raw `Reader::obj_first`/`obj_next`/`arr_first`/`arr_next`
//! API remains the zero-allocation path; this layer is deliberately not
//! that, traded for the ability to write a `for` loop.

use crate::kind::ValueKind;
use crate::list::KeyList;
use crate::value::Value;

use super::Reader;

const SCRATCH_LEN: usize = 4096;

/// An owned snapshot of a [`Value`], produced by [`ObjectIter`]/[`ArrayIter`].
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedValue {
  pub id: String,
  pub kind: ValueKind,
  pub int: Option<i64>,
  pub float: Option<f64>,
  pub bool: Option<bool>,
  pub str: Option<String>,
}

impl OwnedValue {
  fn from_borrowed(v: &Value<'_>) -> Self {
    OwnedValue {
      id: v.id().to_string(),
      kind: v.kind(),
      int: v.as_int(),
      float: v.as_float(),
      bool: v.as_bool(),
      str: v.as_str().map(str::to_string),
    }
  }
}

/// Iterator over an object's members, yielding `(key, OwnedValue)` pairs in
/// document order.
pub struct ObjectIter<'r, 'src> {
  reader: &'r mut Reader<'src>,
  list: Option<KeyList<'r>>,
  started: bool,
  scratch: Box<[u8; SCRATCH_LEN]>,
}

impl<'r, 'src> ObjectIter<'r, 'src> {
  pub(super) fn new(reader: &'r mut Reader<'src>, list: Option<KeyList<'r>>) -> Self {
    ObjectIter {
      reader,
      list,
      started: false,
      scratch: Box::new([0u8; SCRATCH_LEN]),
    }
  }
}

impl Iterator for ObjectIter<'_, '_> {
  type Item = OwnedValue;

  fn next(&mut self) -> Option<Self::Item> {
    let mut value = Value::void();
    match (&self.list, self.started) {
      (Some(list), false) => {
        self.reader.obj_first_filtered(&mut *self.scratch, list, &mut value)
      }
      (Some(list), true) => {
        self.reader.obj_next_filtered(&mut *self.scratch, list, &mut value)
      }
      (None, false) => self.reader.obj_first(&mut *self.scratch, &mut value),
      (None, true) => self.reader.obj_next(&mut *self.scratch, &mut value),
    }
    self.started = true;

    if !value.is_valid() {
      return None;
    }
    // A container member's bracket is left unconsumed by the reader
    // (§4.5); this adaptor can't hand back a live nested iterator, so it
    // discards the subtree itself to keep the outer traversal well-formed.
    match value.kind {
      ValueKind::Object => self.reader.obj_skip(),
      ValueKind::Array => self.reader.arr_skip(),
      _ => {}
    }
    Some(OwnedValue::from_borrowed(&value))
  }
}

/// Iterator over an array's elements, yielding [`OwnedValue`]s in document
/// order.
pub struct ArrayIter<'r, 'src> {
  reader: &'r mut Reader<'src>,
  started: bool,
  scratch: Box<[u8; SCRATCH_LEN]>,
}

impl<'r, 'src> ArrayIter<'r, 'src> {
  pub(super) fn new(reader: &'r mut Reader<'src>) -> Self {
    ArrayIter { reader, started: false, scratch: Box::new([0u8; SCRATCH_LEN]) }
  }
}

impl Iterator for ArrayIter<'_, '_> {
  type Item = OwnedValue;

  fn next(&mut self) -> Option<Self::Item> {
    let mut value = Value::void();
    if self.started {
      self.reader.arr_next(&mut *self.scratch, &mut value);
    } else {
      self.reader.arr_first(&mut *self.scratch, &mut value);
      self.started = true;
    }

    if !value.is_valid() {
      return None;
    }
    match value.kind {
      ValueKind::Object => self.reader.obj_skip(),
      ValueKind::Array => self.reader.arr_skip(),
      _ => {}
    }
    Some(OwnedValue::from_borrowed(&value))
  }
}
