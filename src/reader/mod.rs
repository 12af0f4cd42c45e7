//! Pull-style, allocation-light JSON reader.
//!
//! A [`Reader`] walks a byte slice without ever allocating on its own: scalar
//! values are decoded into caller-supplied scratch buffers, and object keys
//! live in a small inline [`FixedId`]. Once any operation fails, the reader
//! is permanently poisoned (§3): every later call returns the `Void`
//! sentinel immediately instead of re-entering the scanner.

mod iter;
mod number;
mod string;

pub use iter::{ArrayIter, ObjectIter, OwnedValue};

use std::fmt;

use crate::fixed::FixedMsg;
use crate::kind::ValueKind;
use crate::list::KeyList;
use crate::value::{Payload, Value};

const ERR_MAX: usize = 128;

/// Tunable limits for a [`Reader`], split out so a `Reader` itself doesn't
/// need type parameters and so tests can probe limits in isolation.
#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
  /// Maximum object/array nesting depth before traversal poisons with
  /// "Recursion too deep".
  pub max_depth: usize,
}

impl ReaderConfig {
  pub const fn new(max_depth: usize) -> Self {
    ReaderConfig { max_depth }
  }
}

impl Default for ReaderConfig {
  fn default() -> Self {
    ReaderConfig { max_depth: 128 }
  }
}

/// One level of open-container bookkeeping used to know, on `check_end`,
/// whether the reader is closing an object or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
  Object,
  Array,
}

/// A pull parser over an in-memory JSON buffer.
///
/// `buf` is expected to be NUL-padded at least one byte past its logical
/// end (the [`crate::loader`] module guarantees this); `eat_ws` relies on
/// that sentinel to avoid a separate bounds check on every byte.
pub struct Reader<'src> {
  buf: &'src [u8],
  off: usize,
  config: ReaderConfig,
  depth: Vec<Frame>,
  err: FixedMsg<ERR_MAX>,
  poisoned: bool,
}

impl<'src> Reader<'src> {
  pub fn new(buf: &'src [u8]) -> Self {
    Self::with_config(buf, ReaderConfig::default())
  }

  pub fn with_config(buf: &'src [u8], config: ReaderConfig) -> Self {
    log::trace!("new reader over {} bytes, max_depth={}", buf.len(), config.max_depth);
    Reader {
      buf,
      off: 0,
      config,
      depth: Vec::with_capacity(config.max_depth.min(32)),
      err: FixedMsg::new(),
      poisoned: false,
    }
  }

  /// `true` once any operation has failed; every subsequent call is then
  /// a no-op that returns the `Void` sentinel.
  pub fn is_poisoned(&self) -> bool {
    self.poisoned
  }

  /// The latched error message, or `""` if nothing has failed yet.
  pub fn error(&self) -> &str {
    self.err.as_str()
  }

  pub fn offset(&self) -> usize {
    self.off
  }

  fn slice(&self, start: usize, end: usize) -> &'src [u8] {
    &self.buf[start..end]
  }

  // ---- scanner primitives ----------------------------------------

  fn is_empty(&self) -> bool {
    self.off >= self.buf.len()
  }

  fn peek(&self, ahead: usize) -> u8 {
    self.buf.get(self.off + ahead).copied().unwrap_or(0)
  }

  fn consume(&mut self) -> u8 {
    let b = self.peek(0);
    if self.off < self.buf.len() {
      self.off += 1;
    }
    b
  }

  fn accept(&mut self, expected: u8) -> bool {
    if self.peek(0) == expected {
      self.consume();
      true
    } else {
      false
    }
  }

  fn accept_literal(&mut self, lit: &[u8]) -> bool {
    if self.off + lit.len() > self.buf.len() {
      return false;
    }
    if &self.buf[self.off..self.off + lit.len()] == lit {
      self.off += lit.len();
      true
    } else {
      false
    }
  }

  fn eat_ws(&mut self) {
    loop {
      match self.peek(0) {
        b' ' | b'\t' | b'\r' | b'\n' => {
          self.off += 1;
        }
        _ => break,
      }
    }
  }

  // ---- poisoning ---------------------------------------------------

  /// Latches `msg` as the error, if not already poisoned (first failure
  /// wins, matching the original's `check_err` short-circuit).
  fn poison(&mut self, msg: &str) {
    if self.poisoned {
      return;
    }
    self.poisoned = true;
    self.err.clear();
    use std::fmt::Write;
    let _ = self.err.write_str(msg);
    log::debug!("reader poisoned at offset {}: {}", self.off, msg);
  }

  fn poison_fmt(&mut self, args: fmt::Arguments<'_>) {
    if self.poisoned {
      return;
    }
    self.poisoned = true;
    self.err.clear();
    use std::fmt::Write;
    let _ = self.err.write_fmt(args);
    log::debug!("reader poisoned at offset {}: {}", self.off, self.err.as_str());
  }

  // ---- classification ------------------------------------------------

  /// The kind of the value sitting at the cursor, without consuming it.
  /// Poisons (returning `Void`) if the next byte doesn't start any JSON
  /// value.
  pub fn next_type(&mut self) -> ValueKind {
    self.peek_kind()
  }

  /// Classifies the value at the cursor, requiring it to be an object or
  /// array — the only two legal JSON document roots. Poisons with
  /// "JSON can start only with array or object" otherwise.
  pub fn start(&mut self) -> ValueKind {
    let kind = self.peek_kind();
    if self.poisoned {
      return ValueKind::Void;
    }
    if !kind.is_container() {
      self.poison("JSON can start only with array or object");
      return ValueKind::Void;
    }
    kind
  }

  /// The kind of the value sitting at the cursor, without consuming
  /// anything, or `Void` on a parse error (which also poisons).
  fn peek_kind(&mut self) -> ValueKind {
    self.eat_ws();
    match self.peek(0) {
      b'"' => ValueKind::String,
      b'{' => ValueKind::Object,
      b'[' => ValueKind::Array,
      b't' | b'f' => ValueKind::Boolean,
      b'n' => ValueKind::Null,
      b'-' | b'0'..=b'9' => number::peek_num_kind(self),
      _ => {
        self.poison("Expected value");
        ValueKind::Void
      }
    }
  }

  /// Reads the scalar or container marker at the cursor into `out`,
  /// given its already-classified `kind`. For an object or array this
  /// only records the classification — the opening bracket is left
  /// unconsumed (§4.5: the `sub_off` restart point), and the caller must
  /// then drive iteration into the nested container via `obj_first`/
  /// `arr_first`, or skip it via `obj_skip`/`arr_skip`. Scalars are fully
  /// decoded.
  ///
  /// `out` is generic over the scratch buffer's own lifetime `'b` rather
  /// than the source buffer's `'src`: a decoded string payload borrows
  /// from `scratch`, not from `self.buf`, so tying it to `'src` would
  /// claim a borrow this function never actually holds.
  fn get_value<'b>(&mut self, kind: ValueKind, scratch: &'b mut [u8], out: &mut Value<'b>) {
    out.kind = kind;
    match kind {
      ValueKind::String => {
        let sink = string::StrSink::capture(scratch);
        match string::decode(self, sink) {
          Some(len) => {
            out.payload = Payload::Str(bytes_to_str(&scratch[..len]));
          }
          None => out.kind = ValueKind::Void,
        }
      }
      ValueKind::Integer => match number::decode_int(self) {
        Some(v) => out.payload = Payload::Int(v),
        None => out.kind = ValueKind::Void,
      },
      ValueKind::Float => match number::decode_float(self) {
        Some(v) => out.payload = Payload::Float(v),
        None => out.kind = ValueKind::Void,
      },
      ValueKind::Boolean => match number::decode_bool(self) {
        Some(v) => out.payload = Payload::Bool(v),
        None => out.kind = ValueKind::Void,
      },
      ValueKind::Null => {
        if self.accept_literal(b"null") {
          out.payload = Payload::None;
        } else {
          self.poison("Invalid literal, expected null");
          out.kind = ValueKind::Void;
        }
      }
      ValueKind::Object | ValueKind::Array => {}
      ValueKind::Void => {}
    }
  }

  /// Reads a raw (unescaped) object key into `out.id`. JSON object keys
  /// are always plain quoted strings in this grammar's keys position; no
  /// escape processing is performed (§9: matches the original's
  /// `copy_id_str`, which is a raw byte copy bounded by the closing
  /// quote).
  fn read_id<'b>(&mut self, out: &mut Value<'b>) -> bool {
    self.eat_ws();
    if !self.accept(b'"') {
      self.poison("Expected string");
      return false;
    }
    out.id.clear();
    loop {
      if self.is_empty() {
        self.poison("Unterminated string");
        return false;
      }
      let b = self.consume();
      if b == b'"' {
        return true;
      }
      if !out.id.push(b) {
        self.poison("Id buffer too short!");
        return false;
      }
    }
  }

  // ---- container traversal ------------------------------------------

  fn push_depth(&mut self, frame: Frame) -> bool {
    if self.depth.len() >= self.config.max_depth {
      self.poison("Recursion too deep");
      return false;
    }
    self.depth.push(frame);
    true
  }

  fn pop_depth(&mut self, expect: Frame) {
    debug_assert_eq!(self.depth.last().copied(), Some(expect));
    self.depth.pop();
  }

  /// True if the cursor (after whitespace) sits on `close`, in which case
  /// it's consumed and the frame popped; used by `*_first` to special-
  /// case an immediately-empty container.
  fn check_end<'b>(&mut self, close: u8, frame: Frame, out: &mut Value<'b>) -> bool {
    self.eat_ws();
    if self.poisoned {
      *out = Value::void();
      return true;
    }
    if self.is_empty() {
      self.poison("Unexpected end of input");
      *out = Value::void();
      return true;
    }
    if self.peek(0) == close {
      self.consume();
      self.pop_depth(frame);
      self.eat_trailing_nul();
      *out = Value::void();
      return true;
    }
    false
  }

  /// After a closing bracket, elides a whitespace run and then a single
  /// embedded NUL byte, if one is actually present in the buffer rather
  /// than just past its end (§4.6, §10.5). The loader always pads its
  /// buffer with one trailing NUL past the file's logical length; this
  /// lets a reader seated on such a buffer land its cursor exactly at
  /// `buf.len()` once the outermost container closes, rather than one
  /// byte short of it.
  fn eat_trailing_nul(&mut self) {
    self.eat_ws();
    if self.off < self.buf.len() && self.buf[self.off] == 0 {
      self.off += 1;
    }
  }

  /// Opens the container and handles the immediately-empty case. Returns
  /// `true` when `out` is already final (error, or the container closed
  /// right away) — the caller must not go on to read a first member/
  /// element in that case — and `false` when the opening bracket was
  /// consumed and the caller should proceed.
  fn any_first<'b>(&mut self, open: u8, close: u8, frame: Frame, out: &mut Value<'b>) -> bool {
    *out = Value::void();
    self.eat_ws();
    if self.poisoned || !self.accept(open) {
      if !self.poisoned {
        self.poison("Expected object or array");
      }
      return true;
    }
    if !self.push_depth(frame) {
      return true;
    }
    self.check_end(close, frame, out)
  }

  /// After a member/element has just been read: either the container
  /// ends here (consumed, `out` set to `Void`, returns `false`), or a
  /// `,` separates this from the next one (returns `true` for the
  /// caller to read that next one).
  fn obj_pre_next<'b>(&mut self, out: &mut Value<'b>) -> bool {
    if self.check_end(b'}', Frame::Object, out) {
      return false;
    }
    self.eat_ws();
    if !self.accept(b',') {
      self.poison("Expected , or }");
      *out = Value::void();
      return false;
    }
    true
  }

  fn arr_pre_next<'b>(&mut self, out: &mut Value<'b>) -> bool {
    if self.check_end(b']', Frame::Array, out) {
      return false;
    }
    self.eat_ws();
    if !self.accept(b',') {
      self.poison("Expected , or ]");
      *out = Value::void();
      return false;
    }
    true
  }

  fn finish_value<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    self.eat_ws();
    let kind = self.peek_kind();
    if self.poisoned {
      *out = Value::void();
      return;
    }
    self.get_value(kind, scratch, out);
    if self.poisoned {
      *out = Value::void();
    }
  }

  // ---- public API: object traversal ----------------------------------

  /// Starts an object at the cursor. `out` is `Void` both on an
  /// immediately-empty object (`{}`) and on error; distinguish the two
  /// with [`Reader::is_poisoned`].
  pub fn obj_first<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    if self.any_first(b'{', b'}', Frame::Object, out) {
      return;
    }
    self.read_member(scratch, out);
  }

  pub fn obj_next<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    if self.poisoned {
      *out = Value::void();
      return;
    }
    if !self.obj_pre_next(out) {
      return;
    }
    self.read_member(scratch, out);
  }

  fn read_member<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    if !self.read_id(out) {
      *out = Value::void();
      return;
    }
    self.eat_ws();
    if !self.accept(b':') {
      self.poison("Expected :");
      *out = Value::void();
      return;
    }
    self.finish_value(scratch, out);
  }

  /// Like [`Reader::obj_first`], but skips members per `list`'s mode
  /// until it finds one that's admitted (or the object ends).
  pub fn obj_first_filtered<'b>(
    &mut self,
    scratch: &'b mut [u8],
    list: &KeyList<'_>,
    out: &mut Value<'b>,
  ) {
    self.obj_first(scratch, out);
    self.skip_until_admitted(scratch, list, out);
  }

  pub fn obj_next_filtered<'b>(
    &mut self,
    scratch: &'b mut [u8],
    list: &KeyList<'_>,
    out: &mut Value<'b>,
  ) {
    self.obj_next(scratch, out);
    self.skip_until_admitted(scratch, list, out);
  }

  fn skip_until_admitted<'b>(
    &mut self,
    scratch: &'b mut [u8],
    list: &KeyList<'_>,
    out: &mut Value<'b>,
  ) {
    while out.is_valid() && !list.admits(out.id()) {
      if out.kind.is_container() {
        self.skip_container(out.kind);
        if self.poisoned {
          *out = Value::void();
          return;
        }
      }
      self.obj_next(scratch, out);
    }
  }

  // ---- public API: array traversal -----------------------------------

  pub fn arr_first<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    if self.any_first(b'[', b']', Frame::Array, out) {
      return;
    }
    self.finish_value(scratch, out);
  }

  pub fn arr_next<'b>(&mut self, scratch: &'b mut [u8], out: &mut Value<'b>) {
    if self.poisoned {
      *out = Value::void();
      return;
    }
    if !self.arr_pre_next(out) {
      return;
    }
    self.finish_value(scratch, out);
  }

  // ---- skipping --------------------------------------------------------

  /// Discards an entire container classified as `kind`, given that its
  /// opening bracket sits unconsumed at the cursor (exactly the state
  /// `get_value` leaves an object/array value in). Used by the public
  /// `obj_skip`/`arr_skip`, by `skip_value` for nested containers, and
  /// internally by filtered iteration to step over unwanted subtrees.
  fn skip_container(&mut self, kind: ValueKind) {
    match kind {
      ValueKind::Object => {
        if !self.accept(b'{') {
          self.poison("Expected object or array");
          return;
        }
        if self.push_depth(Frame::Object) {
          self.skip_object_body();
        }
      }
      ValueKind::Array => {
        if !self.accept(b'[') {
          self.poison("Expected object or array");
          return;
        }
        if self.push_depth(Frame::Array) {
          self.skip_array_body();
        }
      }
      _ => {}
    }
  }

  /// Discards the body of an object whose opening `{` has already been
  /// consumed and whose frame has already been pushed.
  fn skip_object_body(&mut self) {
    let mut probe = Value::void();
    if self.check_end(b'}', Frame::Object, &mut probe) {
      return;
    }
    loop {
      let mut member = Value::void();
      if !self.read_id(&mut member) {
        return;
      }
      self.eat_ws();
      if !self.accept(b':') {
        self.poison("Expected :");
        return;
      }
      self.skip_value();
      if self.poisoned {
        return;
      }
      if !self.obj_pre_next(&mut probe) {
        return;
      }
    }
  }

  /// Discards the body of an array whose opening `[` has already been
  /// consumed and whose frame has already been pushed.
  fn skip_array_body(&mut self) {
    let mut probe = Value::void();
    if self.check_end(b']', Frame::Array, &mut probe) {
      return;
    }
    loop {
      self.skip_value();
      if self.poisoned {
        return;
      }
      if !self.arr_pre_next(&mut probe) {
        return;
      }
    }
  }

  fn skip_value(&mut self) {
    self.eat_ws();
    let kind = self.peek_kind();
    if self.poisoned {
      return;
    }
    match kind {
      ValueKind::String => {
        let _ = string::decode(self, string::StrSink::Discard);
      }
      ValueKind::Integer => {
        number::decode_int(self);
      }
      ValueKind::Float => {
        number::decode_float(self);
      }
      ValueKind::Boolean => {
        number::decode_bool(self);
      }
      ValueKind::Null => {
        if !self.accept_literal(b"null") {
          self.poison("Invalid literal, expected null");
        }
      }
      ValueKind::Object => self.skip_container(ValueKind::Object),
      ValueKind::Array => self.skip_container(ValueKind::Array),
      ValueKind::Void => {}
    }
  }

  /// Skips the balance of the current container: the object sitting at
  /// the cursor, unconsumed opening `{` included. Recurses into nested
  /// objects/arrays without materializing their contents beyond what the
  /// decoders write into throwaway locals.
  pub fn obj_skip(&mut self) {
    if self.poisoned {
      return;
    }
    self.skip_container(ValueKind::Object);
  }

  /// As [`Reader::obj_skip`], for an array sitting at the cursor.
  pub fn arr_skip(&mut self) {
    if self.poisoned {
      return;
    }
    self.skip_container(ValueKind::Array);
  }

  // ---- iterator sugar -------------------------------------------------

  /// An owned-value [`Iterator`] over an object's members, starting at
  /// the cursor. See module docs on [`ObjectIter`] for why this layer
  /// trades the zero-allocation property for ergonomics.
  pub fn object(&mut self) -> ObjectIter<'_, 'src> {
    ObjectIter::new(self, None)
  }

  pub fn object_filtered<'a>(&'a mut self, list: KeyList<'a>) -> ObjectIter<'a, 'src> {
    ObjectIter::new(self, Some(list))
  }

  pub fn array(&mut self) -> ArrayIter<'_, 'src> {
    ArrayIter::new(self)
  }

  // ---- diagnostics ------------------------------------------------

  /// Writes a line-snippet diagnostic for the latched error to `w`, or
  /// does nothing if the reader isn't poisoned.
  pub fn err_print<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
    if !self.poisoned {
      return Ok(());
    }
    crate::diagnostic::err_print(w, self.buf, self.off, self.err.as_str())
  }

  /// Writes a line-snippet warning at the current cursor position to
  /// `w`, without poisoning the reader.
  pub fn warn<W: std::io::Write>(&self, w: &mut W, message: &str) -> std::io::Result<()> {
    crate::diagnostic::warn(w, self.buf, self.off, message)
  }
}

fn bytes_to_str(b: &[u8]) -> &str {
  std::str::from_utf8(b).unwrap_or("")
}
