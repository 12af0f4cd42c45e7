//! Property-based tests for the round-trip and key-lookup laws from
//! spec.md §8: a document read then rewritten decodes back to the same
//! sequence of (kind, id, payload) tuples, and `list_lookup` agrees with a
//! linear scan over the same sorted list.

use proptest::prelude::*;

use flywisp_json::{list_lookup, Reader, Value, ValueKind, Writer};

#[derive(Debug, Clone, PartialEq)]
enum JVal {
  Int(i64),
  Float(f64),
  Bool(bool),
  Null,
  Str(String),
  Arr(Vec<JVal>),
  Obj(Vec<(String, JVal)>),
}

fn leaf() -> impl Strategy<Value = JVal> {
  prop_oneof![
    any::<i32>().prop_map(|v| JVal::Int(v as i64)),
    any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(JVal::Float),
    any::<bool>().prop_map(JVal::Bool),
    Just(JVal::Null),
    "\\PC{0,12}".prop_map(JVal::Str),
  ]
}

fn key() -> impl Strategy<Value = String> {
  "[a-zA-Z][a-zA-Z0-9_]{0,7}"
}

fn jval() -> impl Strategy<Value = JVal> {
  leaf().prop_recursive(3, 32, 4, |inner| {
    prop_oneof![
      prop::collection::vec(inner.clone(), 0..4).prop_map(JVal::Arr),
      prop::collection::vec((key(), inner), 0..4).prop_map(JVal::Obj),
    ]
  })
}

/// Only objects and arrays are legal document roots (spec.md §6's `start`).
fn document() -> impl Strategy<Value = JVal> {
  prop_oneof![
    prop::collection::vec(jval(), 0..4).prop_map(JVal::Arr),
    prop::collection::vec((key(), jval()), 0..4).prop_map(JVal::Obj),
  ]
}

fn write_value(w: &mut Writer<Vec<u8>>, id: &str, v: &JVal) {
  match v {
    JVal::Int(n) => w.int_add(id, *n),
    JVal::Float(f) => w.float_add(id, *f),
    JVal::Bool(b) => w.bool_add(id, *b),
    JVal::Null => w.null_add(id),
    JVal::Str(s) => w.str_add(id, s),
    JVal::Arr(items) => {
      w.arr_start(id);
      for item in items {
        write_value(w, "", item);
      }
      w.arr_finish();
    }
    JVal::Obj(fields) => {
      w.obj_start(id);
      for (k, item) in fields {
        write_value(w, k, item);
      }
      w.obj_finish();
    }
  }
}

fn scalar_of(v: &Value<'_>) -> Option<JVal> {
  match v.kind() {
    ValueKind::Integer => Some(JVal::Int(v.as_int().unwrap())),
    ValueKind::Float => Some(JVal::Float(v.as_float().unwrap())),
    ValueKind::Boolean => Some(JVal::Bool(v.as_bool().unwrap())),
    ValueKind::Null => Some(JVal::Null),
    ValueKind::String => Some(JVal::Str(v.as_str().unwrap().to_string())),
    _ => None,
  }
}

fn read_obj(r: &mut Reader<'_>, scratch: &mut [u8]) -> Vec<(String, JVal)> {
  let mut out = Vec::new();
  let mut v = Value::void();
  r.obj_first(scratch, &mut v);
  while v.is_valid() {
    let id = v.id().to_string();
    let kind = v.kind();
    let val = match scalar_of(&v) {
      Some(s) => s,
      None => match kind {
        ValueKind::Object => JVal::Obj(read_obj(r, scratch)),
        ValueKind::Array => JVal::Arr(read_arr(r, scratch)),
        _ => unreachable!(),
      },
    };
    out.push((id, val));
    r.obj_next(scratch, &mut v);
  }
  out
}

fn read_arr(r: &mut Reader<'_>, scratch: &mut [u8]) -> Vec<JVal> {
  let mut out = Vec::new();
  let mut v = Value::void();
  r.arr_first(scratch, &mut v);
  while v.is_valid() {
    let kind = v.kind();
    let val = match scalar_of(&v) {
      Some(s) => s,
      None => match kind {
        ValueKind::Object => JVal::Obj(read_obj(r, scratch)),
        ValueKind::Array => JVal::Arr(read_arr(r, scratch)),
        _ => unreachable!(),
      },
    };
    out.push(val);
    r.arr_next(scratch, &mut v);
  }
  out
}

fn read_document(buf: &[u8]) -> JVal {
  let mut r = Reader::new(buf);
  let mut scratch = [0u8; 4096];
  let root_kind = r.start();
  let result = match root_kind {
    ValueKind::Object => JVal::Obj(read_obj(&mut r, &mut scratch)),
    ValueKind::Array => JVal::Arr(read_arr(&mut r, &mut scratch)),
    other => panic!("unexpected root kind {other:?}"),
  };
  assert!(!r.is_poisoned(), "reader poisoned: {}", r.error());
  result
}

proptest! {
  #[test]
  fn write_then_read_reproduces_the_same_value_tree(doc in document()) {
    let mut w = Writer::new(Vec::new());
    write_value(&mut w, "", &doc);
    let mut err = Vec::new();
    w.finish(&mut err).expect("writer does not poison on well-formed input");
    let bytes = w.into_inner();

    let round_tripped = read_document(&bytes);
    prop_assert_eq!(round_tripped, doc);
  }

  #[test]
  fn list_lookup_agrees_with_a_linear_scan(
    keys in prop::collection::btree_set("[a-z]{1,5}", 0..20),
    probe in "[a-z]{1,5}",
  ) {
    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
    let expected = keys.iter().position(|&k| k == probe);
    prop_assert_eq!(list_lookup(&keys, &probe), expected);
  }
}
