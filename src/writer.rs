//! A structured JSON writer mirroring [`crate::reader::Reader`]'s shape:
//! depth-tracked container state, a latched error, and an output sink.

use std::io;

use crate::fixed::FixedMsg;

const ERR_MAX: usize = 128;

/// Whether the container at some depth is an array or an object; controls
/// whether a key is emitted before each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
  Array,
  Object,
}

/// Where a [`Writer`] sends its output bytes.
pub trait Sink {
  fn write(&mut self, buf: &[u8]) -> io::Result<()>;
}

impl<W: io::Write> Sink for W {
  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    io::Write::write_all(self, buf)
  }
}

/// Adapts an `FnMut(&[u8]) -> io::Result<()>` closure into a [`Sink`],
/// mirroring the original's callback-based `out` field.
pub struct FnSink<F>(F);

impl<F: FnMut(&[u8]) -> io::Result<()>> Sink for FnSink<F> {
  fn write(&mut self, buf: &[u8]) -> io::Result<()> {
    (self.0)(buf)
  }
}

/// Tunable limits for a [`Writer`].
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
  /// Maximum object/array nesting depth before writing poisons with
  /// "Max depth exceeded".
  pub max_depth: usize,
}

impl Default for WriterConfig {
  fn default() -> Self {
    WriterConfig { max_depth: 128 }
  }
}

/// A pull-the-opposite-way JSON writer: the caller drives a sequence of
/// `obj_start`/`arr_start`/`*_add`/`obj_finish`/`arr_finish` calls and the
/// writer emits well-formed JSON to its sink, tracking commas and key
/// placement automatically.
///
/// Once any operation fails, every later call is a no-op (§4.8); call
/// [`Writer::finish`] to observe the cumulative result.
pub struct Writer<S> {
  sink: S,
  config: WriterConfig,
  stack: Vec<(Container, bool)>,
  err: FixedMsg<ERR_MAX>,
  poisoned: bool,
}

impl<S: Sink> Writer<S> {
  pub fn new(sink: S) -> Self {
    Self::with_config(sink, WriterConfig::default())
  }

  pub fn with_config(sink: S, config: WriterConfig) -> Self {
    Writer {
      sink,
      config,
      stack: Vec::with_capacity(config.max_depth.min(32)),
      err: FixedMsg::new(),
      poisoned: false,
    }
  }

  pub fn is_poisoned(&self) -> bool {
    self.poisoned
  }

  pub fn error(&self) -> &str {
    self.err.as_str()
  }

  fn poison(&mut self, msg: &str) {
    if self.poisoned {
      return;
    }
    self.poisoned = true;
    self.err.clear();
    use std::fmt::Write;
    let _ = self.err.write_str(msg);
    log::debug!("writer poisoned: {}", msg);
  }

  fn raw(&mut self, bytes: &[u8]) {
    if self.poisoned {
      return;
    }
    if self.sink.write(bytes).is_err() {
      self.poison("Write failed");
    }
  }

  /// Emits the separating `,` if this isn't the first element at the
  /// current depth, then flips that depth's first-element flag.
  fn pre_value(&mut self) {
    if let Some((_, first)) = self.stack.last_mut() {
      if !*first {
        self.raw(b",");
      } else {
        *first = false;
      }
    }
  }

  fn write_key(&mut self, id: &str) {
    match self.stack.last() {
      Some((Container::Object, _)) => {
        if id.is_empty() {
          self.poison("Expected non-empty key in object");
          return;
        }
        self.raw(b"\"");
        self.write_escaped(id);
        self.raw(b"\":");
      }
      Some((Container::Array, _)) => {
        if !id.is_empty() {
          self.poison("Expected empty key in array");
        }
      }
      None => {
        if !id.is_empty() {
          self.poison("Expected empty key at top level");
        }
      }
    }
  }

  fn write_escaped(&mut self, s: &str) {
    for &b in s.as_bytes() {
      match b {
        b'"' => self.raw(b"\\\""),
        b'\\' => self.raw(b"\\\\"),
        0x08 => self.raw(b"\\b"),
        0x0C => self.raw(b"\\f"),
        b'\n' => self.raw(b"\\n"),
        b'\r' => self.raw(b"\\r"),
        b'\t' => self.raw(b"\\t"),
        0x00..=0x1F => {
          let mut buf = [0u8; 6];
          let hex = format_hex_escape(&mut buf, b);
          self.raw(hex);
        }
        _ => self.raw(&[b]),
      }
    }
  }

  fn begin_value(&mut self, id: &str) -> bool {
    if self.poisoned {
      return false;
    }
    self.pre_value();
    self.write_key(id);
    !self.poisoned
  }

  /// Opens an object; `id` is the key under which it's nested (empty for
  /// array elements or the document root).
  pub fn obj_start(&mut self, id: &str) {
    if !self.begin_value(id) {
      return;
    }
    if self.stack.len() >= self.config.max_depth {
      self.poison("Max depth exceeded");
      return;
    }
    self.raw(b"{");
    self.stack.push((Container::Object, true));
  }

  pub fn obj_finish(&mut self) {
    if self.poisoned {
      return;
    }
    match self.stack.pop() {
      Some((Container::Object, _)) => self.raw(b"}"),
      Some((Container::Array, _)) => {
        self.poison("Expected array finish, got object finish")
      }
      None => self.poison("No object to finish"),
    }
  }

  pub fn arr_start(&mut self, id: &str) {
    if !self.begin_value(id) {
      return;
    }
    if self.stack.len() >= self.config.max_depth {
      self.poison("Max depth exceeded");
      return;
    }
    self.raw(b"[");
    self.stack.push((Container::Array, true));
  }

  pub fn arr_finish(&mut self) {
    if self.poisoned {
      return;
    }
    match self.stack.pop() {
      Some((Container::Array, _)) => self.raw(b"]"),
      Some((Container::Object, _)) => {
        self.poison("Expected object finish, got array finish")
      }
      None => self.poison("No array to finish"),
    }
  }

  pub fn null_add(&mut self, id: &str) {
    if !self.begin_value(id) {
      return;
    }
    self.raw(b"null");
  }

  pub fn int_add(&mut self, id: &str, val: i64) {
    if !self.begin_value(id) {
      return;
    }
    let text = val.to_string();
    self.raw(text.as_bytes());
  }

  pub fn bool_add(&mut self, id: &str, val: bool) {
    if !self.begin_value(id) {
      return;
    }
    self.raw(if val { b"true" } else { b"false" });
  }

  /// Adds a float value. Non-finite values (`NaN`/`Infinity`) have no
  /// JSON representation and poison the writer rather than emitting
  /// invalid output.
  pub fn float_add(&mut self, id: &str, val: f64) {
    if !self.begin_value(id) {
      return;
    }
    if !val.is_finite() {
      self.poison("Non-finite float has no JSON representation");
      return;
    }
    // `{:?}` (Debug), not `{}` (Display): Display on `42.0_f64` prints
    // `42`, which round-trips back as an Integer and loses the
    // value's kind. Debug always keeps a fractional part or exponent.
    let text = format!("{:?}", val);
    self.raw(text.as_bytes());
  }

  pub fn str_add(&mut self, id: &str, val: &str) {
    if !self.begin_value(id) {
      return;
    }
    self.raw(b"\"");
    self.write_escaped(val);
    self.raw(b"\"");
  }

  /// Finalizes the writer: errors if any container is still open, then
  /// reports the cumulative error (if any) to `err_out` and returns it.
  pub fn finish(&mut self, err_out: &mut dyn io::Write) -> Result<(), &str> {
    if !self.poisoned && !self.stack.is_empty() {
      self.poison("Unclosed object or array at finish");
    }
    if self.poisoned {
      log::warn!("writer finished with error: {}", self.err.as_str());
      let _ = writeln!(err_out, "Writer error\n{}", self.err.as_str());
      Err(self.err.as_str())
    } else {
      log::trace!("writer finished cleanly");
      Ok(())
    }
  }

  /// Unwraps the writer, handing back its sink. Typical after
  /// [`Writer::finish`] when the sink (e.g. a `Vec<u8>`) is itself the
  /// thing the caller wants.
  pub fn into_inner(self) -> S {
    self.sink
  }
}

impl<W: io::Write> Writer<W> {
  /// Adapts any [`std::io::Write`] into a writer sink, the idiomatic
  /// equivalent of the original's file-path-specific
  /// `ujson_writer_file_open` (§10.4).
  pub fn to_writer(w: W) -> Self {
    Writer::new(w)
  }
}

fn format_hex_escape(buf: &mut [u8; 6], b: u8) -> &[u8] {
  const HEX: &[u8; 16] = b"0123456789abcdef";
  buf[0] = b'\\';
  buf[1] = b'u';
  buf[2] = b'0';
  buf[3] = b'0';
  buf[4] = HEX[(b >> 4) as usize];
  buf[5] = HEX[(b & 0xF) as usize];
  buf
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn rendered(build: impl FnOnce(&mut Writer<Vec<u8>>)) -> String {
    let mut w = Writer::new(Vec::new());
    build(&mut w);
    let mut err = Vec::new();
    w.finish(&mut err).unwrap();
    String::from_utf8(w.sink).unwrap()
  }

  #[test]
  fn emits_a_flat_object() {
    let out = rendered(|w| {
      w.obj_start("");
      w.str_add("name", "ada");
      w.int_add("age", 36);
      w.bool_add("active", true);
      w.null_add("nickname");
      w.obj_finish();
    });
    assert_eq!(out, r#"{"name":"ada","age":36,"active":true,"nickname":null}"#);
  }

  #[test]
  fn emits_an_array_with_no_keys() {
    let out = rendered(|w| {
      w.arr_start("");
      w.int_add("", 1);
      w.int_add("", 2);
      w.int_add("", 3);
      w.arr_finish();
    });
    assert_eq!(out, "[1,2,3]");
  }

  #[test]
  fn nested_containers_commas_and_keys_are_all_correct() {
    let out = rendered(|w| {
      w.obj_start("");
      w.arr_start("items");
      w.obj_start("");
      w.int_add("id", 1);
      w.obj_finish();
      w.obj_start("");
      w.int_add("id", 2);
      w.obj_finish();
      w.arr_finish();
      w.obj_finish();
    });
    assert_eq!(out, r#"{"items":[{"id":1},{"id":2}]}"#);
  }

  #[test]
  fn escapes_control_characters_and_quotes() {
    let out = rendered(|w| {
      w.obj_start("");
      w.str_add("msg", "line1\nline2\ttab\"quote\"\x01");
      w.obj_finish();
    });
    assert_eq!(out, r#"{"msg":"line1\nline2\ttab\"quote\""}"#);
  }

  #[test]
  fn float_always_keeps_a_fractional_marker() {
    let out = rendered(|w| {
      w.obj_start("");
      w.float_add("whole", 42.0);
      w.float_add("frac", 0.5);
      w.obj_finish();
    });
    assert_eq!(out, r#"{"whole":42.0,"frac":0.5}"#);
  }

  #[test]
  fn non_finite_float_poisons_instead_of_writing_invalid_json() {
    let mut w = Writer::new(Vec::new());
    w.obj_start("");
    w.float_add("x", f64::NAN);
    assert!(w.is_poisoned());
    assert_eq!(w.error(), "Non-finite float has no JSON representation");
  }

  #[test]
  fn unclosed_container_poisons_at_finish() {
    let mut w = Writer::new(Vec::new());
    w.obj_start("");
    w.int_add("a", 1);
    let mut err = Vec::new();
    assert!(w.finish(&mut err).is_err());
    assert_eq!(w.error(), "Unclosed object or array at finish");
  }

  #[test]
  fn mismatched_finish_poisons() {
    let mut w = Writer::new(Vec::new());
    w.obj_start("");
    w.arr_finish();
    assert!(w.is_poisoned());
    assert_eq!(w.error(), "Expected object finish, got array finish");
  }

  #[test]
  fn empty_key_in_object_poisons() {
    let mut w = Writer::new(Vec::new());
    w.obj_start("");
    w.int_add("", 1);
    assert!(w.is_poisoned());
    assert_eq!(w.error(), "Expected non-empty key in object");
  }

  #[test]
  fn once_poisoned_every_call_is_a_no_op() {
    let mut w = Writer::new(Vec::new());
    w.obj_start("");
    w.arr_finish();
    assert!(w.is_poisoned());
    w.int_add("anything", 1);
    w.str_add("whatever", "x");
    assert_eq!(w.sink.len(), 1); // only the opening "{"
  }

  #[test]
  fn depth_limit_poisons_past_the_configured_maximum() {
    let mut w = Writer::with_config(Vec::new(), WriterConfig { max_depth: 1 });
    w.obj_start("");
    w.arr_start("nested");
    assert!(w.is_poisoned());
    assert_eq!(w.error(), "Max depth exceeded");
  }

  #[test]
  fn to_writer_adapts_any_io_write_sink() {
    let mut buf = Vec::new();
    {
      let mut w = Writer::to_writer(&mut buf);
      w.obj_start("");
      w.int_add("n", 1);
      w.obj_finish();
      let mut err = Vec::new();
      w.finish(&mut err).unwrap();
    }
    assert_eq!(buf, br#"{"n":1}"#);
  }
}
