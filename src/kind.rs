use std::fmt;

/// The JSON type of a [`Value`](crate::Value).
///
/// `Void` is the sentinel for "no value"; it's what a reader hands back
/// once an object/array iteration runs out of elements, or once the reader
/// is poisoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
  #[default]
  Void,
  Integer,
  Float,
  Boolean,
  Null,
  String,
  Object,
  Array,
}

impl ValueKind {
  /// A short, lowercase name, used in diagnostics (`"expected object, array,
  /// number or string"` style messages build on these).
  pub const fn name(self) -> &'static str {
    match self {
      ValueKind::Void => "void",
      ValueKind::Integer => "integer",
      ValueKind::Float => "float",
      ValueKind::Boolean => "boolean",
      ValueKind::Null => "null",
      ValueKind::String => "string",
      ValueKind::Object => "object",
      ValueKind::Array => "array",
    }
  }

  pub const fn is_void(self) -> bool {
    matches!(self, ValueKind::Void)
  }

  pub const fn is_container(self) -> bool {
    matches!(self, ValueKind::Object | ValueKind::Array)
  }
}

impl fmt::Display for ValueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
