//! Allocation-light, pull-style JSON reader and writer.
//!
//! [`Reader`] walks an in-memory JSON document without materializing an
//! intermediate tree: scalar values decode into caller-supplied scratch
//! buffers and object/array traversal is driven by the caller via
//! first/next/skip primitives (or the [`Iterator`] sugar in
//! [`Reader::object`]/[`Reader::array`]). [`Writer`] is the mirror image,
//! emitting well-formed JSON into a caller-supplied sink.
//!
//! Both halves are single-owner and non-shared; neither allocates during
//! steady-state traversal. See the crate's design notes for the handful of
//! places this implementation deliberately diverges from a naive C
//! transliteration (surrogate-pair handling, the 1-byte UTF-8 mask, integer
//! overflow).

mod diagnostic;
mod fixed;
mod kind;
mod list;
mod loader;
mod reader;
mod value;
mod writer;

pub use crate::kind::ValueKind;
pub use crate::list::{list_lookup, KeyList, ListMode};
pub use crate::loader::{load, try_load_bytes, with_reader, LoaderError};
pub use crate::reader::{ArrayIter, ObjectIter, OwnedValue, Reader, ReaderConfig};
pub use crate::value::{Payload, Value, MAX_ID};
pub use crate::writer::{FnSink, Sink, Writer, WriterConfig};
