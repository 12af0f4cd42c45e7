//! File loading: slurps an entire JSON document into memory and hands back
//! a [`Reader`] pre-seated on it.
//!
//! spec.md treats this as an external collaborator, not part of the reader's
//! hard engineering, and documents its contract as collapsing every failure
//! mode to `None` on a standard error sink. [`load`] preserves that exact
//! contract; [`try_load`] is additive, for callers embedding this crate in a
//! larger tool who want to distinguish *why* loading failed.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

use crate::reader::Reader;

/// Why [`try_load`] failed to produce a byte buffer.
#[derive(Debug, Error)]
pub enum LoaderError {
  #[error("failed to open {path}: {source}")]
  Open { path: String, #[source] source: io::Error },
  #[error("failed to read metadata for {path}: {source}")]
  Metadata { path: String, #[source] source: io::Error },
  #[error("failed to read {path}: {source}")]
  Read { path: String, #[source] source: io::Error },
}

/// Reads the entire file at `path` into a freshly allocated buffer, with one
/// trailing NUL byte past its logical length (§4.6, §10.5: `check_end`
/// relies on that sentinel being present for the outermost container).
fn slurp(path: &Path) -> Result<Vec<u8>, LoaderError> {
  let display = path.display().to_string();
  let mut file = File::open(path).map_err(|source| LoaderError::Open { path: display.clone(), source })?;
  let len = file
    .metadata()
    .map_err(|source| LoaderError::Metadata { path: display.clone(), source })?
    .len();
  let mut buf = Vec::with_capacity(len as usize + 1);
  file
    .read_to_end(&mut buf)
    .map_err(|source| LoaderError::Read { path: display.clone(), source })?;
  buf.push(0);
  Ok(buf)
}

/// A `Reader` borrowing straight from the file it was loaded from would be
/// self-referential, which Rust's ownership model doesn't allow; so loading
/// is split into two steps: this owns the buffer, [`Reader::new`] borrows
/// it. Kept private; `load`/`try_load_bytes` below are the documented entry
/// points.
fn load_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, LoaderError> {
  slurp(path.as_ref())
}

/// Loads `path` into memory, logging and returning `None` on any failure
/// (open, stat, or read), matching spec.md §6's documented contract exactly.
///
/// On success, returns the owned NUL-padded buffer; wrap it in
/// [`Reader::new`] (or [`Reader::with_config`]) to start traversing it. The
/// buffer must outlive the reader.
pub fn load(path: impl AsRef<Path>) -> Option<Vec<u8>> {
  match try_load_bytes(path) {
    Ok(buf) => Some(buf),
    Err(_) => None,
  }
}

/// As [`load`], but keeps the underlying [`LoaderError`] instead of
/// collapsing it, for callers who want to report *why* loading failed
/// (§10.3).
pub fn try_load_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, LoaderError> {
  let path = path.as_ref();
  match load_bytes(path) {
    Ok(buf) => {
      log::debug!("loaded {} bytes from {}", buf.len(), path.display());
      Ok(buf)
    }
    Err(e) => {
      log::warn!("failed to load {}: {e}", path.display());
      Err(e)
    }
  }
}

/// Helper for the common case: load `path` and immediately construct a
/// [`Reader`] over a freshly-leaked buffer's lifetime via a closure, so
/// callers who don't need the raw bytes afterward don't have to juggle
/// ownership themselves.
pub fn with_reader<R>(path: impl AsRef<Path>, f: impl FnOnce(Option<Reader<'_>>) -> R) -> R {
  match load(path) {
    Some(buf) => f(Some(Reader::new(&buf))),
    None => f(None),
  }
}
