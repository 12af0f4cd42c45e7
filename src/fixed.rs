//! Stack-allocated, fixed-capacity byte buffers.
//!
//! The reader and writer never allocate during steady-state traversal: the
//! latched error message and an object key's id are both bounded buffers
//! living inline in the `Reader`/`Writer`/`Value` structs rather than
//! `String`s on the heap.

use std::fmt;

/// A fixed-capacity buffer used for the latched error/warning message.
///
/// Writes past capacity are truncated rather than rejected, mirroring
/// `vsnprintf`'s truncation behavior in the original C implementation.
#[derive(Clone, Copy)]
pub struct FixedMsg<const N: usize> {
  buf: [u8; N],
  len: usize,
}

impl<const N: usize> FixedMsg<N> {
  pub const fn new() -> Self {
    FixedMsg { buf: [0; N], len: 0 }
  }

  pub fn clear(&mut self) {
    self.len = 0;
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn as_str(&self) -> &str {
    // Constructed only through `fmt::Write`, which only ever appends
    // valid UTF-8 (possibly truncated mid-codepoint at the very end,
    // which `from_utf8_lossy` tolerates).
    std::str::from_utf8(&self.buf[..self.len]).unwrap_or_else(|e| {
      std::str::from_utf8(&self.buf[..e.valid_up_to()]).unwrap_or("")
    })
  }
}

impl<const N: usize> Default for FixedMsg<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> fmt::Write for FixedMsg<N> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    let room = N.saturating_sub(self.len);
    let take = room.min(s.len());
    self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
    self.len += take;
    Ok(())
  }
}

impl<const N: usize> fmt::Debug for FixedMsg<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A fixed-capacity buffer used for an object key (the `id` of a `Value`).
///
/// Unlike [`FixedMsg`], overflow is a hard failure the caller must observe:
/// an id that doesn't fit poisons the reader rather than silently
/// truncating, since a truncated key could alias a different, shorter key.
#[derive(Clone, Copy)]
pub struct FixedId<const N: usize> {
  buf: [u8; N],
  len: usize,
}

impl<const N: usize> FixedId<N> {
  pub const fn new() -> Self {
    FixedId { buf: [0; N], len: 0 }
  }

  pub fn clear(&mut self) {
    self.len = 0;
  }

  /// Appends one raw byte. Returns `false` if there is no room left for
  /// this byte plus the implicit terminator (capacity is `N - 1` usable
  /// bytes, mirroring the C buffer's `len - 1` check before the null).
  #[must_use]
  pub fn push(&mut self, b: u8) -> bool {
    if self.len + 1 >= N {
      return false;
    }
    self.buf[self.len] = b;
    self.len += 1;
    true
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.buf[..self.len]
  }

  pub fn as_str(&self) -> &str {
    std::str::from_utf8(self.as_bytes()).unwrap_or("")
  }
}

impl<const N: usize> Default for FixedId<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> fmt::Debug for FixedId<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl<const N: usize> PartialEq<str> for FixedId<N> {
  fn eq(&self, other: &str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl<const N: usize> PartialEq<&str> for FixedId<N> {
  fn eq(&self, other: &&str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}
