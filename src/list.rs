//! Sorted key lists used to filter object iteration.

/// Whether a [`KeyList`] names the keys to drop or the keys to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
  /// Keys in the list are dropped; everything else is returned.
  Skip,
  /// Only keys in the list are returned; everything else is dropped.
  Filter,
}

/// A lexicographically sorted list of object keys plus a mode, passed to
/// `Reader::obj_first_filtered`/`obj_next_filtered`.
///
/// The caller is responsible for sorting `keys`; lookups are a binary
/// search and an unsorted list silently produces wrong answers rather than
/// panicking.
#[derive(Debug, Clone, Copy)]
pub struct KeyList<'a> {
  keys: &'a [&'a str],
  mode: ListMode,
}

impl<'a> KeyList<'a> {
  /// Keys in `keys` are skipped during iteration; `keys` must be sorted.
  pub const fn skip(keys: &'a [&'a str]) -> Self {
    KeyList { keys, mode: ListMode::Skip }
  }

  /// Only keys in `keys` are returned during iteration; `keys` must be
  /// sorted.
  pub const fn filter(keys: &'a [&'a str]) -> Self {
    KeyList { keys, mode: ListMode::Filter }
  }

  pub const fn mode(&self) -> ListMode {
    self.mode
  }

  /// Whether iteration should hand `key` back to the caller, per §4.5's
  /// filter contract.
  pub(crate) fn admits(&self, key: &str) -> bool {
    let present = list_lookup(self.keys, key).is_some();
    match self.mode {
      ListMode::Skip => !present,
      ListMode::Filter => present,
    }
  }
}

/// Binary search for `key` in a sorted slice, returning its index.
///
/// `O(log n)`. Behavior is unspecified (not unsound — just an arbitrary
/// index or `None`) if `list` is not actually sorted.
pub fn list_lookup(list: &[&str], key: &str) -> Option<usize> {
  list.binary_search(&key).ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_finds_present_keys() {
    let list = ["also", "drop", "keep"];
    assert_eq!(list_lookup(&list, "drop"), Some(1));
    assert_eq!(list_lookup(&list, "keep"), Some(2));
  }

  #[test]
  fn lookup_misses_absent_keys() {
    let list = ["also", "drop", "keep"];
    assert_eq!(list_lookup(&list, "zzz"), None);
    assert_eq!(list_lookup(&list, ""), None);
  }

  #[test]
  fn skip_mode_admits_everything_but_listed_keys() {
    let list = KeyList::skip(&["drop"]);
    assert!(list.admits("keep"));
    assert!(list.admits("also"));
    assert!(!list.admits("drop"));
  }

  #[test]
  fn filter_mode_admits_only_listed_keys() {
    let list = KeyList::filter(&["keep"]);
    assert!(list.admits("keep"));
    assert!(!list.admits("also"));
    assert!(!list.admits("drop"));
  }
}
