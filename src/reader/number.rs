//! Integer and float literal scanning, and the integer/float lookahead
//! classifier.

use crate::kind::ValueKind;

use super::Reader;

fn is_digit(b: u8) -> bool {
  b.is_ascii_digit()
}

/// Looks ahead from the cursor (already known to start with `-` or a
/// digit) to decide whether this is an `Integer` or a `Float`, without
/// consuming anything. Also rejects a leading zero followed by more
/// digits (`012`), which is invalid in both cases.
pub(super) fn peek_num_kind(r: &mut Reader) -> ValueKind {
  let mut off = 0usize;
  if r.peek(off) == b'-' {
    off += 1;
  }

  if !is_digit(r.peek(off)) {
    r.poison("Invalid number");
    return ValueKind::Void;
  }

  let first = r.peek(off);
  off += 1;
  let mut digits_after_first = 0;
  while is_digit(r.peek(off)) {
    off += 1;
    digits_after_first += 1;
  }

  if first == b'0' && digits_after_first > 0 {
    r.poison("Leading zero in number!");
    return ValueKind::Void;
  }

  match r.peek(off) {
    b'.' | b'e' | b'E' => ValueKind::Float,
    _ => ValueKind::Integer,
  }
}

/// Consumes consecutive ASCII digits, returning how many were consumed.
fn eat_digits(r: &mut Reader) -> usize {
  let mut n = 0;
  while is_digit(r.peek(0)) {
    r.consume();
    n += 1;
  }
  n
}

/// Decodes an integer literal. Overflow wraps (§10.2) rather than
/// poisoning, matching the original's unchecked accumulation.
pub(super) fn decode_int(r: &mut Reader) -> Option<i64> {
  let neg = r.accept(b'-');
  if !is_digit(r.peek(0)) {
    r.poison("Invalid number");
    return None;
  }

  let mut v: i64 = 0;
  while is_digit(r.peek(0)) {
    let d = (r.consume() - b'0') as i64;
    v = v.wrapping_mul(10).wrapping_add(d);
  }

  Some(if neg { v.wrapping_neg() } else { v })
}

/// Decodes a float literal: integer part, optional fractional part,
/// optional exponent. Lookahead dispatch (rather than the original's
/// unconditional consume-then-switch) is behaviorally identical for
/// grammar-valid input and safer on malformed input (§10 design notes).
pub(super) fn decode_float(r: &mut Reader) -> Option<f64> {
  let start = r.offset();
  r.accept(b'-');
  eat_digits(r);

  if r.peek(0) == b'.' {
    r.consume();
    if eat_digits(r) == 0 {
      r.poison("Expected digit after decimal point");
      return None;
    }
  }

  if r.peek(0) == b'e' || r.peek(0) == b'E' {
    r.consume();
    if r.peek(0) == b'+' || r.peek(0) == b'-' {
      r.consume();
    }
    if eat_digits(r) == 0 {
      r.poison("Expected digit in exponent");
      return None;
    }
  }

  let end = r.offset();
  let text = r.slice(start, end);
  match std::str::from_utf8(text).ok().and_then(|s| s.parse::<f64>().ok()) {
    Some(v) => Some(v),
    None => {
      r.poison("Invalid number");
      None
    }
  }
}

pub(super) fn decode_bool(r: &mut Reader) -> Option<bool> {
  if r.accept_literal(b"true") {
    Some(true)
  } else if r.accept_literal(b"false") {
    Some(false)
  } else {
    r.poison("Invalid literal, expected true or false");
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_integer_vs_float() {
    let mut r = Reader::new(b"42,");
    assert_eq!(peek_num_kind(&mut r), ValueKind::Integer);

    let mut r = Reader::new(b"4.2,");
    assert_eq!(peek_num_kind(&mut r), ValueKind::Float);

    let mut r = Reader::new(b"4e10,");
    assert_eq!(peek_num_kind(&mut r), ValueKind::Float);

    let mut r = Reader::new(b"-5,");
    assert_eq!(peek_num_kind(&mut r), ValueKind::Integer);
  }

  #[test]
  fn leading_zero_is_rejected() {
    let mut r = Reader::new(b"01,");
    peek_num_kind(&mut r);
    assert!(r.is_poisoned());
    assert_eq!(r.error(), "Leading zero in number!");
  }

  #[test]
  fn bare_zero_is_a_valid_integer() {
    let mut r = Reader::new(b"0,");
    assert_eq!(peek_num_kind(&mut r), ValueKind::Integer);
  }

  #[test]
  fn decodes_plain_and_negative_integers() {
    let mut r = Reader::new(b"123");
    assert_eq!(decode_int(&mut r), Some(123));

    let mut r = Reader::new(b"-123");
    assert_eq!(decode_int(&mut r), Some(-123));
  }

  #[test]
  fn integer_overflow_wraps_rather_than_poisoning() {
    // i64::MAX is 9223372036854775807; one more digit wraps.
    let mut r = Reader::new(b"99999999999999999999");
    let v = decode_int(&mut r).unwrap();
    assert!(!r.is_poisoned());
    assert_eq!(v, 99999999999999999999u128 as i64);
  }

  #[test]
  fn decodes_float_with_fraction_and_exponent() {
    let mut r = Reader::new(b"3.25");
    assert_eq!(decode_float(&mut r), Some(3.25));

    let mut r = Reader::new(b"-1e3");
    assert_eq!(decode_float(&mut r), Some(-1000.0));

    let mut r = Reader::new(b"2.5e-2");
    assert_eq!(decode_float(&mut r), Some(0.025));
  }

  #[test]
  fn float_requires_a_digit_after_the_decimal_point() {
    let mut r = Reader::new(b"1.");
    assert_eq!(decode_float(&mut r), None);
    assert!(r.is_poisoned());
  }

  #[test]
  fn decodes_true_and_false() {
    let mut r = Reader::new(b"true");
    assert_eq!(decode_bool(&mut r), Some(true));

    let mut r = Reader::new(b"false");
    assert_eq!(decode_bool(&mut r), Some(false));
  }
}
