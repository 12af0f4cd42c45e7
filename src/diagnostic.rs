//! Human-readable "line snippet" error/warning formatting.
//!
//! Ported from the original's `print_snippet`: find the line containing an
//! offset, print up to the ten preceding lines for context, then a caret
//! pointing at the exact column. Everything here writes straight through to
//! an `io::Write` sink; no intermediate `String` is built.

use std::io::{self, Write};

const CONTEXT_LINES: usize = 10;

/// Writes a `"<kind> at line N"` header, up to ten lines of context ending
/// at the line containing `offset`, and a caret under the offending
/// column.
fn print_snippet<W: Write>(w: &mut W, buf: &[u8], offset: usize, kind: &str) -> io::Result<()> {
  let mut lines = [0usize; CONTEXT_LINES];
  let mut cur_line: usize = 0;
  let mut cur_off: usize = 0;
  let mut last_off: usize = offset;

  loop {
    lines[cur_line % CONTEXT_LINES] = cur_off;
    cur_line += 1;

    while cur_off < buf.len() && buf[cur_off] != b'\n' {
      cur_off += 1;
    }

    if cur_off >= offset {
      break;
    }

    cur_off += 1;
    last_off = offset - cur_off;
  }

  writeln!(w, "{} at line {}\n", kind, cur_line)?;

  let shown = CONTEXT_LINES.min(cur_line);
  let mut idx = 0;
  for i in (1..=shown).rev() {
    idx = (cur_line - i) % CONTEXT_LINES;
    write!(w, "{:03}: ", cur_line - i + 1)?;
    print_line(w, buf, lines[idx])?;
    writeln!(w)?;
  }

  w.write_all(b"     ")?;
  print_spaceline(w, buf, lines[idx], last_off)?;
  writeln!(w, "^")?;
  Ok(())
}

fn print_line<W: Write>(w: &mut W, buf: &[u8], start: usize) -> io::Result<()> {
  let mut end = start;
  while end < buf.len() && buf[end] != b'\n' {
    end += 1;
  }
  w.write_all(&buf[start..end])
}

/// Writes `count` columns of leading whitespace matching `buf[start..]`,
/// preserving tabs so the caret lines up under variable-width indentation.
fn print_spaceline<W: Write>(w: &mut W, buf: &[u8], start: usize, count: usize) -> io::Result<()> {
  for i in 0..count {
    let b = buf.get(start + i).copied().unwrap_or(b' ');
    w.write_all(&[if b == b'\t' { b'\t' } else { b' ' }])?;
  }
  Ok(())
}

/// Prints a parse-error snippet for the latched error message at `offset`.
pub fn err_print<W: Write>(w: &mut W, buf: &[u8], offset: usize, message: &str) -> io::Result<()> {
  print_snippet(w, buf, offset, "Parse error")?;
  writeln!(w, "{}", message)
}

/// Prints a non-fatal warning snippet at `offset`.
pub fn warn<W: Write>(w: &mut W, buf: &[u8], offset: usize, message: &str) -> io::Result<()> {
  print_snippet(w, buf, offset, "Warning")?;
  writeln!(w, "{}", message)
}
