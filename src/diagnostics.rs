//! Source-position diagnostics: the three-line message/line/caret format.
//!
//! Every position-bearing error in the crate - grammar compilation failures
//! and input parse failures alike - is rendered through [`format_at`].

/// Renders `message` against `source` at byte position `pos` as exactly:
///
/// ```text
/// <message>, line <N>:
///     <line text>
///     <spaces>^
/// ```
///
/// The line number is 1-based; the caret column counts bytes from the start
/// of the line. A position at or past the end of the source points one past
/// the final line's text.
pub fn format_at(message: &str, source: &str, pos: usize) -> String {
    let pos = pos.min(source.len());
    let (line_number, line_start) = line_of(source, pos);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |offset| line_start + offset);
    let line = &source[line_start..line_end];
    let column = pos - line_start;

    format!(
        "{message}, line {line_number}:\n    {line}\n    {caret:>width$}",
        caret = "^",
        width = column + 1,
    )
}

/// The 1-based line number containing `pos` and that line's starting byte.
fn line_of(source: &str, pos: usize) -> (usize, usize) {
    let mut line_number = 1;
    let mut line_start = 0;
    for (i, byte) in source.bytes().enumerate() {
        if i >= pos {
            break;
        }
        if byte == b'\n' {
            line_number += 1;
            line_start = i + 1;
        }
    }
    (line_number, line_start)
}
