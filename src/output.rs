//! Tab-separated result rows.

use std::borrow::Cow;
use std::io::{self, Write};

pub const COLUMN_SEPARATOR: char = '\t';

const FORBIDDEN: [char; 3] = ['\t', '\n', '\r'];

/// Replace tabs and line breaks in `field` with spaces so every row stays
/// on one line with a fixed column count.
pub fn sanitize(field: &str) -> Cow<'_, str> {
    if field.contains(FORBIDDEN) {
        Cow::Owned(field.replace(FORBIDDEN, " "))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(COLUMN_SEPARATOR);
        }
        line.push_str(&sanitize(field.as_ref()));
    }
    line
}

/// Write `fields` as one newline-terminated row.
pub fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> io::Result<()> {
    writeln!(out, "{}", format_row(fields))
}
