//! Record codec for category files.
//!
//! # Line Format
//!
//! ```text
//! ItemID,Name,Category,Quantity,Price,Supplier
//! 1,Widget,Tools,5,9.99,Acme
//! 2,"Bolts, M6",Tools,100,0.1,"Acme ""Industrial"""
//! ```
//!
//! Fields are separated by `,`. A field containing the delimiter, a quote
//! or a line break is wrapped in quotes, with inner quotes doubled. A
//! quoted field may therefore span several physical lines, which is why
//! file contents must be split with [`record_lines`] rather than
//! `str::lines`.
//!
//! Numbers use Rust's `Display`/`FromStr`, which never depend on locale.
//! `f64` is printed in its shortest form that parses back to the same
//! value, so encoding round-trips exactly.

use std::borrow::Cow;

use crate::types::{Field, ItemId, Record, RecordError};

/// Field delimiter.
pub const DELIMITER: char = ',';

/// Quote character used to wrap fields that need escaping.
pub const QUOTE: char = '"';

/// Header line written at the top of every category file.
pub const HEADER: &str = "ItemID,Name,Category,Quantity,Price,Supplier";

/// Line terminator used when writing category files.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator used when writing category files.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Encode a record as a single logical line (without terminator).
#[must_use]
pub fn encode_record(record: &Record) -> String {
    let fields = [
        Cow::Owned(record.id.to_string()),
        escape_field(&record.name),
        escape_field(&record.category),
        Cow::Owned(record.quantity.to_string()),
        Cow::Owned(record.price.to_string()),
        escape_field(&record.supplier),
    ];
    fields.join(",")
}

/// Quote a field value if it contains a delimiter, quote or line break.
#[must_use]
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push(QUOTE);
    for c in value.chars() {
        if c == QUOTE {
            escaped.push(QUOTE);
        }
        escaped.push(c);
    }
    escaped.push(QUOTE);
    Cow::Owned(escaped)
}

/// Decode one logical line into a validated record.
pub fn decode_record(line: &str) -> Result<Record, DecodeError> {
    let fields = split_fields(line)?;
    let [id, name, category, quantity, price, supplier]: [String; 6] =
        fields
            .try_into()
            .map_err(|fields: Vec<String>| DecodeError::FieldCount {
                expected: Field::ALL.len(),
                found: fields.len(),
            })?;

    let record = Record {
        id: ItemId(parse_number(Field::Id, &id)?),
        name,
        category,
        quantity: parse_number(Field::Quantity, &quantity)?,
        price: parse_number(Field::Price, &price)?,
        supplier,
    };
    record.validate()?;
    Ok(record)
}

fn parse_number<T: std::str::FromStr>(field: Field, value: &str) -> Result<T, DecodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Split a logical line into unescaped field values.
pub fn split_fields(line: &str) -> Result<Vec<String>, DecodeError> {
    let mut fields = Vec::with_capacity(Field::ALL.len());
    let mut current = String::new();
    let mut chars = line.char_indices().peekable();
    // Quoted fields: inside the quotes, then just after the closing quote.
    let mut in_quotes = false;
    let mut after_quotes = false;
    let mut field_start = true;

    while let Some((column, c)) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek().is_some_and(|&(_, next)| next == QUOTE) {
                    chars.next();
                    current.push(QUOTE);
                } else {
                    in_quotes = false;
                    after_quotes = true;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        if c == DELIMITER {
            fields.push(std::mem::take(&mut current));
            after_quotes = false;
            field_start = true;
            continue;
        }

        if after_quotes || (c == QUOTE && !field_start) {
            return Err(DecodeError::UnexpectedQuote { column });
        }
        if c == QUOTE {
            in_quotes = true;
        } else {
            current.push(c);
        }
        field_start = false;
    }

    if in_quotes {
        return Err(DecodeError::UnterminatedQuote);
    }
    fields.push(current);
    Ok(fields)
}

/// Iterator over the logical lines of a category file.
///
/// Yields `(line_number, line)` where `line_number` is the 1-based physical
/// line the record starts on. Line breaks inside quoted fields stay part of
/// the record; `\n` and `\r\n` terminators are both accepted and stripped.
/// Blank lines are skipped.
#[must_use]
pub const fn record_lines(contents: &str) -> RecordLines<'_> {
    RecordLines {
        rest: contents,
        line_number: 1,
    }
}

/// Iterator returned by [`record_lines`].
pub struct RecordLines<'a> {
    rest: &'a str,
    line_number: usize,
}

impl<'a> Iterator for RecordLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            let start_line = self.line_number;
            let mut end = self.rest.len();
            let mut next_start = self.rest.len();

            // Same quoting rules as `split_fields`: a quote opens a span only
            // at the start of a field, and a stray quote elsewhere stays
            // literal so it cannot swallow the following lines.
            let mut in_quotes = false;
            let mut field_start = true;
            let mut bytes = self.rest.bytes().enumerate().peekable();
            while let Some((offset, byte)) = bytes.next() {
                if in_quotes {
                    match byte {
                        b'"' if bytes.peek().is_some_and(|&(_, next)| next == b'"') => {
                            bytes.next();
                        }
                        b'"' => in_quotes = false,
                        b'\n' => self.line_number += 1,
                        _ => {}
                    }
                    continue;
                }
                match byte {
                    b'\n' => {
                        end = offset;
                        next_start = offset + 1;
                        break;
                    }
                    b'"' if field_start => {
                        in_quotes = true;
                        field_start = false;
                    }
                    b',' => field_start = true,
                    _ => field_start = false,
                }
            }

            let mut line = &self.rest[..end];
            if let Some(stripped) = line.strip_suffix('\r') {
                line = stripped;
            }
            self.rest = &self.rest[next_start..];
            self.line_number += 1;

            if !line.is_empty() {
                return Some((start_line, line));
            }
        }
    }
}

/// Errors produced when a stored line cannot be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A quoted field is never closed.
    UnterminatedQuote,
    /// A quote appears inside an unquoted field, or text follows a closing
    /// quote before the next delimiter.
    UnexpectedQuote { column: usize },
    /// The line does not have exactly six fields.
    FieldCount { expected: usize, found: usize },
    /// A numeric field does not parse.
    InvalidNumber { field: Field, value: String },
    /// The fields parse but violate a record invariant.
    InvalidRecord(RecordError),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedQuote => write!(f, "unterminated quoted field"),
            Self::UnexpectedQuote { column } => {
                write!(f, "unexpected quote character at column {column}")
            }
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::InvalidNumber { field, value } => {
                write!(f, "invalid number for {field}: '{value}'")
            }
            Self::InvalidRecord(e) => write!(f, "invalid record: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRecord(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for DecodeError {
    fn from(e: RecordError) -> Self {
        Self::InvalidRecord(e)
    }
}
