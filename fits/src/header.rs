// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! FITS header cards.
//!
//! A header is an ordered list of 80-byte records, each holding a keyword,
//! an optional value, and an optional comment. We parse values into a small
//! enum and write them back out in the FITS fixed format, which is also what
//! every FITS reader expects of the mandatory keywords.

use crate::{FitsError, RECORD_SIZE};
use std::str;

/// The value associated with a header keyword.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    /// A logical value, `T` or `F`.
    Logical(bool),

    /// An integer value.
    Integer(i64),

    /// A floating-point value.
    Float(f64),

    /// A character string value.
    Text(String),

    /// The keyword has no value (commentary keywords, or a blank value field).
    Undefined,
}

/// A single header record.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// The keyword, at most eight characters.
    pub keyword: String,

    /// The value.
    pub value: HeaderValue,

    /// The comment, if any. For commentary keywords such as `HISTORY` this
    /// holds the text of the record.
    pub comment: Option<String>,
}

impl Card {
    /// Create a new card with no comment.
    pub fn new<K: Into<String>>(keyword: K, value: HeaderValue) -> Self {
        Card {
            keyword: keyword.into(),
            value,
            comment: None,
        }
    }

    /// Attach a comment to this card.
    pub fn with_comment<C: Into<String>>(mut self, comment: C) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Parse an 80-byte header record.
    pub fn parse(record: &[u8]) -> Result<Self, FitsError> {
        if record.len() != RECORD_SIZE {
            return fitserr!("FITS header records must be {} bytes long", RECORD_SIZE);
        }

        let keyword = str::from_utf8(&record[..8])?.trim_end().to_owned();

        if &record[8..10] != b"= " {
            let text = str::from_utf8(&record[8..])?.trim();

            return Ok(Card {
                keyword,
                value: HeaderValue::Undefined,
                comment: if text.is_empty() {
                    None
                } else {
                    Some(text.to_owned())
                },
            });
        }

        let (value, comment) = parse_value(&record[10..])?;

        Ok(Card {
            keyword,
            value,
            comment,
        })
    }

    /// Render this card as an 80-byte record.
    ///
    /// Numbers and logicals are right-justified to column 30 and strings
    /// start in column 11, as the fixed format requires. Non-ASCII characters
    /// are replaced with `?`, and anything past 80 columns is dropped.
    pub fn encode(&self) -> Vec<u8> {
        let mut s: String = self.keyword.chars().take(8).collect();

        while s.len() < 8 {
            s.push(' ');
        }

        match self.value {
            HeaderValue::Undefined => {
                if let Some(ref c) = self.comment {
                    s.push_str(c);
                }
            }

            ref value => {
                s.push_str("= ");

                match *value {
                    HeaderValue::Logical(b) => {
                        s.push_str(&format!("{:>20}", if b { "T" } else { "F" }))
                    }
                    HeaderValue::Integer(i) => s.push_str(&format!("{i:>20}")),
                    HeaderValue::Float(f) => s.push_str(&format!("{:>20}", format_float(f))),
                    HeaderValue::Text(ref t) => s.push_str(&quote_string(t)),
                    HeaderValue::Undefined => {}
                }

                if let Some(ref c) = self.comment {
                    s.push_str(" / ");
                    s.push_str(c);
                }
            }
        }

        let mut bytes: Vec<u8> = s
            .bytes()
            .map(|b| if (0x20..=0x7E).contains(&b) { b } else { b'?' })
            .collect();
        bytes.resize(RECORD_SIZE, b' ');
        bytes
    }
}

/// Format a float so that it parses back to the identical value.
fn format_float(f: f64) -> String {
    format!("{f:E}")
}

/// Quote a string value, doubling embedded quotes. Non-empty values are
/// padded to at least eight characters, and values are truncated so that the
/// closing quote still fits in the record.
fn quote_string(t: &str) -> String {
    const MAX_INNER: usize = 68;
    let mut inner = String::new();

    for c in t.chars() {
        let piece = if c == '\'' { 2 } else { 1 };

        if inner.len() + piece > MAX_INNER {
            break;
        }

        inner.push(c);

        if c == '\'' {
            inner.push('\'');
        }
    }

    if !inner.is_empty() {
        while inner.len() < 8 {
            inner.push(' ');
        }
    }

    format!("'{inner}'")
}

/// Parse a quoted string starting at `field[0]`. Returns the unescaped value,
/// with trailing blanks removed, and the bytes after the closing quote.
///
/// A value consisting only of blanks is returned as a single space, since
/// leading blanks are significant but trailing ones are not.
pub(crate) fn parse_string_value(field: &[u8]) -> Result<(String, &[u8]), FitsError> {
    const SINGLE_QUOTE: u8 = b'\'';

    if field.first() != Some(&SINGLE_QUOTE) {
        return fitserr!("expected opening quote in FITS string value");
    }

    let mut buf = Vec::new();
    let mut i = 1;

    loop {
        let c = match field.get(i) {
            Some(c) => *c,
            None => return fitserr!("illegal unterminated FITS string value"),
        };

        if !(0x20..=0x7E).contains(&c) {
            return fitserr!("illegal non-printable-ASCII value in FITS string value");
        }

        if c == SINGLE_QUOTE {
            if field.get(i + 1) == Some(&SINGLE_QUOTE) {
                buf.push(SINGLE_QUOTE);
                i += 2;
                continue;
            }

            break;
        }

        buf.push(c);
        i += 1;
    }

    let any_chars = !buf.is_empty();

    while buf.last() == Some(&b' ') {
        buf.pop();
    }

    if any_chars && buf.is_empty() {
        buf.push(b' ');
    }

    Ok((str::from_utf8(&buf)?.to_owned(), &field[i + 1..]))
}

/// Parse whatever follows a value: nothing, blanks, or a `/` comment.
pub(crate) fn parse_comment(rest: &[u8]) -> Result<Option<String>, FitsError> {
    let text = str::from_utf8(rest)?.trim();

    if text.is_empty() {
        return Ok(None);
    }

    match text.strip_prefix('/') {
        Some(c) => {
            let c = c.trim();
            Ok(if c.is_empty() { None } else { Some(c.to_owned()) })
        }
        None => fitserr!("illegal trailing text {:?} after FITS header value", text),
    }
}

/// Parse the value field of a record (bytes 10 through 79).
fn parse_value(field: &[u8]) -> Result<(HeaderValue, Option<String>), FitsError> {
    let field = match field.iter().position(|&c| c != b' ') {
        Some(i) => &field[i..],
        None => return Ok((HeaderValue::Undefined, None)),
    };

    if field[0] == b'\'' {
        let (value, rest) = parse_string_value(field)?;
        return Ok((HeaderValue::Text(value), parse_comment(rest)?));
    }

    let text = str::from_utf8(field)?;

    let (token, comment) = match text.find('/') {
        Some(i) => (text[..i].trim(), parse_comment(text[i..].as_bytes())?),
        None => (text.trim(), None),
    };

    let value = if token.is_empty() {
        HeaderValue::Undefined
    } else if token == "T" {
        HeaderValue::Logical(true)
    } else if token == "F" {
        HeaderValue::Logical(false)
    } else if let Ok(i) = token.parse::<i64>() {
        HeaderValue::Integer(i)
    } else if let Ok(f) = token.replace(['D', 'd'], "E").parse::<f64>() {
        HeaderValue::Float(f)
    } else {
        return fitserr!("unparseable FITS header value {:?}", token);
    };

    Ok((value, comment))
}

/// An ordered collection of header cards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Header { cards: Vec::new() }
    }

    /// Append a card, without checking whether its keyword is already present.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Set the value of a keyword, replacing the first existing card with
    /// that keyword or appending a new one.
    pub fn set<K: AsRef<str>>(&mut self, keyword: K, value: HeaderValue) {
        let keyword = keyword.as_ref();

        match self.cards.iter_mut().find(|c| c.keyword == keyword) {
            Some(card) => card.value = value,
            None => self.cards.push(Card::new(keyword, value)),
        }
    }

    /// Get all of the cards.
    pub fn cards(&self) -> &[Card] {
        &self.cards[..]
    }

    /// Get the number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if there are no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Get the value of the first card with the given keyword.
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| c.keyword == keyword)
            .map(|c| &c.value)
    }

    /// Get a string-valued keyword.
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        match self.get(keyword) {
            Some(HeaderValue::Text(s)) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get an integer-valued keyword.
    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        match self.get(keyword) {
            Some(HeaderValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a numeric keyword as a float. Integer values are converted.
    pub fn get_float(&self, keyword: &str) -> Option<f64> {
        match self.get(keyword) {
            Some(HeaderValue::Float(f)) => Some(*f),
            Some(HeaderValue::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get a logical-valued keyword.
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        match self.get(keyword) {
            Some(HeaderValue::Logical(b)) => Some(*b),
            _ => None,
        }
    }

    /// Get a string-valued keyword, failing if it is absent.
    pub fn require_str(&self, keyword: &str) -> Result<&str, FitsError> {
        self.get_str(keyword)
            .ok_or_else(|| FitsError::MissingKeyword(keyword.to_owned()))
    }

    /// Get an integer-valued keyword, failing if it is absent.
    pub fn require_int(&self, keyword: &str) -> Result<i64, FitsError> {
        self.get_int(keyword)
            .ok_or_else(|| FitsError::MissingKeyword(keyword.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(s: &str) -> Vec<u8> {
        let mut v = s.as_bytes().to_vec();
        v.resize(RECORD_SIZE, b' ');
        v
    }

    #[test]
    fn parse_values() {
        let c = Card::parse(&record("SIMPLE  =                    T / conforms")).unwrap();
        assert_eq!(c.keyword, "SIMPLE");
        assert_eq!(c.value, HeaderValue::Logical(true));
        assert_eq!(c.comment.as_deref(), Some("conforms"));

        let c = Card::parse(&record("OI_REVN =                    2")).unwrap();
        assert_eq!(c.value, HeaderValue::Integer(2));

        let c = Card::parse(&record("ARRAYX  =   1942014.1545180853")).unwrap();
        assert_eq!(c.value, HeaderValue::Float(1942014.1545180853));

        let c = Card::parse(&record("FOV     =              1.5D-01")).unwrap();
        assert_eq!(c.value, HeaderValue::Float(0.15));

        let c = Card::parse(&record("ARRNAME = 'VLTI    '           / array name")).unwrap();
        assert_eq!(c.value, HeaderValue::Text("VLTI".to_owned()));

        let c = Card::parse(&record("OBJECT  = 'O''Neil'")).unwrap();
        assert_eq!(c.value, HeaderValue::Text("O'Neil".to_owned()));

        let c = Card::parse(&record("CORRNAME= ''")).unwrap();
        assert_eq!(c.value, HeaderValue::Text(String::new()));

        let c = Card::parse(&record("HISTORY written by hand")).unwrap();
        assert_eq!(c.value, HeaderValue::Undefined);
        assert_eq!(c.comment.as_deref(), Some("written by hand"));

        assert!(Card::parse(&record("BAD     = 'unterminated")).is_err());
        assert!(Card::parse(&record("BAD     = what")).is_err());
    }

    #[test]
    fn encode_then_parse() {
        let cards = vec![
            Card::new("NAXIS1", HeaderValue::Integer(136)).with_comment("bytes per row"),
            Card::new("EXTEND", HeaderValue::Logical(true)),
            Card::new("ARRAYZ", HeaderValue::Float(-4.5e-7)),
            Card::new("ARRAYY", HeaderValue::Float(1.0)),
            Card::new("INSNAME", HeaderValue::Text("AMBER_LR".to_owned())),
            Card::new("DATE-OBS", HeaderValue::Text(String::new())),
            Card::new("OBJECT", HeaderValue::Text("it's".to_owned())),
        ];

        for card in cards {
            let rec = card.encode();
            assert_eq!(rec.len(), RECORD_SIZE);
            assert_eq!(Card::parse(&rec).unwrap(), card);
        }

        let rec = Card::new("NAXIS2", HeaderValue::Integer(5)).encode();
        assert_eq!(&rec[..31], b"NAXIS2  =                    5 ");
    }

    #[test]
    fn long_strings_are_truncated_cleanly() {
        let long = "'".repeat(50);
        let rec = Card::new("OBJECT", HeaderValue::Text(long)).encode();

        match Card::parse(&rec).unwrap().value {
            HeaderValue::Text(s) => assert_eq!(s, "'".repeat(34)),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn header_lookup() {
        let mut h = Header::new();
        h.set("OI_REVN", HeaderValue::Integer(1));
        h.set("OI_REVN", HeaderValue::Integer(2));
        h.set("EFFWAVE", HeaderValue::Integer(3));
        assert_eq!(h.len(), 2);
        assert_eq!(h.get_int("OI_REVN"), Some(2));
        assert_eq!(h.get_float("EFFWAVE"), Some(3.0));
        assert_eq!(h.get_str("OI_REVN"), None);
        assert!(matches!(
            h.require_str("INSNAME"),
            Err(FitsError::MissingKeyword(_))
        ));
    }
}
