// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Access to FITS-format files.
//!
//! With particular emphasis on binary table extensions, since that is where
//! OIFITS data live, but the HDU navigation here works for any FITS file.
//!
//! Reading goes through [`FitsReader`], which scans the structure of the
//! whole file up front and then lets you pull out binary tables by name.
//! Writing goes through [`FitsWriter`], which emits a primary header followed
//! by any number of binary tables.

#![deny(missing_docs)]

use oifits_core::io::EofReadExactExt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, SeekFrom};
use std::path::Path;
use std::str;
use thiserror::Error;

// Define this before any submodules are parsed.
macro_rules! fitserr {
    ($( $fmt_args:expr ),*) => {
        Err($crate::FitsError::Format(format!($( $fmt_args ),*)))
    }
}

pub mod bintable;
pub mod header;
pub mod writer;

pub use bintable::{BinTable, Column, ColumnData};
pub use header::{Card, Header, HeaderValue};
pub use writer::FitsWriter;

/// The size of a FITS block, in bytes. Every HDU's headers and data are
/// padded out to a multiple of this size.
pub const BLOCK_SIZE: usize = 2880;

/// The size of a single FITS header record, in bytes.
pub const RECORD_SIZE: usize = 80;

/// An error arising while reading or writing FITS data.
#[derive(Error, Debug)]
pub enum FitsError {
    /// The FITS data are malformed or use a feature that we don't support.
    #[error("{0}")]
    Format(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Some text in the file was not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),

    /// A binary table lacked a column that was asked for.
    #[error("missing required column {0}")]
    MissingColumn(String),

    /// A binary table column could not be interpreted as the requested type.
    #[error("column {column} cannot be read as {expected}")]
    ColumnType {
        /// The name of the column.
        column: String,

        /// A description of the type that was asked for.
        expected: &'static str,
    },

    /// A header lacked a keyword that was asked for.
    #[error("missing required header keyword {0}")]
    MissingKeyword(String),
}

/// Possible values for the FITS "BITPIX" header, which identifies the storage
/// format of FITS binary data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i8)]
pub enum Bitpix {
    /// The data are stored as bytes or perhaps ASCII text.
    U8 = 8,

    /// The data map to the Rust type i16.
    I16 = 16,

    /// The data map to the Rust type i32.
    I32 = 32,

    /// The data map to the Rust type i64.
    I64 = 64,

    /// The data map to the Rust type f32.
    F32 = -32,

    /// The data map to the Rust type f64.
    F64 = -64,
}

impl Bitpix {
    /// Decode a BITPIX header value.
    pub fn from_value(value: isize) -> Result<Self, FitsError> {
        match value {
            8 => Ok(Bitpix::U8),
            16 => Ok(Bitpix::I16),
            32 => Ok(Bitpix::I32),
            64 => Ok(Bitpix::I64),
            -32 => Ok(Bitpix::F32),
            -64 => Ok(Bitpix::F64),
            other => fitserr!("unsupported BITPIX value in FITS file: {}", other),
        }
    }

    /// Get the size of a single item in this BITPIX setting, in bytes.
    pub fn n_bytes(&self) -> usize {
        match *self {
            Bitpix::U8 => 1,
            Bitpix::I16 => 2,
            Bitpix::I32 => 4,
            Bitpix::I64 => 8,
            Bitpix::F32 => 4,
            Bitpix::F64 => 8,
        }
    }
}

const FITS_MARKER: &[u8] = b"SIMPLE  =                    T";
const XTENSION_MARKER: &[u8] = b"XTENSION= ";
const BITPIX_MARKER: &[u8] = b"BITPIX  = ";
const NAXIS_MARKER: &[u8] = b"NAXIS   = ";
const END_MARKER: &[u8] =
    b"END                                                                             ";
const GROUPS_MARKER: &[u8] = b"GROUPS  =                    T";
const PCOUNT_MARKER: &[u8] = b"PCOUNT  = ";
const GCOUNT_MARKER: &[u8] = b"GCOUNT  = ";

/// Different kinds of HDUs known to this module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HduKind {
    /// This HDU is the primary HDU, and it contains an N-dimensional array.
    PrimaryArray,

    /// This HDU is the primary HDU, and it contains a "random groups" binary
    /// table. This format is superseded by the BINTABLE extension type.
    PrimaryRandomGroups,

    /// This HDU is the primary HDU, and the array it specifies has zero total
    /// size.
    PrimaryNoData,

    /// This HDU contains an N-dimensional data array.
    ImageExtension,

    /// This HDU contains a textual data table.
    AsciiTableExtension,

    /// This HDU contains a binary data table.
    BinaryTableExtension,

    /// This HDU contains data of unrecognized format.
    OtherExtension(String),
}

/// Information about an HDU in a parsed FITS file.
#[derive(Clone, Debug)]
pub struct ParsedHdu {
    kind: HduKind,
    name: String,
    header: Header,
    header_offset: u64,
    data_offset: u64,
    bitpix: Bitpix,
    pcount: isize,
    gcount: usize,
    naxis: Vec<usize>,
}

impl ParsedHdu {
    /// Get the "name" of this HDU. If this is an extension HDU, this is the
    /// value of the EXTNAME header keyword. For the primary HDU, it is an
    /// empty string.
    pub fn extname(&self) -> &str {
        &self.name
    }

    /// Query what kind of HDU this is.
    pub fn kind(&self) -> HduKind {
        self.kind.clone()
    }

    /// Get all of the header cards of this HDU, structural ones included.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Query the "BITPIX" of this HDU, which defines the format in which
    /// its data are stored.
    pub fn bitpix(&self) -> Bitpix {
        self.bitpix
    }

    /// Query the shape of this HDU's data. Returns `(gcount, pcount, naxis)`.
    pub fn shape(&self) -> (usize, isize, &[usize]) {
        (self.gcount, self.pcount, &self.naxis[..])
    }

    /// The file offsets at which this HDU's headers and data begin.
    pub fn offsets(&self) -> (u64, u64) {
        (self.header_offset, self.data_offset)
    }
}

/// Random access to the HDUs of a FITS file.
///
/// Construction scans the headers of every HDU in the stream, seeking past
/// the data. Binary tables are then decoded on demand. The reader keeps a
/// cursor so that all of the tables with a given EXTNAME can be visited in
/// file order with [`FitsReader::next_bintable`]; [`FitsReader::rewind`]
/// moves the cursor back to the first extension.
#[derive(Debug)]
pub struct FitsReader<R: Read + Seek> {
    inner: R,
    hdus: Vec<ParsedHdu>,
    cursor: usize,
}

impl FitsReader<BufReader<File>> {
    /// Open an existing FITS file for reading.
    pub fn open_readonly<P: AsRef<Path>>(path: P) -> Result<Self, FitsError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FitsReader<R> {
    /// Parse the headers of a FITS stream.
    pub fn new(mut inner: R) -> Result<Self, FitsError> {
        let file_size = inner.seek(SeekFrom::End(0))?;

        if file_size == 0 {
            return fitserr!("empty FITS stream");
        }

        if file_size % BLOCK_SIZE as u64 != 0 {
            return fitserr!(
                "FITS stream should be a multiple of {} bytes long; got {}",
                BLOCK_SIZE,
                file_size
            );
        }

        let mut hdus: Vec<ParsedHdu> = Vec::new();
        let mut buf = [0u8; BLOCK_SIZE];
        let mut hdu_header_offset = 0; // file offset at which the current HDU's headers start

        while hdu_header_offset < file_size {
            inner.seek(SeekFrom::Start(hdu_header_offset))?;
            let mut cur_offset = hdu_header_offset;

            if !inner.eof_read_exact::<FitsError>(&mut buf)? {
                return fitserr!("truncated FITS stream");
            }

            cur_offset += BLOCK_SIZE as u64;

            // First: SIMPLE or XTENSION.

            let mut kind = HduKind::PrimaryArray;

            if hdus.is_empty() {
                if &buf[..FITS_MARKER.len()] != FITS_MARKER {
                    return fitserr!("file does not appear to be in FITS format");
                }
            } else {
                if &buf[..XTENSION_MARKER.len()] != XTENSION_MARKER {
                    // "Special records" at the end of the file. Nothing
                    // after this point is navigable.
                    break;
                }

                kind = match parse_fixed_string(&buf[..RECORD_SIZE])?.as_ref() {
                    "IMAGE" => HduKind::ImageExtension,
                    "TABLE" => HduKind::AsciiTableExtension,
                    "BINTABLE" => HduKind::BinaryTableExtension,
                    other => HduKind::OtherExtension(other.to_owned()),
                };
            }

            // Next: BITPIX.

            let bitpix = {
                let record = &buf[80..160];

                if &record[..BITPIX_MARKER.len()] != BITPIX_MARKER {
                    return fitserr!("second FITS header must be BITPIX");
                }

                Bitpix::from_value(parse_fixed_int(record)?)?
            };

            // Next: NAXIS.

            let naxis_value = {
                let record = &buf[160..240];

                if &record[..NAXIS_MARKER.len()] != NAXIS_MARKER {
                    return fitserr!("third FITS header must be NAXIS");
                }

                parse_fixed_int(record)?
            };

            if !(0..=999).contains(&naxis_value) {
                return fitserr!("unsupported NAXIS value in FITS file: {}", naxis_value);
            }

            let mut naxis = Vec::with_capacity(naxis_value as usize);
            let mut header = Header::new();

            for i in 0..3 {
                header.push(Card::parse(&buf[i * RECORD_SIZE..(i + 1) * RECORD_SIZE])?);
            }

            // From here on out we have to read dynamically.

            let mut buf_offset = 240;
            let mut seen_groups = !hdus.is_empty(); // non-primary HDUs all have PCOUNT and GCOUNT.
            let mut pcount = 0;
            let mut gcount = 1;

            loop {
                if buf_offset == BLOCK_SIZE {
                    if !inner.eof_read_exact::<FitsError>(&mut buf)? {
                        return fitserr!("FITS headers end without an END record");
                    }

                    cur_offset += BLOCK_SIZE as u64;
                    buf_offset = 0;
                }

                let record = &buf[buf_offset..buf_offset + RECORD_SIZE];
                buf_offset += RECORD_SIZE;

                if record == END_MARKER {
                    break;
                }

                if accumulate_naxis_value(record, &mut naxis)? {
                    // OK, new naxis value has been handled.
                } else if &record[..GROUPS_MARKER.len()] == GROUPS_MARKER {
                    seen_groups = true;
                } else if seen_groups && &record[..PCOUNT_MARKER.len()] == PCOUNT_MARKER {
                    pcount = parse_fixed_int(record)?;
                } else if seen_groups && &record[..GCOUNT_MARKER.len()] == GCOUNT_MARKER {
                    let n = parse_fixed_int(record)?;

                    if n < 0 {
                        return fitserr!("illegal negative FITS GCOUNT value");
                    }

                    gcount = n as usize;
                }

                let card = Card::parse(record)?;

                if !card.keyword.is_empty() {
                    header.push(card);
                }
            }

            // OK, we're past the END record.

            if naxis.len() != naxis_value as usize {
                return fitserr!(
                    "expected {} NAXISn headers but found {}",
                    naxis_value,
                    naxis.len()
                );
            }

            let extname = if hdus.is_empty() {
                String::new()
            } else {
                match header.get_str("EXTNAME") {
                    Some(s) => s.to_owned(),
                    None => {
                        return fitserr!("illegal extension HDU without EXTNAME header");
                    }
                }
            };

            if seen_groups && hdus.is_empty() && !naxis.is_empty() {
                naxis.remove(0); // dummy 0 value when primary HDU is random-groups
            }

            let n_elements = if naxis.is_empty() {
                0
            } else {
                naxis.iter().product::<usize>() as isize
            };
            let group_size = pcount + n_elements;

            if group_size < 0 {
                return fitserr!("illegal negative FITS group size");
            }

            let data_size = bitpix.n_bytes() * gcount * group_size as usize;

            if hdus.is_empty() {
                kind = if data_size == 0 {
                    HduKind::PrimaryNoData
                } else if seen_groups {
                    HduKind::PrimaryRandomGroups
                } else {
                    HduKind::PrimaryArray
                };
            }

            hdus.push(ParsedHdu {
                kind,
                name: extname,
                header,
                header_offset: hdu_header_offset,
                data_offset: cur_offset,
                bitpix,
                pcount,
                gcount,
                naxis,
            });

            hdu_header_offset = cur_offset + (data_size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE) as u64;
        }

        Ok(FitsReader {
            inner,
            hdus,
            cursor: 1,
        })
    }

    /// Get the set of HDUs that comprise this file.
    pub fn hdus(&self) -> &[ParsedHdu] {
        &self.hdus[..]
    }

    /// Get the header of the primary HDU.
    pub fn primary_header(&self) -> &Header {
        // `new()` refuses streams without a primary HDU.
        &self.hdus[0].header
    }

    /// Move the table cursor back to the first extension HDU.
    pub fn rewind(&mut self) {
        self.cursor = 1;
    }

    /// Decode the next binary table at or after the cursor whose EXTNAME is
    /// `extname`, and advance the cursor past it.
    ///
    /// Returns `Ok(None)` when no more tables of that name remain. That is
    /// the normal way for a scan to end, not an error.
    pub fn next_bintable(&mut self, extname: &str) -> Result<Option<BinTable>, FitsError> {
        while self.cursor < self.hdus.len() {
            let index = self.cursor;
            self.cursor += 1;

            let hdu = &self.hdus[index];

            if hdu.kind == HduKind::BinaryTableExtension && hdu.name == extname {
                return self.read_bintable(index).map(Some);
            }
        }

        Ok(None)
    }

    /// Decode the binary table in HDU number `index`.
    pub fn read_bintable(&mut self, index: usize) -> Result<BinTable, FitsError> {
        let hdu = match self.hdus.get(index) {
            Some(h) => h,
            None => return fitserr!("no HDU number {} in FITS file", index),
        };

        if hdu.kind != HduKind::BinaryTableExtension {
            return fitserr!("HDU #{} is not a binary table", index);
        }

        if hdu.naxis.len() != 2 {
            return fitserr!("binary table HDU #{} has NAXIS = {}", index, hdu.naxis.len());
        }

        let row_bytes = hdu.naxis[0];
        let nrows = hdu.naxis[1];
        let mut data = vec![0u8; row_bytes * nrows];
        self.inner.seek(SeekFrom::Start(hdu.data_offset))?;
        self.inner.read_exact(&mut data)?;

        BinTable::decode(&hdu.name, hdu.header.clone(), row_bytes, nrows, &data)
    }

    /// Consume this reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Parse the integer value of a fixed-format header record.
fn parse_fixed_int(record: &[u8]) -> Result<isize, FitsError> {
    if record[30] != b' ' && record[30] != b'/' {
        return fitserr!("expected space or slash in byte 30 of fixed-format integer record");
    }

    let field = &record[10..30];

    let mut rest = match field.iter().position(|&c| c != b' ') {
        Some(i) => &field[i..],
        None => return fitserr!("empty record that should have been a fixed-format integer"),
    };

    let negate = rest[0] == b'-';

    if rest[0] == b'-' || rest[0] == b'+' {
        rest = &rest[1..];
    }

    if rest.is_empty() {
        return fitserr!("empty record that should have been a fixed-format integer");
    }

    let mut value: isize = 0;

    for &c in rest {
        if !c.is_ascii_digit() {
            return fitserr!(
                "expected digit but got ASCII {:?} in fixed-format integer",
                c
            );
        }

        value = value * 10 + (c - b'0') as isize;
    }

    Ok(if negate { -value } else { value })
}

/// Parse the string value of a fixed-format header record, as used for the
/// mandatory XTENSION keyword.
fn parse_fixed_string(record: &[u8]) -> Result<String, FitsError> {
    if &record[8..11] != b"= '" {
        return fitserr!("expected opening equals and quote in fixed-format string record");
    }

    let (value, rest) = header::parse_string_value(&record[10..])?;
    header::parse_comment(rest)?;
    Ok(value)
}

/// Returns Ok(true) if this record in question was the appropriate NAXISnnn
/// header; Ok(false) if it was some other valid-looking header; Err(_) if it
/// looks like it should have been a NAXIS header but something went wrong.
fn accumulate_naxis_value(record: &[u8], naxis: &mut Vec<usize>) -> Result<bool, FitsError> {
    if &record[..5] != b"NAXIS" {
        return Ok(false);
    }

    let suffix = &record[5..8];
    let n_digits = suffix.iter().take_while(|c| c.is_ascii_digit()).count();

    if n_digits == 0 {
        return Ok(false);
    }

    if suffix[n_digits..].iter().any(|&c| c != b' ') {
        return fitserr!("malformed FITS NAXISn keyword");
    }

    if &record[8..10] != b"= " {
        return fitserr!("malformed FITS NAXIS header");
    }

    let value = suffix[..n_digits]
        .iter()
        .fold(0, |acc, &c| acc * 10 + (c - b'0') as usize);

    if value != naxis.len() + 1 {
        return fitserr!(
            "misnumbered NAXIS header (expected {}, got {})",
            naxis.len() + 1,
            value
        );
    }

    let n = parse_fixed_int(record)?;

    if n < 0 {
        return fitserr!("illegal negative NAXIS{} value {}", value, n);
    }

    naxis.push(n as usize);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fixed_int_parsing() {
        // 0         1         2         3         4         5         6         7
        // 01234567890123456789012345678901234567890123456789012345678901234567890123456789
        //"NAXIS   =                  999 / comment                                        "

        let r = b"NAXIS   =                  999 / comment                                        ";
        assert_eq!(parse_fixed_int(r).unwrap(), 999);
        let r = b"NAXIS   =          -2147483648 / comment                                        ";
        assert_eq!(parse_fixed_int(r).unwrap(), -2147483648);
        let r = b"NAXIS   =                  999/ comment                                         ";
        assert_eq!(parse_fixed_int(r).unwrap(), 999);
        let r = b"NAXIS   =                 +999 / comment                                        ";
        assert_eq!(parse_fixed_int(r).unwrap(), 999);
        let r = b"NAXIS   = -0000000000000000999 / comment                                        ";
        assert_eq!(parse_fixed_int(r).unwrap(), -999);
        let r = b"NAXIS   = A                  9 / comment                                        ";
        assert!(parse_fixed_int(r).is_err());
        let r = b"NAXIS   =                    9A / comment                                       ";
        assert!(parse_fixed_int(r).is_err());
        let r = b"NAXIS   =                      / comment                                        ";
        assert!(parse_fixed_int(r).is_err());
    }

    #[test]
    fn fixed_string_parsing() {
        let r = b"XTENSION= 'BINTABLE'           / binary table extension                         ";
        assert_eq!(parse_fixed_string(r).unwrap(), "BINTABLE");
        let r = b"XTENSION= 'IMAGE   '                                                            ";
        assert_eq!(parse_fixed_string(r).unwrap(), "IMAGE");
        let r = b"XTENSION= nope                                                                  ";
        assert!(parse_fixed_string(r).is_err());
        let r = b"XTENSION= 'OK' nope                                                             ";
        assert!(parse_fixed_string(r).is_err());
    }

    #[test]
    fn naxis_accumulation() {
        let mut naxis = Vec::new();
        let r = b"NAXIS1  =                   24 / width of table in bytes                        ";
        assert!(accumulate_naxis_value(r, &mut naxis).unwrap());
        let r = b"NAXIS3  =                    2                                                  ";
        assert!(accumulate_naxis_value(r, &mut naxis).is_err());
        let r = b"NAXIS2  =                    2                                                  ";
        assert!(accumulate_naxis_value(r, &mut naxis).unwrap());
        let r = b"EXTNAME = 'OI_VIS2 '                                                            ";
        assert!(!accumulate_naxis_value(r, &mut naxis).unwrap());
        assert_eq!(naxis, vec![24, 2]);
    }

    fn two_table_stream() -> Vec<u8> {
        let mut primary = Header::new();
        primary.set("ORIGIN", HeaderValue::Text("test".to_owned()));

        let mut w = FitsWriter::new(Vec::new());
        w.write_primary(&primary).unwrap();

        for (name, value) in &[("FIRST", 1i32), ("SECOND", 2), ("FIRST", 3)] {
            let mut t = BinTable::new(*name, 1);
            t.push_column(Column::new("X", 1, ColumnData::Int32(vec![*value])))
                .unwrap();
            w.write_bintable(&t).unwrap();
        }

        w.close().unwrap()
    }

    #[test]
    fn scan_and_rewind() {
        let data = two_table_stream();
        assert_eq!(data.len() % BLOCK_SIZE, 0);

        let mut r = FitsReader::new(Cursor::new(data)).unwrap();
        assert_eq!(r.hdus().len(), 4);
        assert_eq!(r.hdus()[0].kind(), HduKind::PrimaryNoData);
        assert_eq!(r.primary_header().get_str("ORIGIN"), Some("test"));

        let mut seen = Vec::new();

        while let Some(t) = r.next_bintable("FIRST").unwrap() {
            seen.push(t.column("X").unwrap().to_i32_vec().unwrap()[0]);
        }

        assert_eq!(seen, vec![1, 3]);
        assert!(r.next_bintable("SECOND").unwrap().is_none());

        r.rewind();
        let t = r.next_bintable("SECOND").unwrap().unwrap();
        assert_eq!(t.nrows(), 1);
    }

    #[test]
    fn rejects_non_fits() {
        let data = vec![b' '; BLOCK_SIZE];
        assert!(FitsReader::new(Cursor::new(data)).is_err());
        assert!(FitsReader::new(Cursor::new(Vec::new())).is_err());
    }
}
