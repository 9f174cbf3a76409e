// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! FITS binary tables (`XTENSION = 'BINTABLE'`).
//!
//! A table is decoded into whole columns: each [`Column`] holds the values
//! of every row, flattened in row order, with `repeat` elements per row.
//! Text columns are the exception and hold one string per row.
//!
//! Supported `TFORMn` codes are `L`, `A`, `B`, `I`, `J`, `K`, `E`, `D` and
//! `C`. Variable-length array descriptors (`P`, `Q`) and bit columns (`X`)
//! are rejected, as are the scaling keywords.

use crate::header::{Card, Header, HeaderValue};
use crate::FitsError;
use byteorder::{BigEndian, ByteOrder};
use oifits_core::Complex;
use std::str;

/// The data of one binary table column, flattened in row order.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// `L`: logical values.
    Logical(Vec<bool>),

    /// `A`: one string per row; the column's repeat count is its width.
    Text(Vec<String>),

    /// `B`: unsigned bytes.
    UInt8(Vec<u8>),

    /// `I`: 16-bit integers.
    Int16(Vec<i16>),

    /// `J`: 32-bit integers.
    Int32(Vec<i32>),

    /// `K`: 64-bit integers.
    Int64(Vec<i64>),

    /// `E`: single-precision floats.
    Float32(Vec<f32>),

    /// `D`: double-precision floats.
    Float64(Vec<f64>),

    /// `C`: single-precision complex values.
    Complex32(Vec<Complex<f32>>),
}

impl ColumnData {
    /// The TFORM type code for this kind of data.
    pub fn tform_code(&self) -> char {
        match *self {
            ColumnData::Logical(_) => 'L',
            ColumnData::Text(_) => 'A',
            ColumnData::UInt8(_) => 'B',
            ColumnData::Int16(_) => 'I',
            ColumnData::Int32(_) => 'J',
            ColumnData::Int64(_) => 'K',
            ColumnData::Float32(_) => 'E',
            ColumnData::Float64(_) => 'D',
            ColumnData::Complex32(_) => 'C',
        }
    }

    /// The number of values held.
    pub fn len(&self) -> usize {
        match *self {
            ColumnData::Logical(ref v) => v.len(),
            ColumnData::Text(ref v) => v.len(),
            ColumnData::UInt8(ref v) => v.len(),
            ColumnData::Int16(ref v) => v.len(),
            ColumnData::Int32(ref v) => v.len(),
            ColumnData::Int64(ref v) => v.len(),
            ColumnData::Float32(ref v) => v.len(),
            ColumnData::Float64(ref v) => v.len(),
            ColumnData::Complex32(ref v) => v.len(),
        }
    }

    /// Returns true if no values are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The number of bytes that one element of a TFORM type occupies.
fn element_size(code: char) -> Result<usize, FitsError> {
    match code {
        'L' | 'A' | 'B' => Ok(1),
        'I' => Ok(2),
        'J' | 'E' => Ok(4),
        'K' | 'D' | 'C' => Ok(8),
        other => fitserr!("unsupported binary table TFORM type code {:?}", other),
    }
}

/// Parse a TFORM value like `"16A"` or `"D"` into a repeat count and type code.
fn parse_tform(tform: &str) -> Result<(usize, char), FitsError> {
    let tform = tform.trim();
    let n_digits = tform.chars().take_while(|c| c.is_ascii_digit()).count();

    let repeat = if n_digits == 0 {
        1
    } else {
        match tform[..n_digits].parse() {
            Ok(n) => n,
            Err(_) => return fitserr!("bad repeat count in TFORM {:?}", tform),
        }
    };

    let code = match tform[n_digits..].chars().next() {
        Some(c) => c,
        None => return fitserr!("missing type code in TFORM {:?}", tform),
    };

    element_size(code)?;
    Ok((repeat, code))
}

/// Parse a TDIM value like `"(3,3)"`.
fn parse_tdim(tdim: &str) -> Result<Vec<usize>, FitsError> {
    let inner = match tdim
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(s) => s,
        None => return fitserr!("malformed TDIM value {:?}", tdim),
    };

    inner
        .split(',')
        .map(|piece| match piece.trim().parse() {
            Ok(n) => Ok(n),
            Err(_) => fitserr!("malformed TDIM value {:?}", tdim),
        })
        .collect()
}

/// One column of a binary table.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// The column name (`TTYPEn`).
    pub name: String,

    /// The physical unit (`TUNITn`), if any.
    pub unit: Option<String>,

    /// The number of elements per row; for text columns, the string width.
    pub repeat: usize,

    /// The multidimensional shape of each cell (`TDIMn`), if declared.
    pub dim: Option<Vec<usize>>,

    /// The values.
    pub data: ColumnData,
}

macro_rules! numeric_conversion {
    ($self:ident, $target:ty, $expected:expr; $($variant:ident),*) => {
        match $self.data {
            $(ColumnData::$variant(ref v) => Ok(v.iter().map(|x| *x as $target).collect()),)*
            _ => Err(FitsError::ColumnType {
                column: $self.name.clone(),
                expected: $expected,
            }),
        }
    }
}

impl Column {
    /// Create a new column with no unit or dimension information.
    pub fn new<S: Into<String>>(name: S, repeat: usize, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            unit: None,
            repeat,
            dim: None,
            data,
        }
    }

    /// Set the physical unit of this column.
    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the per-cell shape of this column.
    pub fn with_dim(mut self, dim: Vec<usize>) -> Self {
        self.dim = Some(dim);
        self
    }

    /// The TFORM value describing this column.
    pub fn tform(&self) -> String {
        format!("{}{}", self.repeat, self.data.tform_code())
    }

    /// The number of values this column must hold for a table of `nrows` rows.
    fn expected_len(&self, nrows: usize) -> usize {
        match self.data {
            ColumnData::Text(_) => nrows,
            _ => nrows * self.repeat,
        }
    }

    fn row_bytes(&self) -> usize {
        match self.data {
            ColumnData::Text(_) => self.repeat,
            _ => self.repeat * element_size(self.data.tform_code()).unwrap_or(0),
        }
    }

    /// Get the values as doubles, converting from any real or integer type.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, FitsError> {
        numeric_conversion!(self, f64, "double"; UInt8, Int16, Int32, Int64, Float32, Float64)
    }

    /// Get the values as singles, converting from any real or integer type.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>, FitsError> {
        numeric_conversion!(self, f32, "float"; UInt8, Int16, Int32, Int64, Float32, Float64)
    }

    /// Get the values as 32-bit integers, converting from any integer type.
    pub fn to_i32_vec(&self) -> Result<Vec<i32>, FitsError> {
        numeric_conversion!(self, i32, "integer"; UInt8, Int16, Int32, Int64)
    }

    /// Get logical values.
    pub fn as_logical(&self) -> Result<&[bool], FitsError> {
        match self.data {
            ColumnData::Logical(ref v) => Ok(&v[..]),
            _ => Err(FitsError::ColumnType {
                column: self.name.clone(),
                expected: "logical",
            }),
        }
    }

    /// Get text values, one per row.
    pub fn as_text(&self) -> Result<&[String], FitsError> {
        match self.data {
            ColumnData::Text(ref v) => Ok(&v[..]),
            _ => Err(FitsError::ColumnType {
                column: self.name.clone(),
                expected: "text",
            }),
        }
    }

    /// Get complex values.
    pub fn as_complex(&self) -> Result<&[Complex<f32>], FitsError> {
        match self.data {
            ColumnData::Complex32(ref v) => Ok(&v[..]),
            _ => Err(FitsError::ColumnType {
                column: self.name.clone(),
                expected: "complex",
            }),
        }
    }

    fn encode_row(&self, row: usize, buf: &mut Vec<u8>) {
        let lo = row * self.repeat;
        let hi = lo + self.repeat;

        match self.data {
            ColumnData::Logical(ref v) => {
                buf.extend(v[lo..hi].iter().map(|&b| if b { b'T' } else { b'F' }));
            }

            ColumnData::Text(ref v) => {
                let mut cell: Vec<u8> = v[row]
                    .bytes()
                    .map(|b| if (0x20..=0x7E).contains(&b) { b } else { b'?' })
                    .take(self.repeat)
                    .collect();
                cell.resize(self.repeat, b' ');
                buf.extend_from_slice(&cell);
            }

            ColumnData::UInt8(ref v) => buf.extend_from_slice(&v[lo..hi]),

            ColumnData::Int16(ref v) => {
                encode_elements(&v[lo..hi], buf, 2, |b, x| BigEndian::write_i16(b, *x))
            }

            ColumnData::Int32(ref v) => {
                encode_elements(&v[lo..hi], buf, 4, |b, x| BigEndian::write_i32(b, *x))
            }

            ColumnData::Int64(ref v) => {
                encode_elements(&v[lo..hi], buf, 8, |b, x| BigEndian::write_i64(b, *x))
            }

            ColumnData::Float32(ref v) => {
                encode_elements(&v[lo..hi], buf, 4, |b, x| BigEndian::write_f32(b, *x))
            }

            ColumnData::Float64(ref v) => {
                encode_elements(&v[lo..hi], buf, 8, |b, x| BigEndian::write_f64(b, *x))
            }

            ColumnData::Complex32(ref v) => encode_elements(&v[lo..hi], buf, 8, |b, x| {
                BigEndian::write_f32(&mut b[..4], x.re);
                BigEndian::write_f32(&mut b[4..], x.im);
            }),
        }
    }
}

fn encode_elements<T, F>(values: &[T], buf: &mut Vec<u8>, size: usize, put: F)
where
    F: Fn(&mut [u8], &T),
{
    let start = buf.len();
    buf.resize(start + values.len() * size, 0);

    for (chunk, x) in buf[start..].chunks_exact_mut(size).zip(values) {
        put(chunk, x);
    }
}

/// The position of one column within a row, as described by the header.
struct ColumnLayout {
    offset: usize,
    repeat: usize,
    code: char,
}

impl ColumnLayout {
    fn decode_elements<T, F>(
        &self,
        data: &[u8],
        row_bytes: usize,
        nrows: usize,
        get: F,
    ) -> Vec<T>
    where
        F: Fn(&[u8]) -> T,
    {
        let size = element_size(self.code).unwrap_or(1);
        let mut values = Vec::with_capacity(nrows * self.repeat);

        for row in 0..nrows {
            let start = row * row_bytes + self.offset;
            let cell = &data[start..start + self.repeat * size];
            values.extend(cell.chunks_exact(size).map(&get));
        }

        values
    }

    fn decode(
        &self,
        data: &[u8],
        row_bytes: usize,
        nrows: usize,
    ) -> Result<ColumnData, FitsError> {
        macro_rules! elements {
            ($col:expr, $get:expr) => {
                $col.decode_elements(data, row_bytes, nrows, $get)
            };
        }

        Ok(match self.code {
            'L' => ColumnData::Logical(elements!(self, |b: &[u8]| b[0] == b'T')),

            'A' => {
                let mut values = Vec::with_capacity(nrows);

                for row in 0..nrows {
                    let start = row * row_bytes + self.offset;
                    let cell = &data[start..start + self.repeat];
                    let end = cell.iter().position(|&b| b == 0).unwrap_or(cell.len());
                    values.push(str::from_utf8(&cell[..end])?.trim_end().to_owned());
                }

                ColumnData::Text(values)
            }

            'B' => ColumnData::UInt8(elements!(self, |b: &[u8]| b[0])),
            'I' => ColumnData::Int16(elements!(self, BigEndian::read_i16)),
            'J' => ColumnData::Int32(elements!(self, BigEndian::read_i32)),
            'K' => ColumnData::Int64(elements!(self, BigEndian::read_i64)),
            'E' => ColumnData::Float32(elements!(self, BigEndian::read_f32)),
            'D' => ColumnData::Float64(elements!(self, BigEndian::read_f64)),

            'C' => ColumnData::Complex32(self.decode_elements(data, row_bytes, nrows, |b| {
                Complex::new(BigEndian::read_f32(&b[..4]), BigEndian::read_f32(&b[4..]))
            })),

            other => return fitserr!("unsupported binary table TFORM type code {:?}", other),
        })
    }
}

/// Keywords that describe the layout of a binary table HDU. The writer
/// generates these itself, so copies found in [`BinTable::header`] are not
/// written out.
fn is_structural_keyword(keyword: &str) -> bool {
    const EXACT: &[&str] = &[
        "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "PCOUNT", "GCOUNT", "TFIELDS", "EXTNAME",
        "EXTEND", "THEAP", "END", "",
    ];
    const INDEXED: &[&str] = &[
        "NAXIS", "TTYPE", "TFORM", "TUNIT", "TDIM", "TSCAL", "TZERO", "TNULL",
    ];

    if EXACT.contains(&keyword) {
        return true;
    }

    INDEXED.iter().any(|prefix| {
        keyword
            .strip_prefix(prefix)
            .map(|rest| !rest.is_empty() && rest.bytes().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    })
}

/// A binary table, held entirely in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct BinTable {
    /// The extension name (`EXTNAME`).
    pub extname: String,

    /// Header cards beyond those that describe the table layout.
    ///
    /// When a table is read from a file, this holds every card of its HDU.
    pub header: Header,

    nrows: usize,
    columns: Vec<Column>,
}

impl BinTable {
    /// Create a new, columnless table with the given number of rows.
    pub fn new<S: Into<String>>(extname: S, nrows: usize) -> Self {
        BinTable {
            extname: extname.into(),
            header: Header::new(),
            nrows,
            columns: Vec::new(),
        }
    }

    /// The number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// The columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns[..]
    }

    /// Append a column, checking that it holds the right number of values.
    pub fn push_column(&mut self, column: Column) -> Result<(), FitsError> {
        let expected = column.expected_len(self.nrows);

        if column.data.len() != expected {
            return fitserr!(
                "column {} should hold {} values but holds {}",
                column.name,
                expected,
                column.data.len()
            );
        }

        self.columns.push(column);
        Ok(())
    }

    /// Look up a column by name, ignoring case.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Look up a column by name, failing if it does not exist.
    pub fn column(&self, name: &str) -> Result<&Column, FitsError> {
        self.find_column(name)
            .ok_or_else(|| FitsError::MissingColumn(name.to_owned()))
    }

    /// The width of one row in bytes.
    pub fn row_bytes(&self) -> usize {
        self.columns.iter().map(|c| c.row_bytes()).sum()
    }

    /// Decode a table from its header and its raw data bytes.
    pub(crate) fn decode(
        extname: &str,
        header: Header,
        row_bytes: usize,
        nrows: usize,
        data: &[u8],
    ) -> Result<Self, FitsError> {
        let tfields = header.require_int("TFIELDS")?;

        if tfields < 0 {
            return fitserr!("illegal negative TFIELDS value {}", tfields);
        }

        let mut layouts = Vec::with_capacity(tfields as usize);
        let mut columns = Vec::with_capacity(tfields as usize);
        let mut offset = 0;

        for i in 1..=tfields {
            let (repeat, code) = parse_tform(header.require_str(&format!("TFORM{i}"))?)?;

            let dim = match header.get_str(&format!("TDIM{i}")) {
                Some(s) => Some(parse_tdim(s)?),
                None => None,
            };

            columns.push(Column {
                name: header.get_str(&format!("TTYPE{i}")).unwrap_or("").to_owned(),
                unit: header
                    .get_str(&format!("TUNIT{i}"))
                    .filter(|u| !u.is_empty())
                    .map(|u| u.to_owned()),
                repeat,
                dim,
                data: ColumnData::Logical(Vec::new()),
            });

            layouts.push(ColumnLayout {
                offset,
                repeat,
                code,
            });

            offset += repeat * element_size(code)?;
        }

        if offset != row_bytes {
            return fitserr!(
                "binary table {} has NAXIS1 = {} but its columns total {} bytes",
                extname,
                row_bytes,
                offset
            );
        }

        if data.len() < row_bytes * nrows {
            return fitserr!("binary table {} data are truncated", extname);
        }

        for (column, layout) in columns.iter_mut().zip(&layouts) {
            column.data = layout.decode(data, row_bytes, nrows)?;
        }

        Ok(BinTable {
            extname: extname.to_owned(),
            header,
            nrows,
            columns,
        })
    }

    /// The header cards that describe this table's layout, in the order the
    /// standard prescribes, followed by the extra cards in [`BinTable::header`].
    pub(crate) fn header_cards(&self) -> Vec<Card> {
        let mut cards = vec![
            Card::new("XTENSION", HeaderValue::Text("BINTABLE".to_owned()))
                .with_comment("binary table extension"),
            Card::new("BITPIX", HeaderValue::Integer(8)),
            Card::new("NAXIS", HeaderValue::Integer(2)),
            Card::new("NAXIS1", HeaderValue::Integer(self.row_bytes() as i64))
                .with_comment("width of table in bytes"),
            Card::new("NAXIS2", HeaderValue::Integer(self.nrows as i64))
                .with_comment("number of rows in table"),
            Card::new("PCOUNT", HeaderValue::Integer(0)),
            Card::new("GCOUNT", HeaderValue::Integer(1)),
            Card::new("TFIELDS", HeaderValue::Integer(self.columns.len() as i64)),
        ];

        for (i, column) in self.columns.iter().enumerate() {
            let n = i + 1;
            cards.push(Card::new(format!("TTYPE{n}"), HeaderValue::Text(column.name.clone())));
            cards.push(Card::new(format!("TFORM{n}"), HeaderValue::Text(column.tform())));

            if let Some(ref unit) = column.unit {
                cards.push(Card::new(format!("TUNIT{n}"), HeaderValue::Text(unit.clone())));
            }

            if let Some(ref dim) = column.dim {
                let dims: Vec<String> = dim.iter().map(|d| d.to_string()).collect();
                cards.push(Card::new(
                    format!("TDIM{n}"),
                    HeaderValue::Text(format!("({})", dims.join(","))),
                ));
            }
        }

        cards.push(Card::new("EXTNAME", HeaderValue::Text(self.extname.clone())));

        for card in self.header.cards() {
            if !is_structural_keyword(&card.keyword) {
                cards.push(card.clone());
            }
        }

        cards
    }

    /// Encode the table rows into bytes, without block padding.
    pub(crate) fn encode_data(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.nrows * self.row_bytes());

        for row in 0..self.nrows {
            for column in &self.columns {
                column.encode_row(row, &mut buf);
            }
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tform_parsing() {
        assert_eq!(parse_tform("16A").unwrap(), (16, 'A'));
        assert_eq!(parse_tform("D").unwrap(), (1, 'D'));
        assert_eq!(parse_tform(" 3E ").unwrap(), (3, 'E'));
        assert_eq!(parse_tform("0L").unwrap(), (0, 'L'));
        assert!(parse_tform("1PE(12)").is_err());
        assert!(parse_tform("12").is_err());
    }

    #[test]
    fn tdim_parsing() {
        assert_eq!(parse_tdim("(3,3)").unwrap(), vec![3, 3]);
        assert_eq!(parse_tdim(" (4) ").unwrap(), vec![4]);
        assert!(parse_tdim("3,3").is_err());
    }

    #[test]
    fn structural_keywords() {
        assert!(is_structural_keyword("NAXIS2"));
        assert!(is_structural_keyword("TFORM12"));
        assert!(!is_structural_keyword("TFORMAT"));
        assert!(!is_structural_keyword("OI_REVN"));
        assert!(!is_structural_keyword("INSNAME"));
    }

    #[test]
    fn column_length_is_checked() {
        let mut t = BinTable::new("OI_WAVELENGTH", 2);
        assert!(t
            .push_column(Column::new("EFF_WAVE", 1, ColumnData::Float32(vec![1e-6])))
            .is_err());
        t.push_column(Column::new("EFF_WAVE", 1, ColumnData::Float32(vec![1e-6, 2e-6])))
            .unwrap();
        t.push_column(Column::new("NAME", 4, ColumnData::Text(vec!["a".into(), "b".into()])))
            .unwrap();
        assert_eq!(t.row_bytes(), 8);
        assert_eq!(t.column("eff_wave").unwrap().repeat, 1);
        assert!(matches!(t.column("EFF_BAND"), Err(FitsError::MissingColumn(_))));
    }

    #[test]
    fn decode_encoded_rows() {
        let mut t = BinTable::new("MIXED", 2);
        t.push_column(Column::new("FLAG", 2, ColumnData::Logical(vec![true, false, false, true])))
            .unwrap();
        t.push_column(Column::new("NAME", 3, ColumnData::Text(vec!["ab".into(), "xyzw".into()])))
            .unwrap();
        t.push_column(Column::new("IDX", 1, ColumnData::Int16(vec![-3, 7])))
            .unwrap();
        t.push_column(Column::new(
            "J",
            1,
            ColumnData::Complex32(vec![Complex::new(1.0, -1.0), Complex::new(0.5, 2.0)]),
        ))
        .unwrap();

        let data = t.encode_data();
        assert_eq!(data.len(), 2 * t.row_bytes());

        let mut header = Header::new();

        for card in t.header_cards() {
            header.push(card);
        }

        let back = BinTable::decode("MIXED", header, t.row_bytes(), 2, &data).unwrap();
        assert_eq!(back.columns().len(), 4);
        assert_eq!(
            back.column("FLAG").unwrap().as_logical().unwrap(),
            &[true, false, false, true]
        );
        // Text cells are truncated to the column width.
        assert_eq!(
            back.column("NAME").unwrap().as_text().unwrap(),
            &["ab".to_owned(), "xyz".to_owned()]
        );
        assert_eq!(back.column("IDX").unwrap().to_i32_vec().unwrap(), vec![-3, 7]);
        assert_eq!(back.column("J").unwrap().as_complex().unwrap()[1], Complex::new(0.5, 2.0));
        assert!(back.column("J").unwrap().to_f64_vec().is_err());
    }
}
