// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Writing FITS files made of a dataless primary HDU and binary tables.

use crate::bintable::BinTable;
use crate::header::{Card, Header, HeaderValue};
use crate::{FitsError, BLOCK_SIZE};
use oifits_core::io::BlockWriter;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

const PRIMARY_STRUCTURAL: &[&str] = &["SIMPLE", "BITPIX", "NAXIS", "EXTEND", "END", ""];

/// A streaming FITS writer.
///
/// The primary HDU must be written first, with [`FitsWriter::write_primary`].
/// Every HDU is padded out to a whole number of FITS blocks as it is
/// written.
#[derive(Debug)]
pub struct FitsWriter<W: Write> {
    inner: BlockWriter<W>,
    n_hdus: usize,
}

impl FitsWriter<BufWriter<File>> {
    /// Create a new FITS file at the given path.
    ///
    /// This fails if the path already exists: we never overwrite data.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, FitsError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FitsWriter<W> {
    /// Wrap a stream.
    pub fn new(inner: W) -> Self {
        FitsWriter {
            inner: BlockWriter::new(inner, BLOCK_SIZE),
            n_hdus: 0,
        }
    }

    /// The number of HDUs written so far.
    pub fn n_hdus(&self) -> usize {
        self.n_hdus
    }

    fn write_header_cards<'a, I>(&mut self, cards: I) -> Result<(), FitsError>
    where
        I: IntoIterator<Item = &'a Card>,
    {
        for card in cards {
            self.inner.write_all(&card.encode())?;
        }

        self.inner
            .write_all(&Card::new("END", HeaderValue::Undefined).encode())?;
        self.inner.pad_to_block(b' ')?;
        Ok(())
    }

    /// Write the primary HDU, which carries no data.
    ///
    /// The mandatory keywords are generated here; any copies of them in
    /// `header` are skipped.
    pub fn write_primary(&mut self, header: &Header) -> Result<(), FitsError> {
        if self.n_hdus != 0 {
            return fitserr!("the FITS primary HDU has already been written");
        }

        let mut cards = vec![
            Card::new("SIMPLE", HeaderValue::Logical(true))
                .with_comment("file conforms to FITS standard"),
            Card::new("BITPIX", HeaderValue::Integer(8)),
            Card::new("NAXIS", HeaderValue::Integer(0)).with_comment("no primary data array"),
            Card::new("EXTEND", HeaderValue::Logical(true))
                .with_comment("extensions may be present"),
        ];

        cards.extend(
            header
                .cards()
                .iter()
                .filter(|c| !PRIMARY_STRUCTURAL.contains(&c.keyword.as_str()))
                .cloned(),
        );

        self.write_header_cards(&cards)?;
        self.n_hdus += 1;
        Ok(())
    }

    /// Append a binary table extension.
    pub fn write_bintable(&mut self, table: &BinTable) -> Result<(), FitsError> {
        if self.n_hdus == 0 {
            return fitserr!("the FITS primary HDU must be written before any extensions");
        }

        let cards = table.header_cards();
        self.write_header_cards(&cards)?;
        self.inner.write_all(&table.encode_data())?;
        self.inner.pad_to_block(0)?;
        self.n_hdus += 1;
        Ok(())
    }

    /// Flush the stream and return it.
    pub fn close(mut self) -> Result<W, FitsError> {
        if self.n_hdus == 0 {
            return fitserr!("refusing to finish a FITS stream without a primary HDU");
        }

        self.inner.flush()?;
        Ok(self.inner.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bintable::{Column, ColumnData};
    use crate::RECORD_SIZE;

    #[test]
    fn primary_layout() {
        let mut h = Header::new();
        h.set("NAXIS", HeaderValue::Integer(3));
        h.set("OBJECT", HeaderValue::Text("Betelgeuse".to_owned()));

        let mut w = FitsWriter::new(Vec::new());
        w.write_primary(&h).unwrap();
        assert!(w.write_primary(&h).is_err());
        let data = w.close().unwrap();

        assert_eq!(data.len(), BLOCK_SIZE);
        assert_eq!(&data[..30], b"SIMPLE  =                    T");
        assert_eq!(&data[2 * RECORD_SIZE..2 * RECORD_SIZE + 30], b"NAXIS   =                    0");
        assert_eq!(&data[4 * RECORD_SIZE..4 * RECORD_SIZE + 6], b"OBJECT");
        assert_eq!(&data[5 * RECORD_SIZE..5 * RECORD_SIZE + 3], b"END");
        assert!(data[5 * RECORD_SIZE + 3..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn tables_need_primary() {
        let mut w = FitsWriter::new(Vec::new());
        let t = BinTable::new("OI_TARGET", 0);
        assert!(w.write_bintable(&t).is_err());
        assert!(w.close().is_err());
    }

    #[test]
    fn data_padding() {
        let mut w = FitsWriter::new(Vec::new());
        w.write_primary(&Header::new()).unwrap();

        let mut t = BinTable::new("OI_VIS2", 3);
        t.push_column(Column::new("VIS2DATA", 2, ColumnData::Float64(vec![1.0; 6])))
            .unwrap();
        w.write_bintable(&t).unwrap();
        assert_eq!(w.n_hdus(), 2);

        let data = w.close().unwrap();
        assert_eq!(data.len(), 3 * BLOCK_SIZE);
        assert!(data[2 * BLOCK_SIZE + 48..].iter().all(|&b| b == 0));
    }
}
