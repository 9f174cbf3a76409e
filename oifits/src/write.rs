// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Writing a data set to a FITS file.

use oifits_core::notify::NotificationBackend;
use oifits_core::on_severe;
use oifits_fits::FitsWriter;
use std::io::Write;
use std::path::Path;

use crate::errors::{OifitsError, Result};
use crate::tables::OiTable;
use crate::Container;

/// Write a sequence of tables, numbering their `EXTVER` from 1.
fn write_tables<T: OiTable, W: Write>(writer: &mut FitsWriter<W>, tables: &[T]) -> Result<()> {
    for (i, table) in tables.iter().enumerate() {
        writer.write_bintable(&table.to_bintable(i as i32 + 1)?)?;
    }

    Ok(())
}

impl Container {
    /// Write this data set to a new FITS file at `path`.
    ///
    /// The file must not already exist. If writing fails partway, the
    /// partial file is left behind. Failures are reported to `nb` and
    /// returned.
    pub fn write<P: AsRef<Path>>(&self, path: P, nb: &mut dyn NotificationBackend) -> Result<()> {
        let result = FitsWriter::create(path)
            .map_err(OifitsError::from)
            .and_then(|w| self.write_to_fits(w))
            .map(|_| ());

        if let Err(ref e) = result {
            on_severe!(nb, "FITS error in write: {}", e);
        }

        result
    }

    /// Write this data set to a FITS stream, returning the stream once
    /// everything has been flushed.
    ///
    /// Tables are emitted in a canonical order: targets, arrays,
    /// wavelengths, correlations, polarization, visibilities, squared
    /// visibilities, triple products, and spectra.
    pub fn write_to_fits<W: Write>(&self, mut writer: FitsWriter<W>) -> Result<W> {
        writer.write_primary(&self.header.to_fits_header(self.is_oifits_two()))?;
        writer.write_bintable(&self.targets.to_bintable(1)?)?;
        write_tables(&mut writer, self.arrays())?;
        write_tables(&mut writer, self.wavelengths())?;
        write_tables(&mut writer, self.corrs())?;
        write_tables(&mut writer, self.polars())?;
        write_tables(&mut writer, self.vis())?;
        write_tables(&mut writer, self.vis2())?;
        write_tables(&mut writer, self.t3())?;
        write_tables(&mut writer, self.spectra())?;
        Ok(writer.close()?)
    }
}
