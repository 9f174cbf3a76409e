// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
Reading a data set from a FITS file.

The file is scanned once per table type, in a fixed order: arrays,
wavelengths, correlations, polarization, and then the measurement tables.
Each measurement table's references are resolved as it is loaded, so they
can only be satisfied by the named tables of the earlier passes.

*/

use oifits_core::notify::NotificationBackend;
use oifits_core::on_severe;
use oifits_fits::FitsReader;
use std::io::{Read, Seek};
use std::path::Path;

use crate::errors::{OifitsError, Result};
use crate::tables::{
    array::ArrayTable, corr::CorrTable, flux::SpectrumTable, header::PrimaryHeader,
    polar::PolarTable, t3::T3Table, target::TargetList, vis::VisTable, vis2::Vis2Table,
    wavelength::WavelengthTable, MeasurementTable, OiTable, StoredTable,
};
use crate::Container;

/// Read every table of one type, starting from the beginning of the file.
fn read_all<T: OiTable, R: Read + Seek>(reader: &mut FitsReader<R>) -> Result<Vec<T>> {
    let mut tables = Vec::new();
    reader.rewind();

    while let Some(bintable) = reader.next_bintable(T::EXTNAME)? {
        tables.push(T::from_bintable(&bintable)?);
    }

    Ok(tables)
}

fn load_tables<T: StoredTable, R: Read + Seek>(
    reader: &mut FitsReader<R>,
    container: &mut Container,
) -> Result<()> {
    for table in read_all::<T, R>(reader)? {
        container.add_table(table);
    }

    Ok(())
}

fn load_measurements<T, R>(
    reader: &mut FitsReader<R>,
    container: &mut Container,
    nb: &mut dyn NotificationBackend,
) -> Result<()>
where
    T: MeasurementTable + StoredTable,
    R: Read + Seek,
{
    for table in read_all::<T, R>(reader)? {
        container.add_measurement(table, nb);
    }

    Ok(())
}

fn load_inner<R: Read + Seek>(
    reader: &mut FitsReader<R>,
    nb: &mut dyn NotificationBackend,
) -> Result<Container> {
    let mut container = Container::new();
    container.header = PrimaryHeader::from_fits_header(reader.primary_header());

    reader.rewind();
    container.targets = match reader.next_bintable(TargetList::EXTNAME)? {
        Some(t) => TargetList::from_bintable(&t)?,
        None => return Err(OifitsError::MissingTargetTable),
    };

    load_tables::<ArrayTable, R>(reader, &mut container)?;
    load_tables::<WavelengthTable, R>(reader, &mut container)?;
    load_tables::<CorrTable, R>(reader, &mut container)?;
    load_tables::<PolarTable, R>(reader, &mut container)?;
    load_measurements::<VisTable, R>(reader, &mut container, nb)?;
    load_measurements::<Vis2Table, R>(reader, &mut container, nb)?;
    load_measurements::<T3Table, R>(reader, &mut container, nb)?;
    load_measurements::<SpectrumTable, R>(reader, &mut container, nb)?;

    // Version 1 files need not carry the aggregate header keywords.
    if container.is_oifits_one() {
        container.synthesize_header();
    }

    Ok(container)
}

impl Container {
    /// Load a data set from the FITS file at `path`.
    ///
    /// Failures of the FITS layer, and a missing `OI_TARGET` table, are
    /// fatal: they are reported to `nb` and returned. References to tables
    /// that do not exist are only warned about.
    pub fn read<P: AsRef<Path>>(path: P, nb: &mut dyn NotificationBackend) -> Result<Container> {
        let result = FitsReader::open_readonly(path)
            .map_err(OifitsError::from)
            .and_then(|mut reader| load_inner(&mut reader, nb));

        if let Err(ref e) = result {
            on_severe!(nb, "FITS error in read: {}", e);
        }

        result
    }

    /// Load a data set from an already-opened FITS stream.
    pub fn from_fits_reader<R: Read + Seek>(
        reader: &mut FitsReader<R>,
        nb: &mut dyn NotificationBackend,
    ) -> Result<Container> {
        let result = load_inner(reader, nb);

        if let Err(ref e) = result {
            on_severe!(nb, "FITS error in read: {}", e);
        }

        result
    }
}
