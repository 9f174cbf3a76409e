// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
The OIFITS table types and their mapping onto FITS binary tables.

Each table type implements [`OiTable`], which carries its `EXTNAME` and
knows how to convert itself to and from a [`BinTable`]. Tables that other
tables refer to by name implement [`NamedTable`]; tables of measurements
implement [`MeasurementTable`].

*/

use ndarray::{Array1, ArrayView1};
use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};

use crate::errors::{OifitsError, Result};
use crate::index::IndexKind;
use crate::Container;

/// Implement `MeasurementTable` for a table type with the usual fields and
/// a `records: ChannelRecords<_>` member.
macro_rules! impl_measurement_table {
    ($ty:ty) => {
        impl $crate::tables::MeasurementTable for $ty {
            fn date_obs(&self) -> &str {
                &self.date_obs
            }

            fn arrname(&self) -> &str {
                &self.arrname
            }

            fn insname(&self) -> &str {
                &self.insname
            }

            fn corrname(&self) -> &str {
                &self.corrname
            }

            fn nwave(&self) -> usize {
                self.records.nwave()
            }

            fn numrec(&self) -> usize {
                self.records.len()
            }

            fn num_unflagged(&self) -> usize {
                self.records
                    .iter()
                    .map(|r| r.flag().iter().filter(|f| !**f).count())
                    .sum()
            }

            fn mjd_range(&self) -> Option<(f64, f64)> {
                self.records.iter().fold(None, |range, r| match range {
                    None => Some((r.mjd, r.mjd)),
                    Some((lo, hi)) => Some((f64::min(lo, r.mjd), f64::max(hi, r.mjd))),
                })
            }
        }
    };
}

pub mod array;
pub mod corr;
pub mod flux;
pub mod header;
pub mod polar;
pub mod target;
pub mod t3;
pub mod vis;
pub mod vis2;
pub mod wavelength;

/// A table that is stored as one FITS binary table extension.
pub trait OiTable: Clone + Sized {
    /// The FITS `EXTNAME` identifying tables of this type.
    const EXTNAME: &'static str;

    /// The `OI_REVN` value assigned to newly created tables.
    const CURRENT_REVISION: i32;

    /// The format revision declared by this table.
    fn revision(&self) -> i32;

    /// Convert this table into a FITS binary table with the given `EXTVER`.
    fn to_bintable(&self, extver: i32) -> Result<BinTable>;

    /// Build a table from a FITS binary table.
    fn from_bintable(table: &BinTable) -> Result<Self>;
}

/// Tables that a [`Container`] holds in an ordered sequence.
pub(crate) trait StoredTable: OiTable {
    fn sequence(container: &Container) -> &[Self];
    fn sequence_mut(container: &mut Container) -> &mut Vec<Self>;
}

/// A table that measurement tables refer to by name.
pub trait NamedTable: OiTable {
    /// Which name index holds tables of this type.
    const KIND: IndexKind;

    /// The natural key of this table.
    fn name(&self) -> &str;
}

/// A table of measurements, referring to other tables by name.
pub trait MeasurementTable: OiTable {
    /// The `DATE-OBS` of the observations.
    fn date_obs(&self) -> &str;

    /// The name of the `OI_ARRAY` table; empty if none.
    fn arrname(&self) -> &str;

    /// The name of the `OI_WAVELENGTH` table.
    fn insname(&self) -> &str;

    /// The name of the `OI_CORR` table; empty if none.
    fn corrname(&self) -> &str;

    /// The number of spectral channels in each record.
    fn nwave(&self) -> usize;

    /// The number of records.
    fn numrec(&self) -> usize;

    /// The number of data points, over all records and channels, that are
    /// not flagged.
    fn num_unflagged(&self) -> usize;

    /// The earliest and latest record `MJD`, or `None` if there are no
    /// records.
    fn mjd_range(&self) -> Option<(f64, f64)>;
}

// Helpers for decoding tables.

pub(crate) fn read_revision(table: &BinTable) -> Result<i32> {
    Ok(table.header.require_int("OI_REVN")? as i32)
}

/// An optional string keyword; absent keywords read as empty.
pub(crate) fn read_keyword(table: &BinTable, keyword: &str) -> String {
    table.header.get_str(keyword).unwrap_or("").to_owned()
}

pub(crate) fn read_required_keyword(table: &BinTable, keyword: &str) -> Result<String> {
    Ok(table.header.require_str(keyword)?.to_owned())
}

pub(crate) fn read_float_keyword(table: &BinTable, keyword: &str) -> Result<f64> {
    table
        .header
        .get_float(keyword)
        .ok_or_else(|| oifits_fits::FitsError::MissingKeyword(keyword.to_owned()).into())
}

/// The number of values per row in a column.
pub(crate) fn column_width(table: &BinTable, name: &str) -> Result<usize> {
    Ok(table.column(name)?.repeat)
}

/// Split a flattened column into one array per row.
pub(crate) fn split_rows<T: Clone>(
    flat: Vec<T>,
    nrows: usize,
    width: usize,
    column: &'static str,
) -> Result<Vec<Array1<T>>> {
    if flat.len() != nrows * width {
        return Err(OifitsError::LengthMismatch {
            column,
            expected: nrows * width,
            actual: flat.len(),
        });
    }

    if width == 0 {
        return Ok(vec![Array1::from(Vec::new()); nrows]);
    }

    Ok(flat
        .chunks_exact(width)
        .map(|chunk| Array1::from(chunk.to_vec()))
        .collect())
}

/// Read a per-channel double column of `nwave` values per row.
pub(crate) fn read_channels_f64(
    table: &BinTable,
    name: &'static str,
    nwave: usize,
) -> Result<Vec<Array1<f64>>> {
    let column = table.column(name)?;
    check_width(column, nwave)?;
    split_rows(column.to_f64_vec()?, table.nrows(), nwave, name)
}

/// Read a per-channel logical column of `width` values per row.
pub(crate) fn read_channels_bool(
    table: &BinTable,
    name: &'static str,
    width: usize,
) -> Result<Vec<Array1<bool>>> {
    let column = table.column(name)?;
    check_width(column, width)?;
    split_rows(column.as_logical()?.to_vec(), table.nrows(), width, name)
}

/// Read an optional per-channel correlation index column. An absent column
/// reads as zero, meaning "no correlation".
pub(crate) fn read_corrindx(table: &BinTable, name: &'static str) -> Result<Vec<i32>> {
    match table.find_column(name) {
        Some(c) => Ok(c.to_i32_vec()?),
        None => Ok(vec![0; table.nrows()]),
    }
}

pub(crate) fn check_width(column: &Column, nwave: usize) -> Result<()> {
    if column.repeat != nwave {
        return Err(OifitsError::ChannelCount {
            expected: nwave,
            actual: column.repeat,
        });
    }

    Ok(())
}

/// Read a column of fixed-size integer tuples, such as `STA_INDEX`.
pub(crate) fn read_index_tuples<const N: usize>(
    table: &BinTable,
    name: &'static str,
) -> Result<Vec<[i32; N]>> {
    let column = table.column(name)?;

    if column.repeat != N {
        return Err(OifitsError::LengthMismatch {
            column: name,
            expected: N,
            actual: column.repeat,
        });
    }

    let flat = column.to_i32_vec()?;
    let mut tuples = Vec::with_capacity(table.nrows());

    for chunk in flat.chunks_exact(N) {
        let mut t = [0; N];
        t.copy_from_slice(chunk);
        tuples.push(t);
    }

    Ok(tuples)
}

/// The keywords through which a measurement table refers to other tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct References {
    pub date_obs: String,
    pub arrname: String,
    pub insname: String,
    pub corrname: String,
}

impl References {
    pub fn read(table: &BinTable) -> Result<Self> {
        Ok(References {
            date_obs: read_keyword(table, "DATE-OBS"),
            arrname: read_keyword(table, "ARRNAME"),
            insname: read_required_keyword(table, "INSNAME")?,
            corrname: read_keyword(table, "CORRNAME"),
        })
    }
}

/// Write the referencing keywords of a measurement table. Empty optional
/// references are omitted.
pub(crate) fn write_references<T: MeasurementTable>(table: &T, t: &mut BinTable) {
    set_text(t, "DATE-OBS", table.date_obs());

    if !table.arrname().is_empty() {
        set_text(t, "ARRNAME", table.arrname());
    }

    set_text(t, "INSNAME", table.insname());

    if !table.corrname().is_empty() {
        set_text(t, "CORRNAME", table.corrname());
    }
}

// Helpers for encoding tables.

/// Start a binary table, with the `OI_REVN` and `EXTVER` keywords set.
pub(crate) fn new_bintable<T: OiTable>(revision: i32, extver: i32, nrows: usize) -> BinTable {
    let mut t = BinTable::new(T::EXTNAME, nrows);
    t.header.set("OI_REVN", HeaderValue::Integer(revision as i64));
    t.header.set("EXTVER", HeaderValue::Integer(extver as i64));
    t
}

pub(crate) fn set_text(table: &mut BinTable, keyword: &str, value: &str) {
    table
        .header
        .set(keyword, HeaderValue::Text(value.to_owned()));
}

/// Build a text column wide enough for its longest value.
pub(crate) fn text_column<'a, I>(name: &str, values: I) -> Column
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<String> = values.into_iter().map(|s| s.to_owned()).collect();
    let width = values.iter().map(|s| s.len()).max().unwrap_or(0).max(1);
    Column::new(name, width, ColumnData::Text(values))
}

/// Flatten per-row arrays into a column's storage order.
pub(crate) fn flatten<'a, T, I>(rows: I) -> Vec<T>
where
    T: Clone + 'a,
    I: IntoIterator<Item = ArrayView1<'a, T>>,
{
    let mut flat = Vec::new();

    for row in rows {
        flat.extend(row.iter().cloned());
    }

    flat
}

pub(crate) fn f64_column<'a, I>(name: &str, width: usize, rows: I) -> Column
where
    I: IntoIterator<Item = ArrayView1<'a, f64>>,
{
    Column::new(name, width, ColumnData::Float64(flatten(rows)))
}

pub(crate) fn bool_column<'a, I>(name: &str, width: usize, rows: I) -> Column
where
    I: IntoIterator<Item = ArrayView1<'a, bool>>,
{
    Column::new(name, width, ColumnData::Logical(flatten(rows)))
}

pub(crate) fn index_tuple_column<const N: usize, I>(name: &str, tuples: I) -> Column
where
    I: IntoIterator<Item = [i32; N]>,
{
    let flat: Vec<i16> = tuples
        .into_iter()
        .flat_map(|t| IntoIterator::into_iter(t).map(|i| i as i16))
        .collect();
    Column::new(name, N, ColumnData::Int16(flat))
}
