// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_INSPOL` table: instrumental polarization, as Jones matrices.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use oifits_core::Complex;
use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};
use std::slice;

use super::{
    check_width, column_width, flatten, new_bintable, read_keyword, read_required_keyword,
    read_revision, set_text, split_rows, text_column, OiTable,
};
use crate::errors::Result;
use crate::records::{ChannelRecord, ChannelRecords};

/// One row of an `OI_INSPOL` table.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarRecord {
    pub target_id: i32,
    pub insname: String,
    pub mjd_obs: f64,
    pub mjd_end: f64,
    jxx: Array1<Complex<f32>>,
    jyy: Array1<Complex<f32>>,
    jxy: Array1<Complex<f32>>,
    jyx: Array1<Complex<f32>>,
    pub sta_index: i32,
}

macro_rules! jones_accessors {
    ($($name:ident, $name_mut:ident;)*) => {
        $(
            pub fn $name(&self) -> ArrayView1<'_, Complex<f32>> {
                self.$name.view()
            }

            pub fn $name_mut(&mut self) -> ArrayViewMut1<'_, Complex<f32>> {
                self.$name.view_mut()
            }
        )*
    }
}

impl PolarRecord {
    pub fn new(nwave: usize) -> Self {
        let zeros = || Array1::from_elem(nwave, Complex::new(0., 0.));

        PolarRecord {
            target_id: 0,
            insname: String::new(),
            mjd_obs: 0.,
            mjd_end: 0.,
            jxx: zeros(),
            jyy: zeros(),
            jxy: zeros(),
            jyx: zeros(),
            sta_index: 0,
        }
    }

    jones_accessors! {
        jxx, jxx_mut;
        jyy, jyy_mut;
        jxy, jxy_mut;
        jyx, jyx_mut;
    }
}

impl ChannelRecord for PolarRecord {
    fn nwave(&self) -> usize {
        self.jxx.len()
    }
}

/// An `OI_INSPOL` table. It names the array it describes, but is not
/// itself referred to by name.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarTable {
    pub revision: i32,
    pub date_obs: String,
    pub arrname: String,
    /// The number of polarization types.
    pub npol: i32,
    pub orient: String,
    pub model: String,
    records: ChannelRecords<PolarRecord>,
}

impl PolarTable {
    pub fn new<S: Into<String>>(arrname: S, nwave: usize) -> Self {
        PolarTable {
            revision: Self::CURRENT_REVISION,
            date_obs: String::new(),
            arrname: arrname.into(),
            npol: 1,
            orient: String::new(),
            model: String::new(),
            records: ChannelRecords::new(nwave),
        }
    }

    pub fn nwave(&self) -> usize {
        self.records.nwave()
    }

    pub fn new_record(&self) -> PolarRecord {
        PolarRecord::new(self.records.nwave())
    }

    pub fn push(&mut self, record: PolarRecord) -> Result<()> {
        self.records.push(record)
    }

    pub fn records(&self) -> &ChannelRecords<PolarRecord> {
        &self.records
    }

    pub fn records_mut(&mut self) -> slice::IterMut<'_, PolarRecord> {
        self.records.iter_mut()
    }
}

fn read_jones(
    table: &BinTable,
    name: &'static str,
    nwave: usize,
) -> Result<Vec<Array1<Complex<f32>>>> {
    let column = table.column(name)?;
    check_width(column, nwave)?;
    split_rows(column.as_complex()?.to_vec(), table.nrows(), nwave, name)
}

fn jones_column<'a, I>(name: &str, nwave: usize, rows: I) -> Column
where
    I: IntoIterator<Item = ArrayView1<'a, Complex<f32>>>,
{
    Column::new(name, nwave, ColumnData::Complex32(flatten(rows)))
}

impl OiTable for PolarTable {
    const EXTNAME: &'static str = "OI_INSPOL";
    const CURRENT_REVISION: i32 = 1;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let recs = &self.records;
        let nwave = recs.nwave();
        let mut t = new_bintable::<Self>(self.revision, extver, recs.len());
        set_text(&mut t, "DATE-OBS", &self.date_obs);
        t.header.set("NPOL", HeaderValue::Integer(self.npol as i64));
        set_text(&mut t, "ARRNAME", &self.arrname);
        set_text(&mut t, "ORIENT", &self.orient);
        set_text(&mut t, "MODEL", &self.model);

        t.push_column(Column::new(
            "TARGET_ID",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.target_id as i16).collect()),
        ))?;
        t.push_column(text_column("INSNAME", recs.iter().map(|r| r.insname.as_str())))?;
        t.push_column(
            Column::new("MJD_OBS", 1, ColumnData::Float64(recs.iter().map(|r| r.mjd_obs).collect()))
                .with_unit("day"),
        )?;
        t.push_column(
            Column::new("MJD_END", 1, ColumnData::Float64(recs.iter().map(|r| r.mjd_end).collect()))
                .with_unit("day"),
        )?;
        t.push_column(jones_column("JXX", nwave, recs.iter().map(|r| r.jxx.view())))?;
        t.push_column(jones_column("JYY", nwave, recs.iter().map(|r| r.jyy.view())))?;
        t.push_column(jones_column("JXY", nwave, recs.iter().map(|r| r.jxy.view())))?;
        t.push_column(jones_column("JYX", nwave, recs.iter().map(|r| r.jyx.view())))?;
        t.push_column(Column::new(
            "STA_INDEX",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.sta_index as i16).collect()),
        ))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let nwave = column_width(table, "JXX")?;

        let mut polar = PolarTable::new(read_required_keyword(table, "ARRNAME")?, nwave);
        polar.revision = read_revision(table)?;
        polar.date_obs = read_keyword(table, "DATE-OBS");
        polar.npol = table.header.get_int("NPOL").unwrap_or(1) as i32;
        polar.orient = read_keyword(table, "ORIENT");
        polar.model = read_keyword(table, "MODEL");

        let target_id = table.column("TARGET_ID")?.to_i32_vec()?;
        let insname = table.column("INSNAME")?.as_text()?;
        let mjd_obs = table.column("MJD_OBS")?.to_f64_vec()?;
        let mjd_end = table.column("MJD_END")?.to_f64_vec()?;
        let sta_index = table.column("STA_INDEX")?.to_i32_vec()?;

        let rows = read_jones(table, "JXX", nwave)?
            .into_iter()
            .zip(read_jones(table, "JYY", nwave)?)
            .zip(read_jones(table, "JXY", nwave)?)
            .zip(read_jones(table, "JYX", nwave)?);

        for (i, (((jxx, jyy), jxy), jyx)) in rows.enumerate() {
            polar.records.push(PolarRecord {
                target_id: target_id[i],
                insname: insname[i].clone(),
                mjd_obs: mjd_obs[i],
                mjd_end: mjd_end[i],
                jxx,
                jyy,
                jxy,
                jyx,
                sta_index: sta_index[i],
            })?;
        }

        Ok(polar)
    }
}
