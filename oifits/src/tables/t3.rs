// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_T3` table: triple products (closure phases).

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use oifits_fits::{BinTable, Column, ColumnData};
use std::slice;

use super::{
    bool_column, column_width, f64_column, index_tuple_column, new_bintable, read_channels_bool,
    read_channels_f64, read_corrindx, read_index_tuples, read_revision, write_references,
    OiTable, References,
};
use crate::errors::Result;
use crate::records::{ChannelRecord, ChannelRecords};

/// One row of an `OI_T3` table.
#[derive(Clone, Debug, PartialEq)]
pub struct T3Record {
    pub target_id: i32,
    pub time: f64,
    pub mjd: f64,
    pub int_time: f64,
    t3amp: Array1<f64>,
    t3amperr: Array1<f64>,
    pub corrindx_t3amp: i32,
    t3phi: Array1<f64>,
    t3phierr: Array1<f64>,
    pub corrindx_t3phi: i32,
    pub u1coord: f64,
    pub v1coord: f64,
    pub u2coord: f64,
    pub v2coord: f64,
    pub sta_index: [i32; 3],
    flag: Array1<bool>,
}

impl T3Record {
    pub fn new(nwave: usize) -> Self {
        T3Record {
            target_id: 0,
            time: 0.,
            mjd: 0.,
            int_time: 0.,
            t3amp: Array1::zeros(nwave),
            t3amperr: Array1::zeros(nwave),
            corrindx_t3amp: 0,
            t3phi: Array1::zeros(nwave),
            t3phierr: Array1::zeros(nwave),
            corrindx_t3phi: 0,
            u1coord: 0.,
            v1coord: 0.,
            u2coord: 0.,
            v2coord: 0.,
            sta_index: [0; 3],
            flag: Array1::from_elem(nwave, false),
        }
    }

    pub fn t3amp(&self) -> ArrayView1<'_, f64> {
        self.t3amp.view()
    }

    pub fn t3amp_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.t3amp.view_mut()
    }

    pub fn t3amperr(&self) -> ArrayView1<'_, f64> {
        self.t3amperr.view()
    }

    pub fn t3amperr_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.t3amperr.view_mut()
    }

    /// Closure phases, in degrees.
    pub fn t3phi(&self) -> ArrayView1<'_, f64> {
        self.t3phi.view()
    }

    pub fn t3phi_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.t3phi.view_mut()
    }

    pub fn t3phierr(&self) -> ArrayView1<'_, f64> {
        self.t3phierr.view()
    }

    pub fn t3phierr_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.t3phierr.view_mut()
    }

    pub fn flag(&self) -> ArrayView1<'_, bool> {
        self.flag.view()
    }

    pub fn flag_mut(&mut self) -> ArrayViewMut1<'_, bool> {
        self.flag.view_mut()
    }
}

impl ChannelRecord for T3Record {
    fn nwave(&self) -> usize {
        self.t3amp.len()
    }
}

/// An `OI_T3` table.
#[derive(Clone, Debug, PartialEq)]
pub struct T3Table {
    pub revision: i32,
    pub date_obs: String,
    pub arrname: String,
    pub insname: String,
    pub corrname: String,
    records: ChannelRecords<T3Record>,
}

impl T3Table {
    pub fn new<S: Into<String>>(insname: S, nwave: usize) -> Self {
        T3Table {
            revision: Self::CURRENT_REVISION,
            date_obs: String::new(),
            arrname: String::new(),
            insname: insname.into(),
            corrname: String::new(),
            records: ChannelRecords::new(nwave),
        }
    }

    pub fn new_record(&self) -> T3Record {
        T3Record::new(self.records.nwave())
    }

    pub fn push(&mut self, record: T3Record) -> Result<()> {
        self.records.push(record)
    }

    pub fn records(&self) -> &ChannelRecords<T3Record> {
        &self.records
    }

    pub fn records_mut(&mut self) -> slice::IterMut<'_, T3Record> {
        self.records.iter_mut()
    }
}

impl_measurement_table!(T3Table);

impl OiTable for T3Table {
    const EXTNAME: &'static str = "OI_T3";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let recs = &self.records;
        let nwave = recs.nwave();
        let with_corr = !self.corrname.is_empty();
        let mut t = new_bintable::<Self>(self.revision, extver, recs.len());
        write_references(self, &mut t);

        let scalar = |name: &str, f: fn(&T3Record) -> f64| {
            Column::new(name, 1, ColumnData::Float64(recs.iter().map(f).collect()))
        };
        let corrindx = |name: &str, f: fn(&T3Record) -> i32| {
            Column::new(name, 1, ColumnData::Int32(recs.iter().map(f).collect()))
        };

        t.push_column(Column::new(
            "TARGET_ID",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.target_id as i16).collect()),
        ))?;
        t.push_column(scalar("TIME", |r| r.time).with_unit("s"))?;
        t.push_column(scalar("MJD", |r| r.mjd).with_unit("day"))?;
        t.push_column(scalar("INT_TIME", |r| r.int_time).with_unit("s"))?;
        t.push_column(f64_column("T3AMP", nwave, recs.iter().map(|r| r.t3amp.view())))?;
        t.push_column(f64_column("T3AMPERR", nwave, recs.iter().map(|r| r.t3amperr.view())))?;

        if with_corr {
            t.push_column(corrindx("CORRINDX_T3AMP", |r| r.corrindx_t3amp))?;
        }

        t.push_column(
            f64_column("T3PHI", nwave, recs.iter().map(|r| r.t3phi.view())).with_unit("deg"),
        )?;
        t.push_column(
            f64_column("T3PHIERR", nwave, recs.iter().map(|r| r.t3phierr.view())).with_unit("deg"),
        )?;

        if with_corr {
            t.push_column(corrindx("CORRINDX_T3PHI", |r| r.corrindx_t3phi))?;
        }

        t.push_column(scalar("U1COORD", |r| r.u1coord).with_unit("m"))?;
        t.push_column(scalar("V1COORD", |r| r.v1coord).with_unit("m"))?;
        t.push_column(scalar("U2COORD", |r| r.u2coord).with_unit("m"))?;
        t.push_column(scalar("V2COORD", |r| r.v2coord).with_unit("m"))?;
        t.push_column(index_tuple_column("STA_INDEX", recs.iter().map(|r| r.sta_index)))?;
        t.push_column(bool_column("FLAG", nwave, recs.iter().map(|r| r.flag.view())))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let refs = References::read(table)?;
        let nwave = column_width(table, "T3AMP")?;

        let mut t3 = T3Table::new(refs.insname, nwave);
        t3.revision = read_revision(table)?;
        t3.date_obs = refs.date_obs;
        t3.arrname = refs.arrname;
        t3.corrname = refs.corrname;

        let target_id = table.column("TARGET_ID")?.to_i32_vec()?;
        let time = table.column("TIME")?.to_f64_vec()?;
        let mjd = table.column("MJD")?.to_f64_vec()?;
        let int_time = table.column("INT_TIME")?.to_f64_vec()?;
        let corrindx_t3amp = read_corrindx(table, "CORRINDX_T3AMP")?;
        let corrindx_t3phi = read_corrindx(table, "CORRINDX_T3PHI")?;
        let u1coord = table.column("U1COORD")?.to_f64_vec()?;
        let v1coord = table.column("V1COORD")?.to_f64_vec()?;
        let u2coord = table.column("U2COORD")?.to_f64_vec()?;
        let v2coord = table.column("V2COORD")?.to_f64_vec()?;
        let sta_index = read_index_tuples::<3>(table, "STA_INDEX")?;

        let rows = read_channels_f64(table, "T3AMP", nwave)?
            .into_iter()
            .zip(read_channels_f64(table, "T3AMPERR", nwave)?)
            .zip(read_channels_f64(table, "T3PHI", nwave)?)
            .zip(read_channels_f64(table, "T3PHIERR", nwave)?)
            .zip(read_channels_bool(table, "FLAG", nwave)?);

        for (i, ((((t3amp, t3amperr), t3phi), t3phierr), flag)) in rows.enumerate() {
            t3.records.push(T3Record {
                target_id: target_id[i],
                time: time[i],
                mjd: mjd[i],
                int_time: int_time[i],
                t3amp,
                t3amperr,
                corrindx_t3amp: corrindx_t3amp[i],
                t3phi,
                t3phierr,
                corrindx_t3phi: corrindx_t3phi[i],
                u1coord: u1coord[i],
                v1coord: v1coord[i],
                u2coord: u2coord[i],
                v2coord: v2coord[i],
                sta_index: sta_index[i],
                flag,
            })?;
        }

        Ok(t3)
    }
}
