// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_VIS2` table: squared visibility amplitudes.

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

/// One row of an `OI_VIS2` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Vis2Record {
    pub target_id: i32,
    pub time: f64,
    pub mjd: f64,
    pub int_time: f64,
    vis2data: Array1<f64>,
    vis2err: Array1<f64>,
    pub corrindx_vis2data: i32,
    pub ucoord: f64,
    pub vcoord: f64,
    pub sta_index: [i32; 2],
    flag: Array1<bool>,
}

impl Vis2Record {
    pub fn new(nwave: usize) -> Self {
        Vis2Record {
            target_id: 0,
            time: 0.,
            mjd: 0.,
            int_time: 0.,
            vis2data: Array1::zeros(nwave),
            vis2err: Array1::zeros(nwave),
            corrindx_vis2data: 0,
            ucoord: 0.,
            vcoord: 0.,
            sta_index: [0; 2],
            flag: Array1::from_elem(nwave, false),
        }
    }

    pub fn vis2data(&self) -> ArrayView1<'_, f64> {
        self.vis2data.view()
    }

    pub fn vis2data_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.vis2data.view_mut()
    }

    pub fn vis2err(&self) -> ArrayView1<'_, f64> {
        self.vis2err.view()
    }

    pub fn vis2err_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.vis2err.view_mut()
    }

    pub fn flag(&self) -> ArrayView1<'_, bool> {
        self.flag.view()
    }

    pub fn flag_mut(&mut self) -> ArrayViewMut1<'_, bool> {
        self.flag.view_mut()
    }
}

impl ChannelRecord for Vis2Record {
    fn nwave(&self) -> usize {
        self.vis2data.len()
    }
}

/// An `OI_VIS2` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Vis2Table {
    pub revision: i32,
    pub date_obs: String,
    pub arrname: String,
    pub insname: String,
    pub corrname: String,
    records: ChannelRecords<Vis2Record>,
}

impl Vis2Table {
    pub fn new<S: Into<String>>(insname: S, nwave: usize) -> Self {
        Vis2Table {
            revision: Self::CURRENT_REVISION,
            date_obs: String::new(),
            arrname: String::new(),
            insname: insname.into(),
            corrname: String::new(),
            records: ChannelRecords::new(nwave),
        }
    }

    pub fn new_record(&self) -> Vis2Record {
        Vis2Record::new(self.records.nwave())
    }

    pub fn push(&mut self, record: Vis2Record) -> Result<()> {
        self.records.push(record)
    }

    pub fn records(&self) -> &ChannelRecords<Vis2Record> {
        &self.records
    }

    pub fn records_mut(&mut self) -> slice::IterMut<'_, Vis2Record> {
        self.records.iter_mut()
    }
}

impl_measurement_table!(Vis2Table);

impl OiTable for Vis2Table {
    const EXTNAME: &'static str = "OI_VIS2";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let recs = &self.records;
        let nwave = recs.nwave();
        let mut t = new_bintable::<Self>(self.revision, extver, recs.len());
        write_references(self, &mut t);

        let scalar = |name: &str, f: fn(&Vis2Record) -> f64| {
            Column::new(name, 1, ColumnData::Float64(recs.iter().map(f).collect()))
        };

        t.push_column(Column::new(
            "TARGET_ID",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.target_id as i16).collect()),
        ))?;
        t.push_column(scalar("TIME", |r| r.time).with_unit("s"))?;
        t.push_column(scalar("MJD", |r| r.mjd).with_unit("day"))?;
        t.push_column(scalar("INT_TIME", |r| r.int_time).with_unit("s"))?;
        t.push_column(f64_column("VIS2DATA", nwave, recs.iter().map(|r| r.vis2data.view())))?;
        t.push_column(f64_column("VIS2ERR", nwave, recs.iter().map(|r| r.vis2err.view())))?;

        if !self.corrname.is_empty() {
            t.push_column(Column::new(
                "CORRINDX_VIS2DATA",
                1,
                ColumnData::Int32(recs.iter().map(|r| r.corrindx_vis2data).collect()),
            ))?;
        }

        t.push_column(scalar("UCOORD", |r| r.ucoord).with_unit("m"))?;
        t.push_column(scalar("VCOORD", |r| r.vcoord).with_unit("m"))?;
        t.push_column(index_tuple_column("STA_INDEX", recs.iter().map(|r| r.sta_index)))?;
        t.push_column(bool_column("FLAG", nwave, recs.iter().map(|r| r.flag.view())))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let refs = References::read(table)?;
        let nwave = column_width(table, "VIS2DATA")?;

        let mut vis2 = Vis2Table::new(refs.insname, nwave);
        vis2.revision = read_revision(table)?;
        vis2.date_obs = refs.date_obs;
        vis2.arrname = refs.arrname;
        vis2.corrname = refs.corrname;

        let target_id = table.column("TARGET_ID")?.to_i32_vec()?;
        let time = table.column("TIME")?.to_f64_vec()?;
        let mjd = table.column("MJD")?.to_f64_vec()?;
        let int_time = table.column("INT_TIME")?.to_f64_vec()?;
        let corrindx = read_corrindx(table, "CORRINDX_VIS2DATA")?;
        let ucoord = table.column("UCOORD")?.to_f64_vec()?;
        let vcoord = table.column("VCOORD")?.to_f64_vec()?;
        let sta_index = read_index_tuples::<2>(table, "STA_INDEX")?;

        let rows = read_channels_f64(table, "VIS2DATA", nwave)?
            .into_iter()
            .zip(read_channels_f64(table, "VIS2ERR", nwave)?)
            .zip(read_channels_bool(table, "FLAG", nwave)?);

        for (i, ((vis2data, vis2err), flag)) in rows.enumerate() {
            vis2.records.push(Vis2Record {
                target_id: target_id[i],
                time: time[i],
                mjd: mjd[i],
                int_time: int_time[i],
                vis2data,
                vis2err,
                corrindx_vis2data: corrindx[i],
                ucoord: ucoord[i],
                vcoord: vcoord[i],
                sta_index: sta_index[i],
                flag,
            })?;
        }

        Ok(vis2)
    }
}
