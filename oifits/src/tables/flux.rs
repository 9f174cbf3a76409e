// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_FLUX` table: spectra, calibrated or not.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};
use std::slice;

use super::{
    bool_column, column_width, f64_column, new_bintable, read_channels_bool, read_channels_f64,
    read_corrindx, read_keyword, read_revision, set_text, write_references, OiTable, References,
};
use crate::errors::Result;
use crate::records::{ChannelRecord, ChannelRecords};

/// One row of an `OI_FLUX` table.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumRecord {
    pub target_id: i32,
    pub mjd: f64,
    pub int_time: f64,
    fluxdata: Array1<f64>,
    fluxerr: Array1<f64>,
    pub corrindx_fluxdata: i32,
    /// The station that measured an uncalibrated spectrum; zero if none.
    pub sta_index: i32,
    flag: Array1<bool>,
}

impl SpectrumRecord {
    pub fn new(nwave: usize) -> Self {
        SpectrumRecord {
            target_id: 0,
            mjd: 0.,
            int_time: 0.,
            fluxdata: Array1::zeros(nwave),
            fluxerr: Array1::zeros(nwave),
            corrindx_fluxdata: 0,
            sta_index: 0,
            flag: Array1::from_elem(nwave, false),
        }
    }

    pub fn fluxdata(&self) -> ArrayView1<'_, f64> {
        self.fluxdata.view()
    }

    pub fn fluxdata_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.fluxdata.view_mut()
    }

    pub fn fluxerr(&self) -> ArrayView1<'_, f64> {
        self.fluxerr.view()
    }

    pub fn fluxerr_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.fluxerr.view_mut()
    }

    pub fn flag(&self) -> ArrayView1<'_, bool> {
        self.flag.view()
    }

    pub fn flag_mut(&mut self) -> ArrayViewMut1<'_, bool> {
        self.flag.view_mut()
    }
}

impl ChannelRecord for SpectrumRecord {
    fn nwave(&self) -> usize {
        self.fluxdata.len()
    }
}

/// An `OI_FLUX` table.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumTable {
    pub revision: i32,
    pub date_obs: String,
    pub arrname: String,
    pub insname: String,
    pub corrname: String,
    /// Field of view, in arcsec.
    pub fov: f64,
    pub fovtype: String,
    /// `C` for calibrated spectra, `U` for uncalibrated.
    pub calstat: String,
    records: ChannelRecords<SpectrumRecord>,
}

impl SpectrumTable {
    pub fn new<S: Into<String>>(insname: S, nwave: usize) -> Self {
        SpectrumTable {
            revision: Self::CURRENT_REVISION,
            date_obs: String::new(),
            arrname: String::new(),
            insname: insname.into(),
            corrname: String::new(),
            fov: 0.,
            fovtype: String::new(),
            calstat: "C".to_owned(),
            records: ChannelRecords::new(nwave),
        }
    }

    pub fn new_record(&self) -> SpectrumRecord {
        SpectrumRecord::new(self.records.nwave())
    }

    pub fn push(&mut self, record: SpectrumRecord) -> Result<()> {
        self.records.push(record)
    }

    pub fn records(&self) -> &ChannelRecords<SpectrumRecord> {
        &self.records
    }

    pub fn records_mut(&mut self) -> slice::IterMut<'_, SpectrumRecord> {
        self.records.iter_mut()
    }
}

impl_measurement_table!(SpectrumTable);

impl OiTable for SpectrumTable {
    const EXTNAME: &'static str = "OI_FLUX";
    const CURRENT_REVISION: i32 = 1;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let recs = &self.records;
        let nwave = recs.nwave();
        let mut t = new_bintable::<Self>(self.revision, extver, recs.len());
        write_references(self, &mut t);

        if !self.fovtype.is_empty() {
            t.header.set("FOV", HeaderValue::Float(self.fov));
            set_text(&mut t, "FOVTYPE", &self.fovtype);
        }

        set_text(&mut t, "CALSTAT", &self.calstat);

        let scalar = |name: &str, f: fn(&SpectrumRecord) -> f64| {
            Column::new(name, 1, ColumnData::Float64(recs.iter().map(f).collect()))
        };

        t.push_column(Column::new(
            "TARGET_ID",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.target_id as i16).collect()),
        ))?;
        t.push_column(scalar("MJD", |r| r.mjd).with_unit("day"))?;
        t.push_column(scalar("INT_TIME", |r| r.int_time).with_unit("s"))?;
        t.push_column(f64_column("FLUXDATA", nwave, recs.iter().map(|r| r.fluxdata.view())))?;
        t.push_column(f64_column("FLUXERR", nwave, recs.iter().map(|r| r.fluxerr.view())))?;

        if !self.corrname.is_empty() {
            t.push_column(Column::new(
                "CORRINDX_FLUXDATA",
                1,
                ColumnData::Int32(recs.iter().map(|r| r.corrindx_fluxdata).collect()),
            ))?;
        }

        t.push_column(Column::new(
            "STA_INDEX",
            1,
            ColumnData::Int16(recs.iter().map(|r| r.sta_index as i16).collect()),
        ))?;
        t.push_column(bool_column("FLAG", nwave, recs.iter().map(|r| r.flag.view())))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let refs = References::read(table)?;
        let nwave = column_width(table, "FLUXDATA")?;

        let mut spec = SpectrumTable::new(refs.insname, nwave);
        spec.revision = read_revision(table)?;
        spec.date_obs = refs.date_obs;
        spec.arrname = refs.arrname;
        spec.corrname = refs.corrname;
        spec.fov = table.header.get_float("FOV").unwrap_or(0.);
        spec.fovtype = read_keyword(table, "FOVTYPE");
        spec.calstat = read_keyword(table, "CALSTAT");

        let target_id = table.column("TARGET_ID")?.to_i32_vec()?;
        let mjd = table.column("MJD")?.to_f64_vec()?;
        let int_time = table.column("INT_TIME")?.to_f64_vec()?;
        let corrindx = read_corrindx(table, "CORRINDX_FLUXDATA")?;
        let sta_index = match table.find_column("STA_INDEX") {
            Some(c) => c.to_i32_vec()?,
            None => vec![0; table.nrows()],
        };

        // Older writers omit the flags.
        let flags = if table.find_column("FLAG").is_some() {
            read_channels_bool(table, "FLAG", nwave)?
        } else {
            vec![Array1::from_elem(nwave, false); table.nrows()]
        };

        let rows = read_channels_f64(table, "FLUXDATA", nwave)?
            .into_iter()
            .zip(read_channels_f64(table, "FLUXERR", nwave)?)
            .zip(flags);

        for (i, ((fluxdata, fluxerr), flag)) in rows.enumerate() {
            spec.records.push(SpectrumRecord {
                target_id: target_id[i],
                mjd: mjd[i],
                int_time: int_time[i],
                fluxdata,
                fluxerr,
                corrindx_fluxdata: corrindx[i],
                sta_index: sta_index[i],
                flag,
            })?;
        }

        Ok(spec)
    }
}
