// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_VIS` table: complex visibilities.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Ix2};
use oifits_core::num::array_from_shape_vec;
use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};
use std::slice;

use super::{
    bool_column, column_width, f64_column, flatten, index_tuple_column, new_bintable,
    read_channels_bool, read_channels_f64, read_corrindx, read_index_tuples, read_keyword,
    read_revision, set_text, write_references, OiTable, References,
};
use crate::errors::{OifitsError, Result};
use crate::records::{ChannelRecord, ChannelRecords};

/// The real and imaginary parts of the visibility, present only in tables
/// with `usecomplex` set.
#[derive(Clone, Debug, PartialEq)]
struct ComplexParts {
    rvis: Array1<f64>,
    rviserr: Array1<f64>,
    ivis: Array1<f64>,
    iviserr: Array1<f64>,
}

/// One row of an `OI_VIS` table.
#[derive(Clone, Debug, PartialEq)]
pub struct VisRecord {
    pub target_id: i32,
    pub time: f64,
    pub mjd: f64,
    pub int_time: f64,
    visamp: Array1<f64>,
    visamperr: Array1<f64>,
    pub corrindx_visamp: i32,
    visphi: Array1<f64>,
    visphierr: Array1<f64>,
    pub corrindx_visphi: i32,
    visrefmap: Option<Array2<bool>>,
    complex: Option<ComplexParts>,
    pub corrindx_rvis: i32,
    pub corrindx_ivis: i32,
    pub ucoord: f64,
    pub vcoord: f64,
    pub sta_index: [i32; 2],
    flag: Array1<bool>,
}

macro_rules! channel_accessors {
    ($($name:ident, $name_mut:ident;)*) => {
        $(
            pub fn $name(&self) -> ArrayView1<'_, f64> {
                self.$name.view()
            }

            pub fn $name_mut(&mut self) -> ArrayViewMut1<'_, f64> {
                self.$name.view_mut()
            }
        )*
    }
}

macro_rules! complex_accessors {
    ($($name:ident, $name_mut:ident;)*) => {
        $(
            pub fn $name(&self) -> Option<ArrayView1<'_, f64>> {
                self.complex.as_ref().map(|c| c.$name.view())
            }

            pub fn $name_mut(&mut self) -> Option<ArrayViewMut1<'_, f64>> {
                self.complex.as_mut().map(|c| c.$name.view_mut())
            }
        )*
    }
}

impl VisRecord {
    /// Create a zero-filled record of `nwave` channels. The reference map
    /// (`nwave` × `nwave`) and the real/imaginary arrays are only allocated
    /// when asked for.
    pub fn new(nwave: usize, usevisrefmap: bool, usecomplex: bool) -> Self {
        let zeros = || Array1::zeros(nwave);

        VisRecord {
            target_id: 0,
            time: 0.,
            mjd: 0.,
            int_time: 0.,
            visamp: zeros(),
            visamperr: zeros(),
            corrindx_visamp: 0,
            visphi: zeros(),
            visphierr: zeros(),
            corrindx_visphi: 0,
            visrefmap: if usevisrefmap {
                Some(Array2::from_elem((nwave, nwave), false))
            } else {
                None
            },
            complex: if usecomplex {
                Some(ComplexParts {
                    rvis: zeros(),
                    rviserr: zeros(),
                    ivis: zeros(),
                    iviserr: zeros(),
                })
            } else {
                None
            },
            corrindx_rvis: 0,
            corrindx_ivis: 0,
            ucoord: 0.,
            vcoord: 0.,
            sta_index: [0; 2],
            flag: Array1::from_elem(nwave, false),
        }
    }

    channel_accessors! {
        visamp, visamp_mut;
        visamperr, visamperr_mut;
        visphi, visphi_mut;
        visphierr, visphierr_mut;
    }

    complex_accessors! {
        rvis, rvis_mut;
        rviserr, rviserr_mut;
        ivis, ivis_mut;
        iviserr, iviserr_mut;
    }

    /// The channel-to-channel reference map, if in use.
    pub fn visrefmap(&self) -> Option<ArrayView2<'_, bool>> {
        self.visrefmap.as_ref().map(|m| m.view())
    }

    pub fn visrefmap_mut(&mut self) -> Option<ArrayViewMut2<'_, bool>> {
        self.visrefmap.as_mut().map(|m| m.view_mut())
    }

    pub fn flag(&self) -> ArrayView1<'_, bool> {
        self.flag.view()
    }

    pub fn flag_mut(&mut self) -> ArrayViewMut1<'_, bool> {
        self.flag.view_mut()
    }

    pub fn has_visrefmap(&self) -> bool {
        self.visrefmap.is_some()
    }

    pub fn has_complex(&self) -> bool {
        self.complex.is_some()
    }
}

impl ChannelRecord for VisRecord {
    fn nwave(&self) -> usize {
        self.visamp.len()
    }
}

/// An `OI_VIS` table.
#[derive(Clone, Debug, PartialEq)]
pub struct VisTable {
    pub revision: i32,
    pub date_obs: String,
    pub arrname: String,
    pub insname: String,
    pub corrname: String,
    pub amptyp: String,
    pub phityp: String,
    pub amporder: i32,
    pub phiorder: i32,
    /// The unit of the real and imaginary visibilities.
    pub complexunit: String,
    usevisrefmap: bool,
    usecomplex: bool,
    records: ChannelRecords<VisRecord>,
}

impl VisTable {
    /// Create an empty table of `nwave` channels. The feature flags decide
    /// which optional arrays every record must carry.
    pub fn new<S: Into<String>>(
        insname: S,
        nwave: usize,
        usevisrefmap: bool,
        usecomplex: bool,
    ) -> Self {
        VisTable {
            revision: Self::CURRENT_REVISION,
            date_obs: String::new(),
            arrname: String::new(),
            insname: insname.into(),
            corrname: String::new(),
            amptyp: String::new(),
            phityp: String::new(),
            amporder: 0,
            phiorder: 0,
            complexunit: String::new(),
            usevisrefmap,
            usecomplex,
            records: ChannelRecords::new(nwave),
        }
    }

    pub fn usevisrefmap(&self) -> bool {
        self.usevisrefmap
    }

    pub fn usecomplex(&self) -> bool {
        self.usecomplex
    }

    /// Create a zero-filled record that fits this table.
    pub fn new_record(&self) -> VisRecord {
        VisRecord::new(self.records.nwave(), self.usevisrefmap, self.usecomplex)
    }

    /// Append a record, checking its channel count and optional arrays.
    pub fn push(&mut self, record: VisRecord) -> Result<()> {
        if record.has_visrefmap() != self.usevisrefmap {
            return Err(OifitsError::FeatureMismatch("usevisrefmap"));
        }

        if record.has_complex() != self.usecomplex {
            return Err(OifitsError::FeatureMismatch("usecomplex"));
        }

        self.records.push(record)
    }

    pub fn records(&self) -> &ChannelRecords<VisRecord> {
        &self.records
    }

    pub fn records_mut(&mut self) -> slice::IterMut<'_, VisRecord> {
        self.records.iter_mut()
    }
}

impl_measurement_table!(VisTable);

impl OiTable for VisTable {
    const EXTNAME: &'static str = "OI_VIS";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let recs = &self.records;
        let nwave = recs.nwave();
        let mut t = new_bintable::<Self>(self.revision, extver, recs.len());
        write_references(self, &mut t);

        if !self.amptyp.is_empty() {
            set_text(&mut t, "AMPTYP", &self.amptyp);
        }

        if !self.phityp.is_empty() {
            set_text(&mut t, "PHITYP", &self.phityp);
        }

        if self.amporder != 0 {
            t.header.set("AMPORDER", HeaderValue::Integer(self.amporder as i64));
        }

        if self.phiorder != 0 {
            t.header.set("PHIORDER", HeaderValue::Integer(self.phiorder as i64));
        }

        let with_corr = !self.corrname.is_empty();
        let scalar = |name: &str, f: fn(&VisRecord) -> f64| {
            Column::new(name, 1, ColumnData::Float64(recs.iter().map(f).collect()))
        };
        let corrindx = |name: &str, f: fn(&VisRecord) -> i32| {
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
        t.push_column(f64_column("VISAMP", nwave, recs.iter().map(|r| r.visamp.view())))?;
        t.push_column(f64_column("VISAMPERR", nwave, recs.iter().map(|r| r.visamperr.view())))?;

        if with_corr {
            t.push_column(corrindx("CORRINDX_VISAMP", |r| r.corrindx_visamp))?;
        }

        t.push_column(
            f64_column("VISPHI", nwave, recs.iter().map(|r| r.visphi.view())).with_unit("deg"),
        )?;
        t.push_column(
            f64_column("VISPHIERR", nwave, recs.iter().map(|r| r.visphierr.view()))
                .with_unit("deg"),
        )?;

        if with_corr {
            t.push_column(corrindx("CORRINDX_VISPHI", |r| r.corrindx_visphi))?;
        }

        if self.usevisrefmap {
            let maps: Vec<bool> = recs
                .iter()
                .flat_map(|r| r.visrefmap.iter().flat_map(|m| m.iter().cloned()))
                .collect();
            t.push_column(
                Column::new("VISREFMAP", nwave * nwave, ColumnData::Logical(maps))
                    .with_dim(vec![nwave, nwave]),
            )?;
        }

        if self.usecomplex {
            let parts = || recs.iter().filter_map(|r| r.complex.as_ref());
            let unit = &self.complexunit;

            let mut push_part = |name: &str, values: Vec<f64>| -> Result<()> {
                let mut col = Column::new(name, nwave, ColumnData::Float64(values));

                if !unit.is_empty() {
                    col = col.with_unit(unit.as_str());
                }

                t.push_column(col)?;
                Ok(())
            };

            push_part("RVIS", flatten(parts().map(|c| c.rvis.view())))?;
            push_part("RVISERR", flatten(parts().map(|c| c.rviserr.view())))?;
            push_part("IVIS", flatten(parts().map(|c| c.ivis.view())))?;
            push_part("IVISERR", flatten(parts().map(|c| c.iviserr.view())))?;

            if with_corr {
                t.push_column(corrindx("CORRINDX_RVIS", |r| r.corrindx_rvis))?;
                t.push_column(corrindx("CORRINDX_IVIS", |r| r.corrindx_ivis))?;
            }
        }

        t.push_column(scalar("UCOORD", |r| r.ucoord).with_unit("m"))?;
        t.push_column(scalar("VCOORD", |r| r.vcoord).with_unit("m"))?;
        t.push_column(index_tuple_column("STA_INDEX", recs.iter().map(|r| r.sta_index)))?;
        t.push_column(bool_column("FLAG", nwave, recs.iter().map(|r| r.flag.view())))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let refs = References::read(table)?;
        let nwave = column_width(table, "VISAMP")?;
        let n = table.nrows();

        let usevisrefmap = table.find_column("VISREFMAP").is_some();
        let rvis_column = table.find_column("RVIS");
        let usecomplex = rvis_column.is_some();

        let mut vis = VisTable::new(refs.insname, nwave, usevisrefmap, usecomplex);
        vis.revision = read_revision(table)?;
        vis.date_obs = refs.date_obs;
        vis.arrname = refs.arrname;
        vis.corrname = refs.corrname;
        vis.amptyp = read_keyword(table, "AMPTYP");
        vis.phityp = read_keyword(table, "PHITYP");
        vis.amporder = table.header.get_int("AMPORDER").unwrap_or(0) as i32;
        vis.phiorder = table.header.get_int("PHIORDER").unwrap_or(0) as i32;
        vis.complexunit = rvis_column.and_then(|c| c.unit.clone()).unwrap_or_default();

        let target_id = table.column("TARGET_ID")?.to_i32_vec()?;
        let time = table.column("TIME")?.to_f64_vec()?;
        let mjd = table.column("MJD")?.to_f64_vec()?;
        let int_time = table.column("INT_TIME")?.to_f64_vec()?;
        let visamp = read_channels_f64(table, "VISAMP", nwave)?;
        let visamperr = read_channels_f64(table, "VISAMPERR", nwave)?;
        let corrindx_visamp = read_corrindx(table, "CORRINDX_VISAMP")?;
        let visphi = read_channels_f64(table, "VISPHI", nwave)?;
        let visphierr = read_channels_f64(table, "VISPHIERR", nwave)?;
        let corrindx_visphi = read_corrindx(table, "CORRINDX_VISPHI")?;
        let corrindx_rvis = read_corrindx(table, "CORRINDX_RVIS")?;
        let corrindx_ivis = read_corrindx(table, "CORRINDX_IVIS")?;
        let ucoord = table.column("UCOORD")?.to_f64_vec()?;
        let vcoord = table.column("VCOORD")?.to_f64_vec()?;
        let sta_index = read_index_tuples::<2>(table, "STA_INDEX")?;
        let flag = read_channels_bool(table, "FLAG", nwave)?;

        let refmaps: Vec<Option<Array2<bool>>> = if usevisrefmap {
            read_channels_bool(table, "VISREFMAP", nwave * nwave)?
                .into_iter()
                .map(|m| array_from_shape_vec::<bool, Ix2>(&[nwave, nwave], m.to_vec()).map(Some))
                .collect::<oifits_core::errors::Result<Vec<_>>>()?
        } else {
            vec![None; n]
        };

        let complex: Vec<Option<ComplexParts>> = if usecomplex {
            let rvis = read_channels_f64(table, "RVIS", nwave)?;
            let rviserr = read_channels_f64(table, "RVISERR", nwave)?;
            let ivis = read_channels_f64(table, "IVIS", nwave)?;
            let iviserr = read_channels_f64(table, "IVISERR", nwave)?;

            rvis.into_iter()
                .zip(rviserr)
                .zip(ivis)
                .zip(iviserr)
                .map(|(((rvis, rviserr), ivis), iviserr)| {
                    Some(ComplexParts {
                        rvis,
                        rviserr,
                        ivis,
                        iviserr,
                    })
                })
                .collect()
        } else {
            vec![None; n]
        };

        let rows = visamp
            .into_iter()
            .zip(visamperr)
            .zip(visphi)
            .zip(visphierr)
            .zip(refmaps)
            .zip(complex)
            .zip(flag);

        for (i, ((((((visamp, visamperr), visphi), visphierr), visrefmap), complex), flag)) in
            rows.enumerate()
        {
            vis.records.push(VisRecord {
                target_id: target_id[i],
                time: time[i],
                mjd: mjd[i],
                int_time: int_time[i],
                visamp,
                visamperr,
                corrindx_visamp: corrindx_visamp[i],
                visphi,
                visphierr,
                corrindx_visphi: corrindx_visphi[i],
                visrefmap,
                complex,
                corrindx_rvis: corrindx_rvis[i],
                corrindx_ivis: corrindx_ivis[i],
                ucoord: ucoord[i],
                vcoord: vcoord[i],
                sta_index: sta_index[i],
                flag,
            })?;
        }

        Ok(vis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_arrays_follow_flags() {
        let plain = VisRecord::new(3, false, false);
        assert!(plain.visrefmap().is_none());
        assert!(plain.rvis().is_none());

        let full = VisRecord::new(3, true, true);
        assert_eq!(full.visrefmap().unwrap().len(), 9);
        assert_eq!(full.iviserr().unwrap().len(), 3);
    }

    #[test]
    fn push_checks_features_and_channels() {
        let mut t = VisTable::new("AMBER", 4, true, false);
        assert!(matches!(
            t.push(VisRecord::new(4, false, false)),
            Err(OifitsError::FeatureMismatch("usevisrefmap"))
        ));
        assert!(matches!(
            t.push(VisRecord::new(4, true, true)),
            Err(OifitsError::FeatureMismatch("usecomplex"))
        ));
        assert!(matches!(
            t.push(VisRecord::new(5, true, false)),
            Err(OifitsError::ChannelCount {
                expected: 4,
                actual: 5
            })
        ));

        let rec = t.new_record();
        t.push(rec).unwrap();
        assert_eq!(t.records().len(), 1);
    }
}
