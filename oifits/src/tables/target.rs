// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_TARGET` table.

use oifits_fits::{BinTable, Column, ColumnData};

use super::{new_bintable, read_revision, text_column, OiTable};
use crate::errors::Result;

/// One observed target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Target {
    pub target_id: i32,
    pub target: String,
    pub raep0: f64,
    pub decep0: f64,
    pub equinox: f32,
    pub ra_err: f64,
    pub dec_err: f64,
    pub sysvel: f64,
    pub veltyp: String,
    pub veldef: String,
    pub pmra: f64,
    pub pmdec: f64,
    pub pmra_err: f64,
    pub pmdec_err: f64,
    pub parallax: f32,
    pub para_err: f32,
    pub spectyp: String,
    /// Only stored when the list's `usecategory` is set.
    pub category: String,
}

/// The list of targets. Every OIFITS file has exactly one.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetList {
    pub revision: i32,
    /// Whether the optional `CATEGORY` column is in use.
    pub usecategory: bool,
    pub targets: Vec<Target>,
}

impl Default for TargetList {
    fn default() -> Self {
        TargetList {
            revision: Self::CURRENT_REVISION,
            usecategory: false,
            targets: Vec::new(),
        }
    }
}

impl TargetList {
    /// The number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

macro_rules! target_column {
    ($targets:expr, $name:expr, $field:ident, $variant:ident) => {
        Column::new(
            $name,
            1,
            ColumnData::$variant($targets.iter().map(|t| t.$field).collect()),
        )
    };
}

impl OiTable for TargetList {
    const EXTNAME: &'static str = "OI_TARGET";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let ts = &self.targets;
        let mut t = new_bintable::<Self>(self.revision, extver, ts.len());

        t.push_column(Column::new(
            "TARGET_ID",
            1,
            ColumnData::Int16(ts.iter().map(|t| t.target_id as i16).collect()),
        ))?;
        t.push_column(text_column("TARGET", ts.iter().map(|t| t.target.as_str())))?;
        t.push_column(target_column!(ts, "RAEP0", raep0, Float64).with_unit("deg"))?;
        t.push_column(target_column!(ts, "DECEP0", decep0, Float64).with_unit("deg"))?;
        t.push_column(target_column!(ts, "EQUINOX", equinox, Float32).with_unit("year"))?;
        t.push_column(target_column!(ts, "RA_ERR", ra_err, Float64).with_unit("deg"))?;
        t.push_column(target_column!(ts, "DEC_ERR", dec_err, Float64).with_unit("deg"))?;
        t.push_column(target_column!(ts, "SYSVEL", sysvel, Float64).with_unit("m/s"))?;
        t.push_column(text_column("VELTYP", ts.iter().map(|t| t.veltyp.as_str())))?;
        t.push_column(text_column("VELDEF", ts.iter().map(|t| t.veldef.as_str())))?;
        t.push_column(target_column!(ts, "PMRA", pmra, Float64).with_unit("deg/yr"))?;
        t.push_column(target_column!(ts, "PMDEC", pmdec, Float64).with_unit("deg/yr"))?;
        t.push_column(target_column!(ts, "PMRA_ERR", pmra_err, Float64).with_unit("deg/yr"))?;
        t.push_column(target_column!(ts, "PMDEC_ERR", pmdec_err, Float64).with_unit("deg/yr"))?;
        t.push_column(target_column!(ts, "PARALLAX", parallax, Float32).with_unit("deg"))?;
        t.push_column(target_column!(ts, "PARA_ERR", para_err, Float32).with_unit("deg"))?;
        t.push_column(text_column("SPECTYP", ts.iter().map(|t| t.spectyp.as_str())))?;

        if self.usecategory {
            t.push_column(text_column("CATEGORY", ts.iter().map(|t| t.category.as_str())))?;
        }

        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let ids = table.column("TARGET_ID")?.to_i32_vec()?;
        let names = table.column("TARGET")?.as_text()?;
        let raep0 = table.column("RAEP0")?.to_f64_vec()?;
        let decep0 = table.column("DECEP0")?.to_f64_vec()?;
        let equinox = table.column("EQUINOX")?.to_f32_vec()?;
        let ra_err = table.column("RA_ERR")?.to_f64_vec()?;
        let dec_err = table.column("DEC_ERR")?.to_f64_vec()?;
        let sysvel = table.column("SYSVEL")?.to_f64_vec()?;
        let veltyp = table.column("VELTYP")?.as_text()?;
        let veldef = table.column("VELDEF")?.as_text()?;
        let pmra = table.column("PMRA")?.to_f64_vec()?;
        let pmdec = table.column("PMDEC")?.to_f64_vec()?;
        let pmra_err = table.column("PMRA_ERR")?.to_f64_vec()?;
        let pmdec_err = table.column("PMDEC_ERR")?.to_f64_vec()?;
        let parallax = table.column("PARALLAX")?.to_f32_vec()?;
        let para_err = table.column("PARA_ERR")?.to_f32_vec()?;
        let spectyp = table.column("SPECTYP")?.as_text()?;

        let category = match table.find_column("CATEGORY") {
            Some(c) => Some(c.as_text()?),
            None => None,
        };

        let targets = (0..table.nrows())
            .map(|i| Target {
                target_id: ids[i],
                target: names[i].clone(),
                raep0: raep0[i],
                decep0: decep0[i],
                equinox: equinox[i],
                ra_err: ra_err[i],
                dec_err: dec_err[i],
                sysvel: sysvel[i],
                veltyp: veltyp[i].clone(),
                veldef: veldef[i].clone(),
                pmra: pmra[i],
                pmdec: pmdec[i],
                pmra_err: pmra_err[i],
                pmdec_err: pmdec_err[i],
                parallax: parallax[i],
                para_err: para_err[i],
                spectyp: spectyp[i].clone(),
                category: category.map(|c| c[i].clone()).unwrap_or_default(),
            })
            .collect();

        Ok(TargetList {
            revision: read_revision(table)?,
            usecategory: category.is_some(),
            targets,
        })
    }
}
