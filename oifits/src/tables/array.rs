// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_ARRAY` table: the stations of an interferometric array.

use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};

use super::{
    new_bintable, read_float_keyword, read_keyword, read_required_keyword, read_revision,
    set_text, text_column, NamedTable, OiTable,
};
use crate::errors::{OifitsError, Result};
use crate::index::IndexKind;

/// One station (telescope position) of an array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub tel_name: String,
    pub sta_name: String,
    pub sta_index: i32,
    pub diameter: f32,
    pub staxyz: [f64; 3],
    /// Field of view, in arcsec. Revision 2 only.
    pub fov: f64,
    /// Revision 2 only.
    pub fovtype: String,
}

/// An `OI_ARRAY` table.
///
/// Elements are not assumed to be sorted or unique by station index.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayTable {
    pub revision: i32,
    pub arrname: String,
    pub frame: String,
    pub arrayx: f64,
    pub arrayy: f64,
    pub arrayz: f64,
    pub elements: Vec<Element>,
}

impl ArrayTable {
    pub fn new<S: Into<String>>(arrname: S) -> Self {
        ArrayTable {
            revision: Self::CURRENT_REVISION,
            arrname: arrname.into(),
            frame: "GEOCENTRIC".to_owned(),
            arrayx: 0.,
            arrayy: 0.,
            arrayz: 0.,
            elements: Vec::new(),
        }
    }

    /// The first element with the given station index.
    pub fn element(&self, sta_index: i32) -> Option<&Element> {
        self.elements.iter().find(|e| e.sta_index == sta_index)
    }
}

impl OiTable for ArrayTable {
    const EXTNAME: &'static str = "OI_ARRAY";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let els = &self.elements;
        let mut t = new_bintable::<Self>(self.revision, extver, els.len());
        set_text(&mut t, "ARRNAME", &self.arrname);
        set_text(&mut t, "FRAME", &self.frame);
        t.header.set("ARRAYX", HeaderValue::Float(self.arrayx));
        t.header.set("ARRAYY", HeaderValue::Float(self.arrayy));
        t.header.set("ARRAYZ", HeaderValue::Float(self.arrayz));

        t.push_column(text_column("TEL_NAME", els.iter().map(|e| e.tel_name.as_str())))?;
        t.push_column(text_column("STA_NAME", els.iter().map(|e| e.sta_name.as_str())))?;
        t.push_column(Column::new(
            "STA_INDEX",
            1,
            ColumnData::Int16(els.iter().map(|e| e.sta_index as i16).collect()),
        ))?;
        t.push_column(
            Column::new(
                "DIAMETER",
                1,
                ColumnData::Float32(els.iter().map(|e| e.diameter).collect()),
            )
            .with_unit("m"),
        )?;
        t.push_column(
            Column::new(
                "STAXYZ",
                3,
                ColumnData::Float64(els.iter().flat_map(|e| e.staxyz.iter().cloned()).collect()),
            )
            .with_unit("m"),
        )?;

        if self.revision >= 2 {
            t.push_column(
                Column::new("FOV", 1, ColumnData::Float64(els.iter().map(|e| e.fov).collect()))
                    .with_unit("arcsec"),
            )?;
            t.push_column(text_column("FOVTYPE", els.iter().map(|e| e.fovtype.as_str())))?;
        }

        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let n = table.nrows();
        let tel_name = table.column("TEL_NAME")?.as_text()?;
        let sta_name = table.column("STA_NAME")?.as_text()?;
        let sta_index = table.column("STA_INDEX")?.to_i32_vec()?;
        let diameter = table.column("DIAMETER")?.to_f32_vec()?;
        let staxyz = table.column("STAXYZ")?.to_f64_vec()?;

        if staxyz.len() != 3 * n {
            return Err(OifitsError::LengthMismatch {
                column: "STAXYZ",
                expected: 3 * n,
                actual: staxyz.len(),
            });
        }

        let fov = match table.find_column("FOV") {
            Some(c) => c.to_f64_vec()?,
            None => vec![0.; n],
        };

        let fovtype = match table.find_column("FOVTYPE") {
            Some(c) => c.as_text()?.to_vec(),
            None => vec![String::new(); n],
        };

        let elements = (0..n)
            .map(|i| Element {
                tel_name: tel_name[i].clone(),
                sta_name: sta_name[i].clone(),
                sta_index: sta_index[i],
                diameter: diameter[i],
                staxyz: [staxyz[3 * i], staxyz[3 * i + 1], staxyz[3 * i + 2]],
                fov: fov[i],
                fovtype: fovtype[i].clone(),
            })
            .collect();

        Ok(ArrayTable {
            revision: read_revision(table)?,
            arrname: read_required_keyword(table, "ARRNAME")?,
            frame: read_keyword(table, "FRAME"),
            arrayx: read_float_keyword(table, "ARRAYX")?,
            arrayy: read_float_keyword(table, "ARRAYY")?,
            arrayz: read_float_keyword(table, "ARRAYZ")?,
            elements,
        })
    }
}

impl NamedTable for ArrayTable {
    const KIND: IndexKind = IndexKind::Array;

    fn name(&self) -> &str {
        &self.arrname
    }
}
