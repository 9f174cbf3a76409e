// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_CORR` table: a sparse correlation matrix between data points.

use oifits_fits::{BinTable, Column, ColumnData, HeaderValue};

use super::{new_bintable, read_required_keyword, read_revision, set_text, NamedTable, OiTable};
use crate::errors::{OifitsError, Result};
use crate::index::IndexKind;

/// An `OI_CORR` table.
///
/// Only the non-zero elements of the matrix are stored, as
/// `(iindx, jindx, corr)` triplets. Indices are 1-based, referring to the
/// `CORRINDX_*` values of measurement tables.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrTable {
    pub revision: i32,
    pub corrname: String,
    /// The total number of correlated data points.
    pub ndata: i32,
    iindx: Vec<i32>,
    jindx: Vec<i32>,
    corr: Vec<f64>,
}

impl CorrTable {
    pub fn new<S: Into<String>>(corrname: S, ndata: i32) -> Self {
        CorrTable {
            revision: Self::CURRENT_REVISION,
            corrname: corrname.into(),
            ndata,
            iindx: Vec::new(),
            jindx: Vec::new(),
            corr: Vec::new(),
        }
    }

    /// Add a non-zero correlation.
    pub fn push(&mut self, iindx: i32, jindx: i32, corr: f64) {
        self.iindx.push(iindx);
        self.jindx.push(jindx);
        self.corr.push(corr);
    }

    /// The number of non-zero correlations.
    pub fn ncorr(&self) -> usize {
        self.corr.len()
    }

    /// Iterate over the `(iindx, jindx, corr)` triplets.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, f64)> + '_ {
        self.iindx
            .iter()
            .zip(&self.jindx)
            .zip(&self.corr)
            .map(|((i, j), c)| (*i, *j, *c))
    }

    pub fn iindx(&self) -> &[i32] {
        &self.iindx
    }

    pub fn jindx(&self) -> &[i32] {
        &self.jindx
    }

    pub fn corr(&self) -> &[f64] {
        &self.corr
    }

    pub fn corr_mut(&mut self) -> &mut [f64] {
        &mut self.corr
    }
}

impl OiTable for CorrTable {
    const EXTNAME: &'static str = "OI_CORR";
    const CURRENT_REVISION: i32 = 1;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let mut t = new_bintable::<Self>(self.revision, extver, self.ncorr());
        set_text(&mut t, "CORRNAME", &self.corrname);
        t.header.set("NDATA", HeaderValue::Integer(self.ndata as i64));
        t.push_column(Column::new("IINDX", 1, ColumnData::Int32(self.iindx.clone())))?;
        t.push_column(Column::new("JINDX", 1, ColumnData::Int32(self.jindx.clone())))?;
        t.push_column(Column::new("CORR", 1, ColumnData::Float64(self.corr.clone())))?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let iindx = table.column("IINDX")?.to_i32_vec()?;
        let jindx = table.column("JINDX")?.to_i32_vec()?;
        let corr = table.column("CORR")?.to_f64_vec()?;

        for &(column, len) in [("IINDX", iindx.len()), ("JINDX", jindx.len())].iter() {
            if len != corr.len() {
                return Err(OifitsError::LengthMismatch {
                    column,
                    expected: corr.len(),
                    actual: len,
                });
            }
        }

        Ok(CorrTable {
            revision: read_revision(table)?,
            corrname: read_required_keyword(table, "CORRNAME")?,
            ndata: table.header.require_int("NDATA")? as i32,
            iindx,
            jindx,
            corr,
        })
    }
}

impl NamedTable for CorrTable {
    const KIND: IndexKind = IndexKind::Corr;

    fn name(&self) -> &str {
        &self.corrname
    }
}
