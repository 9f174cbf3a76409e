// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The `OI_WAVELENGTH` table: the spectral channels of an instrument setup.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use oifits_fits::{BinTable, Column, ColumnData};

use super::{new_bintable, read_required_keyword, read_revision, set_text, NamedTable, OiTable};
use crate::errors::{OifitsError, Result};
use crate::index::IndexKind;

/// An `OI_WAVELENGTH` table. Wavelengths and bandwidths are in metres.
#[derive(Clone, Debug, PartialEq)]
pub struct WavelengthTable {
    pub revision: i32,
    pub insname: String,
    eff_wave: Array1<f32>,
    eff_band: Array1<f32>,
}

impl WavelengthTable {
    /// Create a table from per-channel effective wavelengths and
    /// bandwidths, which must have the same length.
    pub fn new<S: Into<String>>(
        insname: S,
        eff_wave: Vec<f32>,
        eff_band: Vec<f32>,
    ) -> Result<Self> {
        if eff_wave.len() != eff_band.len() {
            return Err(OifitsError::LengthMismatch {
                column: "EFF_BAND",
                expected: eff_wave.len(),
                actual: eff_band.len(),
            });
        }

        Ok(WavelengthTable {
            revision: Self::CURRENT_REVISION,
            insname: insname.into(),
            eff_wave: Array1::from(eff_wave),
            eff_band: Array1::from(eff_band),
        })
    }

    /// The number of spectral channels.
    pub fn nwave(&self) -> usize {
        self.eff_wave.len()
    }

    pub fn eff_wave(&self) -> ArrayView1<'_, f32> {
        self.eff_wave.view()
    }

    pub fn eff_wave_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.eff_wave.view_mut()
    }

    pub fn eff_band(&self) -> ArrayView1<'_, f32> {
        self.eff_band.view()
    }

    pub fn eff_band_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.eff_band.view_mut()
    }

    /// The shortest effective wavelength, or `None` if there are no channels.
    pub fn min_wavelength(&self) -> Option<f32> {
        self.eff_wave.iter().cloned().reduce(f32::min)
    }

    /// The longest effective wavelength, or `None` if there are no channels.
    pub fn max_wavelength(&self) -> Option<f32> {
        self.eff_wave.iter().cloned().reduce(f32::max)
    }
}

impl OiTable for WavelengthTable {
    const EXTNAME: &'static str = "OI_WAVELENGTH";
    const CURRENT_REVISION: i32 = 2;

    fn revision(&self) -> i32 {
        self.revision
    }

    fn to_bintable(&self, extver: i32) -> Result<BinTable> {
        let mut t = new_bintable::<Self>(self.revision, extver, self.nwave());
        set_text(&mut t, "INSNAME", &self.insname);
        t.push_column(
            Column::new("EFF_WAVE", 1, ColumnData::Float32(self.eff_wave.to_vec())).with_unit("m"),
        )?;
        t.push_column(
            Column::new("EFF_BAND", 1, ColumnData::Float32(self.eff_band.to_vec())).with_unit("m"),
        )?;
        Ok(t)
    }

    fn from_bintable(table: &BinTable) -> Result<Self> {
        let mut w = WavelengthTable::new(
            read_required_keyword(table, "INSNAME")?,
            table.column("EFF_WAVE")?.to_f32_vec()?,
            table.column("EFF_BAND")?.to_f32_vec()?,
        )?;
        w.revision = read_revision(table)?;
        Ok(w)
    }
}

impl NamedTable for WavelengthTable {
    const KIND: IndexKind = IndexKind::Wavelength;

    fn name(&self) -> &str {
        &self.insname
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes() {
        let w = WavelengthTable::new("X", vec![2.2e-6, 1.6e-6, 2.0e-6], vec![1e-8; 3]).unwrap();
        assert_eq!(w.nwave(), 3);
        assert_eq!(w.min_wavelength(), Some(1.6e-6));
        assert_eq!(w.max_wavelength(), Some(2.2e-6));

        assert!(WavelengthTable::new("X", vec![1e-6], vec![]).is_err());
        let empty = WavelengthTable::new("X", vec![], vec![]).unwrap();
        assert_eq!(empty.min_wavelength(), None);
    }
}
