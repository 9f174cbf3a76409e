// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Human-readable summaries of a data set.

use std::fmt;

use crate::tables::MeasurementTable;
use crate::Container;

/// A displayable summary of a [`Container`].
///
/// Obtain one with [`Container::summarize`]. Formatting it describes the
/// primary header and then each table, grouped by type.
#[derive(Clone, Copy, Debug)]
pub struct Summary<'a> {
    container: &'a Container,
}

fn measurement_lines<T: MeasurementTable>(
    f: &mut fmt::Formatter,
    label: &str,
    tables: &[T],
) -> fmt::Result {
    writeln!(f, "  {} {} tables:", tables.len(), label)?;

    for (i, t) in tables.iter().enumerate() {
        writeln!(f, "    #{:<2} DATE-OBS={}", i + 1, t.date_obs())?;
        writeln!(
            f,
            "    INSNAME='{}'  ARRNAME='{}'  CORRNAME='{}'",
            t.insname(),
            t.arrname(),
            t.corrname()
        )?;
        writeln!(f, "     {:5} records x {:3} wavebands", t.numrec(), t.nwave())?;
    }

    Ok(())
}

impl<'a> fmt::Display for Summary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = self.container;
        let h = &c.header;

        writeln!(f, "OIFITS data:")?;
        writeln!(f, "  DATE-OBS={}  OBJECT='{}'", h.date_obs, h.object)?;
        writeln!(f, "  TELESCOP='{}'  INSTRUME='{}'", h.telescop, h.instrume)?;
        writeln!(f, "  INSMODE='{}'  OBSTECH='{}'", h.insmode, h.obstech)?;
        writeln!(f)?;

        writeln!(f, "  {} OI_ARRAY tables:", c.arrays().len())?;
        for (i, t) in c.arrays().iter().enumerate() {
            writeln!(
                f,
                "    #{:<2} ARRNAME='{}'  {} elements",
                i + 1,
                t.arrname,
                t.elements.len()
            )?;
        }

        writeln!(f, "  {} OI_WAVELENGTH tables:", c.wavelengths().len())?;
        for (i, t) in c.wavelengths().iter().enumerate() {
            writeln!(
                f,
                "    #{:<2} INSNAME='{}'  {} channels  {:7.1}-{:7.1}nm",
                i + 1,
                t.insname,
                t.nwave(),
                1e9 * t.min_wavelength().unwrap_or(0.) as f64,
                1e9 * t.max_wavelength().unwrap_or(0.) as f64
            )?;
        }

        writeln!(f, "  {} OI_CORR tables:", c.corrs().len())?;
        for (i, t) in c.corrs().iter().enumerate() {
            writeln!(
                f,
                "    #{:<2} CORRNAME='{}'  {}/{} non-zero correlations",
                i + 1,
                t.corrname,
                t.ncorr(),
                t.ndata
            )?;
        }

        writeln!(f, "  {} OI_POLAR tables:", c.polars().len())?;
        for (i, t) in c.polars().iter().enumerate() {
            writeln!(f, "    #{:<2} ARRNAME='{}'", i + 1, t.arrname)?;
        }

        measurement_lines(f, "OI_VIS", c.vis())?;
        measurement_lines(f, "OI_VIS2", c.vis2())?;
        measurement_lines(f, "OI_T3", c.t3())?;
        measurement_lines(f, "OI_SPECTRUM", c.spectra())
    }
}

impl Container {
    /// Get a displayable summary of this data set.
    pub fn summarize(&self) -> Summary<'_> {
        Summary { container: self }
    }

    /// Describe this data set in a multi-line report.
    pub fn summary(&self) -> String {
        self.summarize().to_string()
    }

    /// Print the summary to standard output.
    pub fn print_summary(&self) {
        print!("{}", self.summarize());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{array::ArrayTable, vis2::Vis2Table, wavelength::WavelengthTable};
    use oifits_core::notify::NoopNotificationBackend;

    #[test]
    fn layout() {
        let mut c = Container::new();
        let mut nb = NoopNotificationBackend::new();
        c.header.object = "Betelgeuse".to_owned();
        c.add_array(ArrayTable::new("VLTI"));
        c.add_wavelength(
            WavelengthTable::new("AMBER", vec![2.0e-6, 2.5e-6], vec![1e-8, 1e-8]).unwrap(),
        );
        let mut vis2 = Vis2Table::new("AMBER", 2);
        vis2.date_obs = "2020-05-01".to_owned();
        vis2.arrname = "VLTI".to_owned();
        c.add_vis2(vis2, &mut nb);

        let s = c.summary();
        assert!(s.starts_with("OIFITS data:\n  DATE-OBS=  OBJECT='Betelgeuse'\n"));
        assert!(s.contains("  1 OI_ARRAY tables:\n    #1  ARRNAME='VLTI'  0 elements\n"));
        assert!(s.contains("INSNAME='AMBER'  2 channels   2000.0- 2500.0nm\n"));
        assert!(s.contains("  0 OI_POLAR tables:\n  0 OI_VIS tables:\n  1 OI_VIS2 tables:\n"));
        assert!(s.contains("    INSNAME='AMBER'  ARRNAME='VLTI'  CORRNAME=''\n"));
        assert!(s.contains("         0 records x   2 wavebands\n"));
        assert!(s.ends_with("  0 OI_SPECTRUM tables:\n"));
        assert_eq!(s, c.summary());
    }
}
