// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Checks of the format revisions declared by a data set's tables, and
//! other whole-data-set queries.

use crate::tables::{
    array::ArrayTable, corr::CorrTable, flux::SpectrumTable, polar::PolarTable, t3::T3Table,
    vis::VisTable, vis2::Vis2Table, wavelength::WavelengthTable, MeasurementTable, OiTable,
    StoredTable,
};
use crate::Container;

/// Numbers of unflagged data points in a data set, by measurement type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DataCounts {
    pub vis: usize,
    pub vis2: usize,
    pub t3: usize,
}

fn unflagged<T: MeasurementTable>(tables: &[T]) -> usize {
    tables.iter().map(|t| t.num_unflagged()).sum()
}

fn widen(range: Option<(f64, f64)>, other: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (range, other) {
        (Some((lo, hi)), Some((olo, ohi))) => Some((lo.min(olo), hi.max(ohi))),
        (r, None) => r,
        (None, o) => o,
    }
}

fn mjd_span<T: MeasurementTable>(tables: &[T], range: Option<(f64, f64)>) -> Option<(f64, f64)> {
    tables.iter().fold(range, |r, t| widen(r, t.mjd_range()))
}

fn all_at<T: StoredTable>(container: &Container, revision: i32) -> bool {
    T::sequence(container)
        .iter()
        .all(|t| t.revision() == revision)
}

/// Tables present in both versions of the format.
fn core_tables_at(container: &Container, revision: i32) -> bool {
    container.targets.revision() == revision
        && all_at::<ArrayTable>(container, revision)
        && all_at::<WavelengthTable>(container, revision)
        && all_at::<VisTable>(container, revision)
        && all_at::<Vis2Table>(container, revision)
        && all_at::<T3Table>(container, revision)
}

impl Container {
    /// Returns true if every table declares revision 1 of the format.
    ///
    /// Table types introduced in revision 2 are not considered.
    pub fn is_oifits_one(&self) -> bool {
        core_tables_at(self, 1)
    }

    /// Returns true if every table declares the revision defined by
    /// version 2 of the format.
    pub fn is_oifits_two(&self) -> bool {
        core_tables_at(self, 2)
            && all_at::<CorrTable>(self, 1)
            && all_at::<PolarTable>(self, 1)
            && all_at::<SpectrumTable>(self, 1)
    }

    /// Count the unflagged complex visibilities, squared visibilities, and
    /// triple products.
    pub fn count_data(&self) -> DataCounts {
        DataCounts {
            vis: unflagged(self.vis()),
            vis2: unflagged(self.vis2()),
            t3: unflagged(self.t3()),
        }
    }

    /// Returns true if this data set is "atomic": it describes exactly one
    /// target, and every visibility, squared-visibility, and triple-product
    /// record falls within a span of less than `max_days`.
    ///
    /// A data set with no such records is not atomic.
    pub fn is_atomic(&self, max_days: f64) -> bool {
        if self.targets.targets.len() != 1 {
            return false;
        }

        let span = mjd_span(self.t3(), mjd_span(self.vis2(), mjd_span(self.vis(), None)));

        match span {
            Some((lo, hi)) => hi - lo < max_days,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oifits_core::notify::NoopNotificationBackend;

    fn v1_container() -> Container {
        let mut c = Container::new();
        let mut nb = NoopNotificationBackend::new();
        c.targets.revision = 1;

        let mut array = ArrayTable::new("VLTI");
        array.revision = 1;
        c.add_array(array);

        let mut wave = WavelengthTable::new("AMBER", vec![2.2e-6], vec![1e-8]).unwrap();
        wave.revision = 1;
        c.add_wavelength(wave);

        let mut vis2 = Vis2Table::new("AMBER", 1);
        vis2.revision = 1;
        c.add_vis2(vis2, &mut nb);
        c
    }

    #[test]
    fn empty_is_v2() {
        let c = Container::new();
        assert!(c.is_oifits_two());
        assert!(!c.is_oifits_one());
    }

    #[test]
    fn v1_flips() {
        let mut c = v1_container();
        assert!(c.is_oifits_one());
        assert!(!c.is_oifits_two());

        c.wavelengths_mut()[0].revision = 2;
        assert!(!c.is_oifits_one());
    }

    #[test]
    fn atomic_needs_records() {
        let c = v1_container();
        assert_eq!(c.count_data(), DataCounts::default());
        assert!(!c.is_atomic(0.5));
        assert!(!Container::new().is_atomic(0.5));
    }

    #[test]
    fn v2_tables_ignored_for_v1() {
        let mut c = v1_container();
        c.add_corr(CorrTable::new("C", 4));
        assert!(c.is_oifits_one());
    }
}
