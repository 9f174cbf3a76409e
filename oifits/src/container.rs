// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
The in-memory OIFITS data set.

A [`Container`] owns every table of a data set along with the [`NameIndex`]
used to follow references from measurement tables to the tables they name.
The index stores positions within the container's own sequences, so it
never outlives or aliases the tables it points into.

*/

use oifits_core::notify::NotificationBackend;
use oifits_core::on_warning;

use crate::index::NameIndex;
use crate::tables::{
    array::{ArrayTable, Element},
    corr::CorrTable,
    flux::SpectrumTable,
    header::PrimaryHeader,
    polar::PolarTable,
    t3::T3Table,
    target::{Target, TargetList},
    vis::VisTable,
    vis2::Vis2Table,
    wavelength::WavelengthTable,
    MeasurementTable, NamedTable, StoredTable,
};

/// An OIFITS data set.
///
/// Tables of each type are kept in the order in which they were read or
/// added. Named tables may be modified in place through the `*_mut`
/// accessors; after renaming one, call [`Container::reindex`] so that
/// references to it resolve again.
#[derive(Clone, Debug)]
pub struct Container {
    /// The primary header.
    pub header: PrimaryHeader,

    /// The targets. Every data set has exactly one target list.
    pub targets: TargetList,

    arrays: Vec<ArrayTable>,
    wavelengths: Vec<WavelengthTable>,
    corrs: Vec<CorrTable>,
    polars: Vec<PolarTable>,
    vis: Vec<VisTable>,
    vis2: Vec<Vis2Table>,
    t3: Vec<T3Table>,
    spectra: Vec<SpectrumTable>,
    index: NameIndex,
}

impl Default for Container {
    fn default() -> Self {
        Container {
            header: PrimaryHeader::default(),
            targets: TargetList::default(),
            arrays: Vec::new(),
            wavelengths: Vec::new(),
            corrs: Vec::new(),
            polars: Vec::new(),
            vis: Vec::new(),
            vis2: Vec::new(),
            t3: Vec::new(),
            spectra: Vec::new(),
            index: NameIndex::new(),
        }
    }
}

macro_rules! stored_table {
    ($ty:ty, $field:ident) => {
        impl StoredTable for $ty {
            fn sequence(container: &Container) -> &[Self] {
                &container.$field
            }

            fn sequence_mut(container: &mut Container) -> &mut Vec<Self> {
                &mut container.$field
            }
        }
    };
}

stored_table!(ArrayTable, arrays);
stored_table!(WavelengthTable, wavelengths);
stored_table!(CorrTable, corrs);
stored_table!(PolarTable, polars);
stored_table!(VisTable, vis);
stored_table!(Vis2Table, vis2);
stored_table!(T3Table, t3);
stored_table!(SpectrumTable, spectra);

/// The named tables that measurement tables may refer to.
struct Referents<'a> {
    arrays: &'a [ArrayTable],
    wavelengths: &'a [WavelengthTable],
    corrs: &'a [CorrTable],
}

impl<'a> Referents<'a> {
    /// Resolve and index the references of one measurement table.
    fn resolve<T: MeasurementTable>(
        &self,
        index: &mut NameIndex,
        table: &T,
        nb: &mut dyn NotificationBackend,
    ) {
        index.resolve(table.arrname(), self.arrays, nb);

        if let Some(pos) = index.resolve(table.insname(), self.wavelengths, nb) {
            let wave = &self.wavelengths[pos];

            if wave.nwave() != table.nwave() {
                on_warning!(
                    nb,
                    "{} table has {} channels but OI_WAVELENGTH with INSNAME={} has {}",
                    T::EXTNAME,
                    table.nwave(),
                    wave.insname,
                    wave.nwave()
                );
            }
        }

        index.resolve(table.corrname(), self.corrs, nb);
    }
}

/// Find a named table through the index. Names that no measurement table
/// refers to are not indexed, and so are not found.
fn find_named<'a, T: NamedTable>(
    index: &NameIndex,
    tables: &'a [T],
    name: &str,
) -> Option<&'a T> {
    index
        .get(T::KIND, name)
        .and_then(|pos| tables.get(pos))
        .filter(|t| t.name() == name)
}

impl Container {
    /// Create an empty data set, ready to be populated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrays(&self) -> &[ArrayTable] {
        &self.arrays
    }

    pub fn arrays_mut(&mut self) -> &mut [ArrayTable] {
        &mut self.arrays
    }

    pub fn wavelengths(&self) -> &[WavelengthTable] {
        &self.wavelengths
    }

    pub fn wavelengths_mut(&mut self) -> &mut [WavelengthTable] {
        &mut self.wavelengths
    }

    pub fn corrs(&self) -> &[CorrTable] {
        &self.corrs
    }

    pub fn corrs_mut(&mut self) -> &mut [CorrTable] {
        &mut self.corrs
    }

    pub fn polars(&self) -> &[PolarTable] {
        &self.polars
    }

    pub fn polars_mut(&mut self) -> &mut [PolarTable] {
        &mut self.polars
    }

    pub fn vis(&self) -> &[VisTable] {
        &self.vis
    }

    pub fn vis_mut(&mut self) -> &mut [VisTable] {
        &mut self.vis
    }

    pub fn vis2(&self) -> &[Vis2Table] {
        &self.vis2
    }

    pub fn vis2_mut(&mut self) -> &mut [Vis2Table] {
        &mut self.vis2
    }

    pub fn t3(&self) -> &[T3Table] {
        &self.t3
    }

    pub fn t3_mut(&mut self) -> &mut [T3Table] {
        &mut self.t3
    }

    pub fn spectra(&self) -> &[SpectrumTable] {
        &self.spectra
    }

    pub fn spectra_mut(&mut self) -> &mut [SpectrumTable] {
        &mut self.spectra
    }

    /// The cache of resolved table names.
    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn add_array(&mut self, table: ArrayTable) {
        self.arrays.push(table);
    }

    pub fn add_wavelength(&mut self, table: WavelengthTable) {
        self.wavelengths.push(table);
    }

    pub fn add_corr(&mut self, table: CorrTable) {
        self.corrs.push(table);
    }

    pub fn add_polar(&mut self, table: PolarTable) {
        self.polars.push(table);
    }

    /// Add a visibility table, resolving the tables it refers to.
    ///
    /// Unresolved references and channel-count disagreements are reported
    /// as warnings; the table is added regardless.
    pub fn add_vis(&mut self, table: VisTable, nb: &mut dyn NotificationBackend) {
        self.add_measurement(table, nb)
    }

    /// Add a squared-visibility table. See [`Container::add_vis`].
    pub fn add_vis2(&mut self, table: Vis2Table, nb: &mut dyn NotificationBackend) {
        self.add_measurement(table, nb)
    }

    /// Add a triple-product table. See [`Container::add_vis`].
    pub fn add_t3(&mut self, table: T3Table, nb: &mut dyn NotificationBackend) {
        self.add_measurement(table, nb)
    }

    /// Add a spectrum table. See [`Container::add_vis`].
    pub fn add_spectrum(&mut self, table: SpectrumTable, nb: &mut dyn NotificationBackend) {
        self.add_measurement(table, nb)
    }

    pub(crate) fn add_measurement<T>(&mut self, table: T, nb: &mut dyn NotificationBackend)
    where
        T: MeasurementTable + StoredTable,
    {
        let refs = Referents {
            arrays: &self.arrays,
            wavelengths: &self.wavelengths,
            corrs: &self.corrs,
        };
        refs.resolve(&mut self.index, &table, nb);
        T::sequence_mut(self).push(table);
    }

    pub(crate) fn add_table<T: StoredTable>(&mut self, table: T) {
        T::sequence_mut(self).push(table);
    }

    fn referents(&self) -> Referents<'_> {
        Referents {
            arrays: &self.arrays,
            wavelengths: &self.wavelengths,
            corrs: &self.corrs,
        }
    }

    /// Rebuild the name index from the references of every measurement
    /// table currently held.
    pub fn reindex(&mut self, nb: &mut dyn NotificationBackend) {
        let mut index = NameIndex::new();

        {
            let refs = self.referents();

            for t in &self.vis {
                refs.resolve(&mut index, t, nb);
            }

            for t in &self.vis2 {
                refs.resolve(&mut index, t, nb);
            }

            for t in &self.t3 {
                refs.resolve(&mut index, t, nb);
            }

            for t in &self.spectra {
                refs.resolve(&mut index, t, nb);
            }
        }

        self.index = index;
    }

    /// Find the `OI_ARRAY` table with the given `ARRNAME`.
    ///
    /// This and the other named-table lookups consult only the name index,
    /// which is filled as measurement tables are loaded or added. Call
    /// [`Container::reindex`] after editing tables in place.
    pub fn lookup_array(&self, arrname: &str) -> Option<&ArrayTable> {
        find_named(&self.index, &self.arrays, arrname)
    }

    /// Find the `OI_WAVELENGTH` table with the given `INSNAME`.
    pub fn lookup_wavelength(&self, insname: &str) -> Option<&WavelengthTable> {
        find_named(&self.index, &self.wavelengths, insname)
    }

    /// Find the `OI_CORR` table with the given `CORRNAME`.
    pub fn lookup_corr(&self, corrname: &str) -> Option<&CorrTable> {
        find_named(&self.index, &self.corrs, corrname)
    }

    /// Find a station of the named array by its station index. If several
    /// elements share the index, the first is returned.
    pub fn lookup_element(&self, arrname: &str, sta_index: i32) -> Option<&Element> {
        self.lookup_array(arrname)?.element(sta_index)
    }

    /// Find a target by its identifier. Duplicate identifiers are not
    /// rejected; the first match is returned.
    pub fn lookup_target(&self, target_id: i32) -> Option<&Target> {
        self.targets
            .targets
            .iter()
            .find(|t| t.target_id == target_id)
    }

    /// Find the first target with the given name.
    pub fn lookup_target_by_name(&self, name: &str) -> Option<&Target> {
        self.targets.targets.iter().find(|t| t.target == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexKind;
    use oifits_core::notify::{BufferingNotificationBackend, NoopNotificationBackend};

    fn wavelengths(insname: &str, nwave: usize) -> WavelengthTable {
        WavelengthTable::new(insname, vec![2.2e-6; nwave], vec![1e-8; nwave]).unwrap()
    }

    #[test]
    fn add_resolves_references() {
        let mut c = Container::new();
        let mut nb = NoopNotificationBackend::new();
        c.add_array(ArrayTable::new("VLTI"));
        c.add_wavelength(wavelengths("AMBER", 3));

        let mut vis2 = Vis2Table::new("AMBER", 3);
        vis2.arrname = "VLTI".to_owned();
        c.add_vis2(vis2, &mut nb);

        assert!(c.index().contains(IndexKind::Array, "VLTI"));
        assert_eq!(c.lookup_wavelength("AMBER").map(|w| w.nwave()), Some(3));
        assert!(c.lookup_corr("AMBER").is_none());
    }

    #[test]
    fn channel_disagreement_warns() {
        let mut c = Container::new();
        let mut nb = BufferingNotificationBackend::new();
        c.add_wavelength(wavelengths("AMBER", 3));
        c.add_t3(T3Table::new("AMBER", 5), &mut nb);
        assert_eq!(nb.len(), 1);
        assert_eq!(c.t3().len(), 1);
    }

    #[test]
    fn reindex_follows_renames() {
        let mut c = Container::new();
        let mut nb = NoopNotificationBackend::new();
        c.add_wavelength(wavelengths("AMBER", 2));
        c.add_vis2(Vis2Table::new("AMBER", 2), &mut nb);

        c.wavelengths_mut()[0].insname = "GRAVITY".to_owned();
        c.vis2_mut()[0].insname = "GRAVITY".to_owned();
        assert!(c.lookup_wavelength("AMBER").is_none());

        let mut nb = BufferingNotificationBackend::new();
        c.reindex(&mut nb);
        assert!(nb.is_empty());
        assert!(c.index().contains(IndexKind::Wavelength, "GRAVITY"));
        assert!(!c.index().contains(IndexKind::Wavelength, "AMBER"));
        assert_eq!(c.lookup_wavelength("GRAVITY").map(|w| w.nwave()), Some(2));
    }

    #[test]
    fn unreferenced_tables_are_not_found() {
        let mut c = Container::new();
        let mut nb = NoopNotificationBackend::new();
        c.add_array(ArrayTable::new("VLTI"));
        assert!(c.lookup_array("VLTI").is_none());

        let mut vis2 = Vis2Table::new("", 0);
        vis2.arrname = "VLTI".to_owned();
        c.add_vis2(vis2, &mut nb);
        assert_eq!(c.lookup_array("VLTI").map(|a| a.arrname.as_str()), Some("VLTI"));
    }
}
