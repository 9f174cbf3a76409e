// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
Name-based lookup of the tables that measurement tables refer to.

Measurement tables name the `OI_ARRAY`, `OI_WAVELENGTH`, and `OI_CORR`
tables they depend on through the `ARRNAME`, `INSNAME`, and `CORRNAME`
keywords. A [`NameIndex`] caches the position of each named table within
its container's sequence so that those references can be followed quickly.

The index is filled lazily. A query that misses the cache falls back to a
linear search of the sequence, and caches the result only if the search
succeeds. A search that fails leaves the index untouched and is reported as
a warning: dangling references are legal, if unfortunate.

*/

use oifits_core::notify::NotificationBackend;
use oifits_core::on_warning;
use std::collections::HashMap;

use crate::tables::NamedTable;

/// The kinds of table that can be referred to by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// `OI_ARRAY` tables, referred to by `ARRNAME`.
    Array,

    /// `OI_WAVELENGTH` tables, referred to by `INSNAME`.
    Wavelength,

    /// `OI_CORR` tables, referred to by `CORRNAME`.
    Corr,
}

impl IndexKind {
    /// The `EXTNAME` of tables of this kind.
    pub fn extname(self) -> &'static str {
        match self {
            IndexKind::Array => "OI_ARRAY",
            IndexKind::Wavelength => "OI_WAVELENGTH",
            IndexKind::Corr => "OI_CORR",
        }
    }

    /// The header keyword holding the name of a table of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            IndexKind::Array => "ARRNAME",
            IndexKind::Wavelength => "INSNAME",
            IndexKind::Corr => "CORRNAME",
        }
    }
}

/// Cached positions of named tables, one map per kind.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    arrays: HashMap<String, usize>,
    wavelengths: HashMap<String, usize>,
    corrs: HashMap<String, usize>,
}

impl NameIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: IndexKind) -> &HashMap<String, usize> {
        match kind {
            IndexKind::Array => &self.arrays,
            IndexKind::Wavelength => &self.wavelengths,
            IndexKind::Corr => &self.corrs,
        }
    }

    fn map_mut(&mut self, kind: IndexKind) -> &mut HashMap<String, usize> {
        match kind {
            IndexKind::Array => &mut self.arrays,
            IndexKind::Wavelength => &mut self.wavelengths,
            IndexKind::Corr => &mut self.corrs,
        }
    }

    /// Look up a cached position without searching.
    pub fn get(&self, kind: IndexKind, name: &str) -> Option<usize> {
        self.map(kind).get(name).copied()
    }

    /// Returns true if the name is cached for the given kind.
    pub fn contains(&self, kind: IndexKind, name: &str) -> bool {
        self.map(kind).contains_key(name)
    }

    /// The total number of cached names, across all kinds.
    pub fn len(&self) -> usize {
        self.arrays.len() + self.wavelengths.len() + self.corrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached position.
    pub fn clear(&mut self) {
        self.arrays.clear();
        self.wavelengths.clear();
        self.corrs.clear();
    }

    /// Find the position of the table named `name` within `tables`.
    ///
    /// The cache is consulted first. On a miss, `tables` is searched in
    /// order and the first match is cached. If nothing matches, a warning
    /// is emitted and the index is not modified. Empty names are never
    /// resolved.
    pub fn resolve<T: NamedTable>(
        &mut self,
        name: &str,
        tables: &[T],
        nb: &mut dyn NotificationBackend,
    ) -> Option<usize> {
        if name.is_empty() {
            return None;
        }

        if let Some(pos) = self.get(T::KIND, name) {
            return Some(pos);
        }

        match tables.iter().position(|t| t.name() == name) {
            Some(pos) => {
                self.map_mut(T::KIND).insert(name.to_owned(), pos);
                Some(pos)
            }

            None => {
                on_warning!(
                    nb,
                    "missing {} with {}={}",
                    T::KIND.extname(),
                    T::KIND.keyword(),
                    name
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::array::ArrayTable;
    use oifits_core::notify::{BufferingNotificationBackend, NotificationKind};

    #[test]
    fn miss_warns_without_caching() {
        let arrays = vec![ArrayTable::new("VLTI"), ArrayTable::new("CHARA")];
        let mut index = NameIndex::new();
        let mut nb = BufferingNotificationBackend::new();

        assert_eq!(index.resolve("NPOI", &arrays, &mut nb), None);
        assert!(index.is_empty());

        let msgs: Vec<_> = nb.messages().collect();
        assert_eq!(
            msgs,
            vec![(NotificationKind::Warning, "missing OI_ARRAY with ARRNAME=NPOI")]
        );
    }

    #[test]
    fn hit_is_cached() {
        let arrays = vec![ArrayTable::new("VLTI"), ArrayTable::new("CHARA")];
        let mut index = NameIndex::new();
        let mut nb = BufferingNotificationBackend::new();

        assert_eq!(index.resolve("CHARA", &arrays, &mut nb), Some(1));
        assert!(index.contains(IndexKind::Array, "CHARA"));
        assert!(!index.contains(IndexKind::Wavelength, "CHARA"));
        assert_eq!(index.resolve("CHARA", &arrays, &mut nb), Some(1));
        assert_eq!(index.len(), 1);
        assert!(nb.is_empty());
    }

    #[test]
    fn empty_names_are_ignored() {
        let arrays = vec![ArrayTable::new("")];
        let mut index = NameIndex::new();
        let mut nb = BufferingNotificationBackend::new();

        assert_eq!(index.resolve("", &arrays, &mut nb), None);
        assert!(index.is_empty());
        assert!(nb.is_empty());
    }
}
