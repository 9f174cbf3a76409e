// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Sequences of records whose arrays are sized by a table's channel count.
//!
//! Every measurement table fixes a number of spectral channels, `nwave`, and
//! each of its records holds several arrays of exactly that length. A
//! [`ChannelRecords`] is created with the table's `nwave` and refuses any
//! record built for a different channel count, so a table can never hold a
//! mis-sized record.

use crate::errors::{OifitsError, Result};
use std::slice;

/// A record whose per-channel arrays all have the same length.
pub trait ChannelRecord {
    /// The number of spectral channels this record was built for.
    fn nwave(&self) -> usize;
}

/// An ordered sequence of records sharing one channel count.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelRecords<R> {
    nwave: usize,
    records: Vec<R>,
}

impl<R: ChannelRecord> ChannelRecords<R> {
    /// Create an empty sequence for records of `nwave` channels.
    pub fn new(nwave: usize) -> Self {
        ChannelRecords {
            nwave,
            records: Vec::new(),
        }
    }

    /// The channel count shared by every record.
    pub fn nwave(&self) -> usize {
        self.nwave
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, which must have been built for this sequence's
    /// channel count.
    pub fn push(&mut self, record: R) -> Result<()> {
        if record.nwave() != self.nwave {
            return Err(OifitsError::ChannelCount {
                expected: self.nwave,
                actual: record.nwave(),
            });
        }

        self.records.push(record);
        Ok(())
    }

    /// Get a record by position.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    /// Get a record by position, for modification of its values.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.records.get_mut(index)
    }

    /// Iterate over the records.
    pub fn iter(&self) -> slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Iterate mutably over the records.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, R> {
        self.records.iter_mut()
    }
}

impl<'a, R> IntoIterator for &'a ChannelRecords<R> {
    type Item = &'a R;
    type IntoIter = slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Dummy(usize);

    impl ChannelRecord for Dummy {
        fn nwave(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn channel_count_is_enforced() {
        let mut recs = ChannelRecords::new(4);
        recs.push(Dummy(4)).unwrap();

        match recs.push(Dummy(3)) {
            Err(OifitsError::ChannelCount { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected result {other:?}"),
        }

        assert_eq!(recs.len(), 1);
        assert_eq!(recs.iter().count(), 1);
    }
}
