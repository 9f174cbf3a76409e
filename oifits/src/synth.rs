// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
Filling in the aggregate keywords of the primary header.

Version 1 of the format has no mandatory primary header keywords, while
version 2 expects `TELESCOP`, `INSTRUME`, `OBJECT`, and `DATE-OBS` to
summarize the whole data set. These are derived from the tables.

*/

use chrono::{NaiveDate, TimeDelta};

use crate::tables::MeasurementTable;
use crate::Container;

/// Placeholder for a keyword that would have several values.
pub const MULTIPLE: &str = "MULTIPLE";

/// Placeholder for a keyword with no value at all.
pub const UNKNOWN: &str = "UNKNOWN";

fn mjd_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1858, 11, 17)
}

/// Convert a `YYYY-MM-DD` date to a Modified Julian Day number.
///
/// Anything following the date, such as a time of day, is ignored. Returns
/// `None` if the string does not start with a valid date.
pub fn date_to_mjd(date: &str) -> Option<i64> {
    let (parsed, _) = NaiveDate::parse_and_remainder(date.trim(), "%Y-%m-%d").ok()?;
    Some(parsed.signed_duration_since(mjd_epoch()?).num_days())
}

/// Convert a Modified Julian Day number to a `YYYY-MM-DD` date.
pub fn mjd_to_date(mjd: i64) -> Option<String> {
    let date = mjd_epoch()?.checked_add_signed(TimeDelta::try_days(mjd)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn earliest<'a, T, I>(tables: I, best: &mut Option<i64>)
where
    T: MeasurementTable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    for mjd in tables.into_iter().filter_map(|t| date_to_mjd(t.date_obs())) {
        *best = Some(best.map_or(mjd, |b| b.min(mjd)));
    }
}

impl Container {
    /// The earliest observation date of any measurement table, as a
    /// Modified Julian Day number. Unparseable dates are skipped.
    pub fn earliest_mjd(&self) -> Option<i64> {
        let mut best = None;
        earliest(self.vis(), &mut best);
        earliest(self.vis2(), &mut best);
        earliest(self.t3(), &mut best);
        earliest(self.spectra(), &mut best);
        best
    }

    /// Set the aggregate primary header keywords from the tables currently
    /// held.
    ///
    /// `DATE-OBS` is left unchanged if no measurement table has a valid
    /// date.
    pub fn synthesize_header(&mut self) {
        let telescop = match self.arrays() {
            [] => UNKNOWN.to_owned(),
            [only] => only.arrname.clone(),
            _ => MULTIPLE.to_owned(),
        };

        // Zero tables also give MULTIPLE here, unlike TELESCOP.
        let instrume = match self.wavelengths() {
            [only] => only.insname.clone(),
            _ => MULTIPLE.to_owned(),
        };

        let object = match &self.targets.targets[..] {
            [only] => only.target.clone(),
            _ => MULTIPLE.to_owned(),
        };

        let date_obs = self.earliest_mjd().and_then(mjd_to_date);

        let header = &mut self.header;
        header.telescop = telescop;
        header.instrume = instrume;
        header.object = object;

        if let Some(d) = date_obs {
            header.date_obs = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mjd_conversions() {
        assert_eq!(date_to_mjd("1858-11-17"), Some(0));
        assert_eq!(date_to_mjd("2000-01-01"), Some(51544));
        assert_eq!(date_to_mjd("2000-01-01T12:00:00"), Some(51544));
        assert_eq!(date_to_mjd("not a date"), None);
        assert_eq!(date_to_mjd(""), None);
        assert_eq!(date_to_mjd("2020-02-30"), None);
        assert_eq!(date_to_mjd("2020-02-29"), Some(58908));
        assert_eq!(mjd_to_date(51544).as_deref(), Some("2000-01-01"));
    }
}
