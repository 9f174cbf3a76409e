// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

/*!
An in-memory model of OIFITS data sets.

OIFITS is the FITS-based exchange format for calibrated data from optical
interferometers. A data set is a collection of binary tables: a list of
targets, descriptions of the arrays and spectral setups, and measurement
tables (visibilities, squared visibilities, triple products, and spectra)
that refer to those descriptions by name.

The [`Container`] type holds a whole data set. Load one with
[`Container::read`], or start from [`Container::new`] and add tables
yourself, then save it with [`Container::write`]. Operations that may need
to complain about the data take a [`NotificationBackend`]; pass a
[`NoopNotificationBackend`] to keep them quiet.

```rust,no_run
use oifits::{Container, NoopNotificationBackend};

let mut nb = NoopNotificationBackend::new();
let data = Container::read("data.fits", &mut nb).unwrap();
print!("{}", data.summary());
```

*/

mod checks;
pub mod container;
pub mod errors;
pub mod index;
mod load;
pub mod records;
pub mod summary;
pub mod synth;
pub mod tables;
mod write;

pub use oifits_core::notify::{
    BufferingNotificationBackend, NoopNotificationBackend, NotificationBackend,
};

pub use checks::DataCounts;
pub use container::Container;
pub use errors::{OifitsError, Result};
pub use index::{IndexKind, NameIndex};
pub use records::{ChannelRecord, ChannelRecords};
pub use summary::Summary;
pub use synth::{date_to_mjd, mjd_to_date};
pub use tables::{
    array::{ArrayTable, Element},
    corr::CorrTable,
    flux::{SpectrumRecord, SpectrumTable},
    header::PrimaryHeader,
    polar::{PolarRecord, PolarTable},
    t3::{T3Record, T3Table},
    target::{Target, TargetList},
    vis::{VisRecord, VisTable},
    vis2::{Vis2Record, Vis2Table},
    wavelength::WavelengthTable,
    MeasurementTable, NamedTable, OiTable,
};
