// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! In-memory operations on data sets.

mod common;

use oifits::{
    ArrayTable, BufferingNotificationBackend, Container, DataCounts, IndexKind,
    NoopNotificationBackend, OifitsError, T3Table, Vis2Table, VisRecord, VisTable,
};

#[test]
fn telescope_name_synthesis() {
    let mut c = Container::new();
    c.synthesize_header();
    assert_eq!(c.header.telescop, "UNKNOWN");
    assert_eq!(c.header.instrume, "MULTIPLE");
    assert_eq!(c.header.object, "MULTIPLE");
    assert_eq!(c.header.date_obs, "");

    c.add_array(ArrayTable::new("VLTI"));
    c.synthesize_header();
    assert_eq!(c.header.telescop, "VLTI");

    c.add_array(ArrayTable::new("CHARA"));
    c.synthesize_header();
    assert_eq!(c.header.telescop, "MULTIPLE");
}

#[test]
fn object_and_instrument_synthesis() {
    let mut c = Container::new();
    c.targets.targets.push(common::target(1, "Betelgeuse"));
    c.add_wavelength(common::wavelengths("AMBER"));
    c.synthesize_header();
    assert_eq!(c.header.object, "Betelgeuse");
    assert_eq!(c.header.instrume, "AMBER");

    c.targets.targets.push(common::target(2, "Rigel"));
    c.add_wavelength(common::wavelengths("GRAVITY"));
    c.synthesize_header();
    assert_eq!(c.header.object, "MULTIPLE");
    assert_eq!(c.header.instrume, "MULTIPLE");
}

#[test]
fn earliest_date_skips_garbage() {
    let mut c = Container::new();
    let mut nb = NoopNotificationBackend::new();

    for date in &["2020-05-01", "2019-11-30", "2021-01-01", "sometime", "2019-02-30"] {
        let mut t3 = T3Table::new("AMBER", 2);
        t3.date_obs = (*date).to_owned();
        c.add_t3(t3, &mut nb);
    }

    c.synthesize_header();
    assert_eq!(c.header.date_obs, "2019-11-30");
}

#[test]
fn unparseable_dates_leave_date_alone() {
    let mut c = Container::new();
    let mut nb = NoopNotificationBackend::new();
    c.header.date_obs = "2001-02-03".to_owned();

    let mut vis2 = Vis2Table::new("AMBER", 2);
    vis2.date_obs = "2020/05/01".to_owned();
    c.add_vis2(vis2, &mut nb);

    c.synthesize_header();
    assert_eq!(c.header.date_obs, "2001-02-03");
}

#[test]
fn unknown_names_do_not_touch_the_index() {
    let c = common::sample();
    let before = c.index().len();
    assert!(c.lookup_array("NPOI").is_none());
    assert!(c.lookup_wavelength("NPOI").is_none());
    assert!(c.lookup_corr("").is_none());
    assert_eq!(c.index().len(), before);
    assert!(!c.index().contains(IndexKind::Array, "NPOI"));
}

#[test]
fn unreferenced_tables_load_but_are_not_indexed() {
    let mut c = common::sample();
    c.add_array(common::array("CHARA"));

    let back = common::reload(&c);
    assert_eq!(back.arrays().len(), 2);
    assert_eq!(back.arrays()[1].arrname, "CHARA");
    assert!(!back.index().contains(IndexKind::Array, "CHARA"));
    assert!(back.lookup_array("CHARA").is_none());
    assert!(back.lookup_element("CHARA", 1).is_none());
    assert!(back.lookup_array("VLTI").is_some());
}

#[test]
fn shared_names_resolve_to_one_table() {
    let c = common::sample();
    let by_vis = c.lookup_wavelength(&c.vis()[0].insname).unwrap();
    let by_t3 = c.lookup_wavelength(&c.t3()[0].insname).unwrap();
    assert!(std::ptr::eq(by_vis, by_t3));
    assert!(std::ptr::eq(by_vis, &c.wavelengths()[0]));
}

#[test]
fn dangling_references_warn_once_per_table() {
    let mut c = Container::new();
    let mut nb = BufferingNotificationBackend::new();
    c.add_wavelength(common::wavelengths("AMBER"));

    let mut vis2 = Vis2Table::new("AMBER", common::NWAVE);
    vis2.arrname = "CHARA".to_owned();
    vis2.corrname = "NOCORR".to_owned();
    c.add_vis2(vis2, &mut nb);

    let msgs: Vec<_> = nb.messages().map(|(_, text)| text.to_owned()).collect();
    assert_eq!(
        msgs,
        vec![
            "missing OI_ARRAY with ARRNAME=CHARA".to_owned(),
            "missing OI_CORR with CORRNAME=NOCORR".to_owned(),
        ]
    );
    assert!(c.index().contains(IndexKind::Wavelength, "AMBER"));
    assert!(!c.index().contains(IndexKind::Array, "CHARA"));
}

#[test]
fn first_duplicate_target_wins() {
    let mut c = Container::new();
    c.targets.targets.push(common::target(7, "Betelgeuse"));
    c.targets.targets.push(common::target(7, "Rigel"));
    c.targets.targets.push(common::target(8, "Rigel"));

    assert_eq!(c.lookup_target(7).map(|t| t.target.as_str()), Some("Betelgeuse"));
    assert_eq!(c.lookup_target(9), None);
    assert_eq!(c.lookup_target_by_name("Rigel").map(|t| t.target_id), Some(7));
}

#[test]
fn revision_checks() {
    let mut c = common::sample();
    assert!(c.is_oifits_two());
    assert!(!c.is_oifits_one());

    c.spectra_mut()[0].revision = 2;
    assert!(!c.is_oifits_two());
    c.spectra_mut()[0].revision = 1;

    c.polars_mut()[0].revision = 2;
    assert!(!c.is_oifits_two());
}

#[test]
fn deep_copies_are_independent() {
    let c = common::sample();
    let mut copy = c.vis()[0].clone();
    assert_eq!(&copy, &c.vis()[0]);

    let rec = copy.records_mut().next().unwrap();
    rec.visamp_mut()[0] = -1.;
    rec.iviserr_mut().unwrap()[1] = 99.;

    let orig = c.vis()[0].records().get(0).unwrap();
    assert_eq!(orig.visamp()[0], 0.75);
    assert_eq!(orig.iviserr().unwrap()[1], 0.02);
    assert_eq!(orig.rviserr().unwrap()[1], 0.01);
    assert_ne!(&copy, &c.vis()[0]);

    let plain = VisTable::new("AMBER", 2, false, false);
    let plain_copy = plain.clone();
    assert!(!plain_copy.usevisrefmap());
    assert!(!plain_copy.usecomplex());
}

#[test]
fn copied_iviserr_is_not_rviserr() {
    let c = common::sample();
    let copy = c.vis()[0].clone();
    let rec = copy.records().get(0).unwrap();
    assert_eq!(rec.rviserr().unwrap()[0], 0.01);
    assert_eq!(rec.iviserr().unwrap()[0], 0.02);
}

#[test]
fn mis_sized_records_are_rejected() {
    let mut vis2 = Vis2Table::new("AMBER", 3);
    let other = Vis2Table::new("AMBER", 4);

    match vis2.push(other.new_record()) {
        Err(OifitsError::ChannelCount { expected: 3, actual: 4 }) => {}
        other => panic!("unexpected result {other:?}"),
    }

    let mut vis = VisTable::new("AMBER", 3, true, false);
    let rec = VisRecord::new(3, true, false);
    assert_eq!(rec.visrefmap().map(|m| m.len()), Some(9));
    vis.push(rec).unwrap();

    match vis.push(VisRecord::new(3, false, false)) {
        Err(OifitsError::FeatureMismatch(_)) => {}
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn data_counts_skip_flagged_points() {
    let mut c = common::sample();
    let mut nb = NoopNotificationBackend::new();
    assert_eq!(
        c.count_data(),
        DataCounts {
            vis: 2,
            vis2: 3,
            t3: 3
        }
    );

    let mut vis2 = Vis2Table::new("AMBER", common::NWAVE);

    for _ in 0..2 {
        let mut rec = vis2.new_record();
        rec.flag_mut()[1] = true;
        vis2.push(rec).unwrap();
    }

    c.add_vis2(vis2, &mut nb);
    assert_eq!(c.count_data().vis2, 7);
}

fn timed_vis2(mjds: &[f64]) -> Vis2Table {
    let mut vis2 = Vis2Table::new("AMBER", common::NWAVE);

    for mjd in mjds {
        let mut rec = vis2.new_record();
        rec.mjd = *mjd;
        vis2.push(rec).unwrap();
    }

    vis2
}

#[test]
fn atomic_data_sets() {
    let mut nb = NoopNotificationBackend::new();
    let mut c = Container::new();
    assert!(!c.is_atomic(0.5));

    c.targets.targets.push(common::target(1, "Betelgeuse"));
    c.add_wavelength(common::wavelengths("AMBER"));
    assert!(!c.is_atomic(0.5));

    c.add_vis2(timed_vis2(&[58970.1, 58970.3]), &mut nb);
    assert!(c.is_atomic(0.5));

    c.add_vis2(timed_vis2(&[58970.7]), &mut nb);
    assert!(!c.is_atomic(0.5));
    assert!(c.is_atomic(1.0));

    c.targets.targets.push(common::target(2, "Rigel"));
    assert!(!c.is_atomic(1.0));
}
