// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Data sets shared by the integration tests.

#![allow(dead_code)]

use oifits::{
    ArrayTable, Container, CorrTable, Element, NoopNotificationBackend, PolarTable,
    SpectrumTable, T3Table, Target, Vis2Table, VisTable, WavelengthTable,
};
use oifits_core::Complex;
use oifits_fits::{FitsReader, FitsWriter};
use std::io::Cursor;

pub const NWAVE: usize = 3;

/// Write a data set to memory and load it back.
pub fn reload(c: &Container) -> Container {
    let bytes = c
        .write_to_fits(FitsWriter::new(Cursor::new(Vec::new())))
        .unwrap()
        .into_inner();
    let mut reader = FitsReader::new(Cursor::new(bytes)).unwrap();
    Container::from_fits_reader(&mut reader, &mut NoopNotificationBackend::new()).unwrap()
}

pub fn target(target_id: i32, name: &str) -> Target {
    Target {
        target_id,
        target: name.to_owned(),
        raep0: 88.79,
        decep0: 7.41,
        equinox: 2000.,
        veltyp: "LSR".to_owned(),
        veldef: "OPTICAL".to_owned(),
        spectyp: "M1Iab".to_owned(),
        ..Default::default()
    }
}

pub fn array(arrname: &str) -> ArrayTable {
    let mut array = ArrayTable::new(arrname);
    array.arrayx = 1942014.1;
    array.arrayy = -5455311.6;
    array.arrayz = -2654530.3;

    for i in 1..=3 {
        array.elements.push(Element {
            tel_name: format!("UT{i}"),
            sta_name: format!("U{i}"),
            sta_index: i,
            diameter: 8.2,
            staxyz: [i as f64, -(i as f64), 0.5],
            fov: 0.06,
            fovtype: "RADIUS".to_owned(),
        });
    }

    array
}

pub fn wavelengths(insname: &str) -> WavelengthTable {
    WavelengthTable::new(
        insname,
        vec![2.0e-6, 2.2e-6, 2.4e-6],
        vec![1.0e-7, 1.0e-7, 1.0e-7],
    )
    .unwrap()
}

/// A version 2 data set with one table of every type.
pub fn sample() -> Container {
    let mut nb = NoopNotificationBackend::new();
    let mut c = Container::new();
    c.header.origin = "ESO".to_owned();
    c.header.insmode = "LOW".to_owned();
    c.header.obstech = "INTERFEROMETRIC".to_owned();
    c.targets.targets.push(target(1, "Betelgeuse"));

    c.add_array(array("VLTI"));
    c.add_wavelength(wavelengths("AMBER"));

    let mut corr = CorrTable::new("CORR", 6);
    corr.push(1, 2, 0.25);
    corr.push(2, 3, -0.125);
    c.add_corr(corr);

    let mut polar = PolarTable::new("VLTI", NWAVE);
    polar.date_obs = "2020-05-01".to_owned();
    polar.orient = "NORTH".to_owned();
    polar.model = "FIXED".to_owned();
    let mut prec = polar.new_record();
    prec.target_id = 1;
    prec.insname = "AMBER".to_owned();
    prec.mjd_obs = 58970.0;
    prec.mjd_end = 58970.5;
    prec.sta_index = 2;
    prec.jxx_mut()[1] = Complex::new(0.5, -0.25);
    polar.push(prec).unwrap();
    c.add_polar(polar);

    let mut vis = VisTable::new("AMBER", NWAVE, true, true);
    vis.date_obs = "2020-05-01".to_owned();
    vis.arrname = "VLTI".to_owned();
    vis.corrname = "CORR".to_owned();
    vis.amptyp = "absolute".to_owned();
    vis.phityp = "differential".to_owned();
    vis.complexunit = "Jy".to_owned();
    let mut vrec = vis.new_record();
    vrec.target_id = 1;
    vrec.mjd = 58970.1;
    vrec.ucoord = 12.5;
    vrec.vcoord = -3.25;
    vrec.sta_index = [1, 2];
    vrec.corrindx_visamp = 1;
    vrec.visamp_mut().fill(0.75);
    vrec.visphi_mut()[2] = 45.;
    vrec.rviserr_mut().unwrap().fill(0.01);
    vrec.iviserr_mut().unwrap().fill(0.02);
    if let Some(mut m) = vrec.visrefmap_mut() {
        m[[0, 1]] = true;
    }
    vrec.flag_mut()[0] = true;
    vis.push(vrec).unwrap();
    c.add_vis(vis, &mut nb);

    let mut vis2 = Vis2Table::new("AMBER", NWAVE);
    vis2.date_obs = "2019-11-30".to_owned();
    vis2.arrname = "VLTI".to_owned();
    let mut v2rec = vis2.new_record();
    v2rec.target_id = 1;
    v2rec.vis2data_mut().fill(0.5);
    v2rec.vis2err_mut().fill(0.05);
    v2rec.sta_index = [2, 3];
    vis2.push(v2rec).unwrap();
    c.add_vis2(vis2, &mut nb);

    let mut t3 = T3Table::new("AMBER", NWAVE);
    t3.date_obs = "2021-01-01".to_owned();
    t3.arrname = "VLTI".to_owned();
    let mut t3rec = t3.new_record();
    t3rec.target_id = 1;
    t3rec.t3phi_mut().fill(-12.5);
    t3rec.u1coord = 1.;
    t3rec.v2coord = 2.;
    t3rec.sta_index = [1, 2, 3];
    t3.push(t3rec).unwrap();
    c.add_t3(t3, &mut nb);

    let mut spec = SpectrumTable::new("AMBER", NWAVE);
    spec.date_obs = "2020-05-02".to_owned();
    spec.fov = 0.5;
    spec.fovtype = "FWHM".to_owned();
    let mut srec = spec.new_record();
    srec.target_id = 1;
    srec.fluxdata_mut().fill(10.);
    srec.fluxerr_mut().fill(1.);
    spec.push(srec).unwrap();
    c.add_spectrum(spec, &mut nb);

    c
}
