// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Writing FITS files to disk and scanning them back.

use oifits_fits::{
    BinTable, Column, ColumnData, FitsError, FitsReader, FitsWriter, Header, HeaderValue,
};
use tempfile::TempDir;

fn table(extname: &str, values: Vec<f64>) -> BinTable {
    let mut t = BinTable::new(extname, values.len());
    t.header.set("OI_REVN", HeaderValue::Integer(2));
    t.push_column(Column::new("EFF_WAVE", 1, ColumnData::Float64(values)).with_unit("m"))
        .unwrap();
    t
}

#[test]
fn create_then_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables.fits");

    let mut primary = Header::new();
    primary.set("ORIGIN", HeaderValue::Text("ESO".to_owned()));

    let mut writer = FitsWriter::create(&path).unwrap();
    writer.write_primary(&primary).unwrap();
    writer.write_bintable(&table("OI_WAVELENGTH", vec![2e-6, 2.2e-6])).unwrap();
    writer.write_bintable(&table("OI_OTHER", vec![1.])).unwrap();
    writer.write_bintable(&table("OI_WAVELENGTH", vec![1.5e-6])).unwrap();
    assert_eq!(writer.n_hdus(), 4);
    writer.close().unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len() % 2880, 0);

    let mut reader = FitsReader::open_readonly(&path).unwrap();
    assert_eq!(reader.hdus().len(), 4);
    assert_eq!(reader.primary_header().get_str("ORIGIN"), Some("ESO"));

    let first = reader.next_bintable("OI_WAVELENGTH").unwrap().unwrap();
    assert_eq!(first.header.get_int("OI_REVN"), Some(2));
    assert_eq!(first.column("EFF_WAVE").unwrap().to_f64_vec().unwrap(), vec![2e-6, 2.2e-6]);
    assert_eq!(first.column("EFF_WAVE").unwrap().unit.as_deref(), Some("m"));

    let second = reader.next_bintable("OI_WAVELENGTH").unwrap().unwrap();
    assert_eq!(second.nrows(), 1);
    assert!(reader.next_bintable("OI_WAVELENGTH").unwrap().is_none());

    reader.rewind();
    let other = reader.next_bintable("OI_OTHER").unwrap().unwrap();
    assert_eq!(other.column("EFF_WAVE").unwrap().to_f64_vec().unwrap(), vec![1.]);
}

#[test]
fn existing_files_are_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables.fits");
    std::fs::write(&path, b"precious").unwrap();

    match FitsWriter::create(&path) {
        Err(FitsError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }

    assert_eq!(std::fs::read(&path).unwrap(), b"precious");
}

#[test]
fn opening_missing_files_fails() {
    let dir = TempDir::new().unwrap();
    assert!(FitsReader::open_readonly(dir.path().join("nope.fits")).is_err());
}
