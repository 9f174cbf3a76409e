// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Summarize the structure of a FITS file, listing each HDU and the columns
//! of any binary tables.

use anyhow::{Context, Error};
use clap::{Arg, Command};
use oifits_fits::{FitsReader, HduKind};
use std::ffi::OsString;
use std::process;

fn main() {
    let matches = Command::new("fitssummary")
        .version("0.1.0")
        .about("Summarize the structure of a FITS file.")
        .arg(
            Arg::new("PATH")
                .help("The path to the FITS file")
                .value_parser(clap::value_parser!(OsString))
                .required(true)
                .index(1),
        )
        .get_matches();

    let path = match matches.get_one::<OsString>("PATH") {
        Some(p) => p.clone(),
        None => process::exit(1),
    };

    process::exit(match inner(&path) {
        Ok(code) => code,

        Err(e) => {
            println!("fatal error while processing {}", path.to_string_lossy());
            for cause in e.chain() {
                println!("  caused by: {cause}");
            }
            1
        }
    });
}

fn inner(path: &OsString) -> Result<i32, Error> {
    let mut fits = FitsReader::open_readonly(path).context("error opening file")?;
    let n_hdus = fits.hdus().len();

    for num in 0..n_hdus {
        let hdu = &fits.hdus()[num];
        let extname_display = if num == 0 { "(primary)" } else { hdu.extname() };

        println!("HDU #{}: {:?} {}", num, hdu.kind(), extname_display);
        println!("    bitpix: {:?}", hdu.bitpix());

        let (gcount, pcount, naxis) = hdu.shape();
        println!("    shape: {naxis:?} pcount={pcount} gcount={gcount}");

        if hdu.kind() == HduKind::BinaryTableExtension {
            let table = fits
                .read_bintable(num)
                .with_context(|| format!("error decoding binary table in HDU #{num}"))?;

            for col in table.columns() {
                println!("    column {}: {}", col.name, col.tform());
            }
        }
    }

    Ok(0)
}
