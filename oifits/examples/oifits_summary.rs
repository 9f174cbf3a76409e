// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! Load an OIFITS file and print a summary of its contents.

use anyhow::{Context, Error};
use clap::{Arg, Command};
use oifits::Container;
use oifits_core::notify::{run_with_notifications, ClapNotificationArgsExt, NotificationBackend};
use oifits_core::on_note;
use std::ffi::OsString;
use std::process;

fn main() {
    let matches = Command::new("oifits_summary")
        .version("0.1.0")
        .about("Summarize the contents of an OIFITS file.")
        .oifits_notify_args()
        .arg(
            Arg::new("PATH")
                .help("The path to the OIFITS file")
                .value_parser(clap::value_parser!(OsString))
                .required(true)
                .index(1),
        )
        .get_matches();

    process::exit(run_with_notifications(matches, |matches, nb| -> Result<i32, Error> {
        let path = matches
            .get_one::<OsString>("PATH")
            .context("no path given")?;

        inner(path, nb)
    }));
}

fn inner(path: &OsString, nb: &mut dyn NotificationBackend) -> Result<i32, Error> {
    let data = Container::read(path, nb)
        .with_context(|| format!("failed to load {}", path.to_string_lossy()))?;

    on_note!(
        nb,
        "loaded {} measurement tables",
        data.vis().len() + data.vis2().len() + data.t3().len() + data.spectra().len()
    );

    data.print_summary();

    if data.is_oifits_two() {
        println!("\nConforms to OIFITS version 2.");
    } else if data.is_oifits_one() {
        println!("\nConforms to OIFITS version 1.");
    } else {
        println!("\nMixes table revisions from both versions of OIFITS.");
    }

    Ok(0)
}
