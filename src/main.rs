#![recursion_limit = "1024"] // for error_chain

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate clap;
extern crate atty;
extern crate cgmath;
extern crate png as pnglib;
extern crate termcolor;

#[macro_use]
mod errors;
#[macro_use]
mod util;
mod extract;
mod info;
mod logger;
mod png;
mod pose;
mod primitives;
mod skeleton;
mod studio;
mod version;

use clap::ArgMatches;
use log::Level;
use std::process::exit;

fn main() {
    let app = clap_app!(hlmdl =>
        (@setting SubcommandRequiredElseHelp)
        (@setting VersionlessSubcommands)
        (version: crate_version!())
        (about: "Inspect GoldSrc studio models (.mdl)")
        (@arg VERBOSE: -v --verbose +multiple +global "Log more (repeat for even more)")
        (@subcommand info =>
            (about: "Print what's in a model")
            (alias: "i")
            (@arg INPUT: +required "MDL file")
        )
        (@subcommand extract =>
            (about: "Save a model's textures as PNGs")
            (alias: "x")
            (@arg INPUT: +required "MDL file")
            (@arg OUTPUT: -o --output +takes_value +required "Output directory (will be created)")
        )
        (@subcommand pose =>
            (about: "Print the bone matrices of a sequence at some time")
            (alias: "p")
            (@arg INPUT: +required "MDL file")
            (@arg SEQUENCE: -s --sequence +takes_value "Sequence name or index (default: 0)")
            (@arg TIME: -t --time +takes_value "Seconds from the start of the sequence (default: 0)")
        )
        (@subcommand version =>
            (about: "Print version info")
        )
    );
    let matches = app.get_matches();

    let (subcmd, sub_matches) = matches.subcommand();
    logger::init(log_level(&matches, sub_matches));

    let res = match (subcmd, sub_matches) {
        ("info", Some(m)) => info::main(m),
        ("extract", Some(m)) => extract::main(m),
        ("pose", Some(m)) => pose::main(m),
        ("version", _) => {
            version::print_version_info();
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = res {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        exit(1);
    }
}

/// `-v` can come before or after the subcommand.
fn log_level(matches: &ArgMatches, sub_matches: Option<&ArgMatches>) -> Level {
    let count = matches.occurrences_of("VERBOSE")
        + sub_matches.map(|m| m.occurrences_of("VERBOSE")).unwrap_or(0);
    match count {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    }
}
