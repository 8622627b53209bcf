// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! `elfdump [-c CONFIG] [-x DIR] [-o OUTPUT] <input>`
//!
//! Prints the headers and segments of an ELF file. With `-x`, each segment's
//! contents are also saved to DIR; with `-o`, the file is written back out
//! to OUTPUT with its segments laid out again.

mod config;
mod logger;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use log::{debug, error};

use elfsplice::dump::{self, Dumpable};
use elfsplice::ElfFile;

use config::Config;

struct Args {
    input:    PathBuf,
    config:   Option<PathBuf>,
    extract:  Option<PathBuf>,
    output:   Option<PathBuf>,
}

fn usage(prog: &str) -> ! {
    eprintln!("usage: {} [-c CONFIG] [-x DIR] [-o OUTPUT] <input>", prog);
    process::exit(2);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("elfdump");

    let mut input = None;
    let mut config = None;
    let mut extract = None;
    let mut output = None;

    let mut it = args.iter().skip(1);
    while let Some(arg) = it.next() {
        let slot = match arg.as_str() {
            "-c" => &mut config,
            "-x" => &mut extract,
            "-o" => &mut output,
            "-h" | "--help" => usage(prog),
            _ if input.is_none() => {
                input = Some(PathBuf::from(arg));
                continue;
            },
            _ => usage(prog),
        };
        match it.next() {
            Some(value) => *slot = Some(PathBuf::from(value)),
            None => usage(prog),
        }
    }

    match input {
        Some(input) => Args { input: input, config: config, extract: extract, output: output },
        None => usage(prog),
    }
}

fn run(args: Args, config: Config) -> elfsplice::ElfResult<()> {
    let file = ElfFile::read(&args.input)?;

    let stdout = io::stdout();
    file.dump_with(&mut stdout.lock(), config.absent_glyph)?;

    if let Some(dir) = args.extract.or(config.extract_dir) {
        for path in dump::extract_segments(&file, &dir)? {
            debug!("wrote {}", path.display());
        }
    }

    if let Some(output) = args.output {
        file.write(&output)?;
        let rewritten = ElfFile::read(&output)?;
        debug!("re-read {} segments from {}", rewritten.segments().len(), output.display());
        if log::log_enabled!(log::Level::Debug) {
            rewritten.dump(&mut io::stderr())?;
        }
    }

    Ok(())
}

fn main() {
    let args = parse_args();

    if let Err(e) = logger::init(log::LevelFilter::Info) {
        eprintln!("could not set up logging: {}", e);
    }

    let config = match args.config {
        Some(ref path) => match Config::read(path) {
            Ok(c) => c,
            Err(e) => {
                error!("config: {}", e);
                process::exit(1);
            },
        },
        None => Config::default(),
    };
    log::set_max_level(config.log_level);

    if let Err(e) = run(args, config) {
        error!("{}", e);
        process::exit(1);
    }
}
