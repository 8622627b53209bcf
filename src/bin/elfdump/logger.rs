// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! A colored console logger, writing to stderr so dumps on stdout stay clean.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

const RED: &str = "41m";
const YELLOW: &str = "43m";
const CYAN: &str = "44m";
const WHITE: &str = "47m";
const GREEN: &str = "42m";

const TEXT: &str = "\x1b[30m";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        const ESC: &str = "\x1b[";
        const RESET: &str = "\x1b[0m";
        let (letter, color_code) = match record.level() {
            Level::Error => ('E', RED),
            Level::Warn => ('W', YELLOW),
            Level::Info => ('I', GREEN),
            Level::Debug => ('D', CYAN),
            Level::Trace => ('T', WHITE),
        };

        let loc = record.module_path().unwrap_or("");
        let idx = match loc.rfind("::") {
            Some(i) => i + 2,
            None => 0,
        };

        eprintln!("{}{}{} {} {} {:<8} {}", ESC, color_code, TEXT, letter, RESET, &loc[idx..], record.args());
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
