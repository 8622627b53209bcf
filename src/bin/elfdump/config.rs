// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Optional TOML settings for `elfdump`.
//!
//! ```toml
//! log_level = "debug"
//! absent_glyph = "-"
//! extract_dir = "segments"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, LevelFilter};

use elfsplice::dump::DEFAULT_ABSENT_GLYPH;

pub struct Config {
    pub log_level:     LevelFilter,
    pub absent_glyph:  char,
    pub extract_dir:   Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            log_level:     LevelFilter::Info,
            absent_glyph:  DEFAULT_ABSENT_GLYPH,
            extract_dir:   None,
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> Result<Config, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let conf: toml::Table = text.parse()
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Config::load(&conf)
    }

    /// Builds a config from a parsed table. Missing keys fall back to their
    /// defaults; keys of the wrong type are errors.
    pub fn load(conf: &toml::Table) -> Result<Config, String> {
        let mut config = Config::default();

        match conf.get("log_level") {
            Some(toml::Value::String(s)) => {
                config.log_level = s.parse()
                    .map_err(|_| format!("'log_level' has unknown level '{}'", s))?;
            },
            Some(_) => return Err("'log_level' should be a string".to_string()),
            None => info!("'log_level' defaulting to {}", config.log_level),
        }

        match conf.get("absent_glyph") {
            Some(toml::Value::String(s)) => {
                let mut chars = s.chars();
                config.absent_glyph = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err("'absent_glyph' should be a single character".to_string()),
                };
            },
            Some(_) => return Err("'absent_glyph' should be a string".to_string()),
            None => info!("'absent_glyph' defaulting to {:?}", DEFAULT_ABSENT_GLYPH),
        }

        match conf.get("extract_dir") {
            Some(toml::Value::String(s)) => config.extract_dir = Some(PathBuf::from(s)),
            Some(_) => return Err("'extract_dir' should be a string".to_string()),
            None => info!("'extract_dir' not set, segments are only extracted with -x"),
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Mutex, Once};

    use log::{Log, Metadata, Record};

    static NOTES: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct Collect;

    impl Log for Collect {
        fn enabled(&self, _: &Metadata) -> bool { true }

        fn log(&self, record: &Record) {
            NOTES.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    static COLLECT: Collect = Collect;

    fn parse(text: &str) -> Result<Config, String> {
        Config::load(&text.parse::<toml::Table>().unwrap())
    }

    #[test]
    fn test_defaults() {
        let c = parse("").unwrap();
        assert_eq!(c.log_level, LevelFilter::Info);
        assert_eq!(c.absent_glyph, ' ');
        assert!(c.extract_dir.is_none());
    }

    #[test]
    fn test_defaults_are_noted() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&COLLECT).unwrap();
            log::set_max_level(LevelFilter::Info);
        });

        parse("").unwrap();

        let notes = NOTES.lock().unwrap();
        for key in &["'log_level'", "'absent_glyph'", "'extract_dir'"] {
            assert!(notes.iter().any(|n| n.starts_with(key)), "no note for {}", key);
        }
    }

    #[test]
    fn test_values() {
        let c = parse("log_level = \"trace\"\nabsent_glyph = \"-\"\nextract_dir = \"out\"\n").unwrap();
        assert_eq!(c.log_level, LevelFilter::Trace);
        assert_eq!(c.absent_glyph, '-');
        assert_eq!(c.extract_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_wrong_types() {
        assert!(parse("log_level = 3").is_err());
        assert!(parse("log_level = \"loud\"").is_err());
        assert!(parse("absent_glyph = \"ab\"").is_err());
        assert!(parse("extract_dir = false").is_err());
    }
}
