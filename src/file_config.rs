//! INI configuration for [`CallerAnnotator`](crate::CallerAnnotator).
//!
//! Settings live in a `[caller]` section:
//!
//! ```ini
//! [caller]
//! level = INFO
//! shorten_paths = false
//! source_root = /srv/app
//! skip = 0
//! depth = 32
//! internal_paths = vendor/logging/, generated/
//! internal_modules = app::telemetry::
//! ```
//!
//! Only `level` is required. `internal_paths` and `internal_modules` extend
//! the default internal-frame rules rather than replacing them. The parsed
//! settings are returned as a [`CallerAnnotatorBuilder`], so callers can
//! still adjust them before calling
//! [`build`](CallerAnnotatorBuilder::build).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::caller::{CallerAnnotator, CallerAnnotatorBuilder};
use crate::frame_filter::InternalFrames;
use crate::level::FemtoLevel;

/// Section holding the annotator settings.
pub const CALLER_SECTION: &str = "caller";

/// Errors raised while loading annotator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} doesn't exist")]
    MissingFile(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid INI: {0}")]
    Parse(String),
    #[error("missing [{0}] section")]
    MissingSection(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Read and parse the annotator configuration stored at `path`.
pub fn load_annotator_config(path: impl AsRef<Path>) -> Result<CallerAnnotatorBuilder, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigError::MissingFile(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    parse_annotator_config(&text)
}

/// Parse annotator configuration from INI text.
pub fn parse_annotator_config(text: &str) -> Result<CallerAnnotatorBuilder, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
    let section = ini
        .section(Some(CALLER_SECTION))
        .ok_or(ConfigError::MissingSection(CALLER_SECTION))?;

    let level = required(section, "level")?;
    let mut builder = CallerAnnotator::builder(parse_value("level", level)?);

    if let Some(shorten) = section.get("shorten_paths") {
        builder = builder.shorten_paths(parse_bool("shorten_paths", shorten)?);
    }
    if let Some(root) = section.get("source_root") {
        builder = builder.source_root(root.trim());
    }
    if let Some(skip) = section.get("skip") {
        builder = builder.skip(parse_value("skip", skip)?);
    }
    if let Some(depth) = section.get("depth") {
        builder = builder.depth(parse_value("depth", depth)?);
    }

    let paths = section.get("internal_paths").map(split_list).unwrap_or_default();
    let modules = section.get("internal_modules").map(split_list).unwrap_or_default();
    if !paths.is_empty() || !modules.is_empty() {
        let internal = paths
            .into_iter()
            .fold(InternalFrames::default(), InternalFrames::with_path);
        let internal = modules.into_iter().fold(internal, InternalFrames::with_module);
        builder = builder.internal_frames(internal);
    }
    Ok(builder)
}

fn required<'a>(section: &'a Properties, key: &'static str) -> Result<&'a str, ConfigError> {
    section.get(key).ok_or_else(|| ConfigError::InvalidValue {
        key,
        value: String::new(),
        reason: "missing required key".into(),
    })
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: "expected a boolean".into(),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
