use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TAGS_MARKER: &str = "tags:";
pub const CREATED_MARKER: &str = "created:";
pub const PROPERTY_PREFIX: &str = "  - ";
pub const CREATED_FMT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unable to read note {}: {}", .path.display(), .source)]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("unable to stat note {}: {}", .path.display(), .source)]
    Stat { path: PathBuf, source: io::Error },
    #[error("malformed created timestamp {value:?} in {file} (expected YYYY-MM-DD HH:MM)")]
    MalformedTimestamp {
        file: String,
        value: String,
        source: chrono::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub file_name: String,
    pub display_name: String,
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl Note {
    pub fn from_raw(
        raw: &str,
        file_name: &str,
        fallback: NaiveDateTime,
    ) -> Result<Note, ExtractError> {
        let created_at = match find_created_at(raw, file_name)? {
            Some(ts) => ts,
            None => fallback,
        };
        Ok(Note {
            file_name: file_name.to_string(),
            display_name: display_name(file_name),
            tags: find_tags(raw),
            created_at,
        })
    }

    pub fn from_path(path: &Path) -> Result<Note, ExtractError> {
        let raw = fs::read_to_string(path).map_err(|source| ExtractError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let created_at = match find_created_at(&raw, &file_name)? {
            Some(ts) => ts,
            None => modified_time(path)?,
        };
        Ok(Note {
            display_name: display_name(&file_name),
            tags: find_tags(&raw),
            file_name,
            created_at,
        })
    }
}

pub fn find_tags(raw: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut in_block = false;
    for line in raw.lines() {
        if !in_block {
            in_block = line.contains(TAGS_MARKER);
            continue;
        }
        match line.strip_prefix(PROPERTY_PREFIX) {
            Some(value) => tags.push(value.to_string()),
            None => break,
        }
    }
    tags
}

pub fn find_created_at(
    raw: &str,
    file_name: &str,
) -> Result<Option<NaiveDateTime>, ExtractError> {
    let mut marker_found = false;
    for line in raw.lines() {
        if !marker_found {
            marker_found = line.contains(CREATED_MARKER);
            continue;
        }
        if let Some(value) = line.strip_prefix(PROPERTY_PREFIX) {
            let ts = NaiveDateTime::parse_from_str(value, CREATED_FMT).map_err(|source| {
                ExtractError::MalformedTimestamp {
                    file: file_name.to_string(),
                    value: value.to_string(),
                    source,
                }
            })?;
            return Ok(Some(ts));
        }
    }
    Ok(None)
}

fn display_name(file_name: &str) -> String {
    file_name.strip_suffix(".md").unwrap_or(file_name).to_string()
}

pub(crate) fn modified_time(path: &Path) -> Result<NaiveDateTime, ExtractError> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| ExtractError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}
