//! Pattern rules for pulling disc and track information out of the
//! free-form folder and file names found in the wild.
//!
//! Absence of structure is a normal input here, not an error: every
//! extractor returns "no information" instead of failing when a name
//! does not match.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Separators accepted between a number and the remaining name, plus the
/// clean-name substitutes of `:` and `~` so already-cleaned folders still
/// parse.
const SEPARATORS: &str = r":\-. _~꞉～";

/// Disc information recovered from a folder name. Both fields absent
/// means the name did not look like a disc folder at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscInfo {
    pub number: Option<u32>,
    pub name: Option<String>,
}

fn disc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^[ *]*(?:disc|cd|dvd)?[ *]*([0-9]+)[ *]*(?:[{SEPARATORS}](.*))?$"
        ))
        .unwrap()
    })
}

fn track_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^([0-9]+)\s*[{SEPARATORS}]*\s*(.*)$")).unwrap()
    })
}

/// Extracts a disc number and optional disc name from a folder name.
///
/// Recognized shape: optional spaces/asterisks, an optional keyword out
/// of `disc`/`cd`/`dvd`, digits, then either the end of the name (number
/// only, e.g. `Disc3`) or exactly one separator followed by the disc
/// name. An empty trailing name is treated as absent.
pub fn extract_disc_info(folder_name: &str) -> DiscInfo {
    let Some(caps) = disc_regex().captures(folder_name) else {
        return DiscInfo::default();
    };
    let Ok(number) = caps[1].parse::<u32>() else {
        return DiscInfo::default();
    };
    let name = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    DiscInfo {
        number: Some(number),
        name,
    }
}

/// Leading digit run of the base file name (extension stripped), if any.
pub fn extract_track_number(file_name: &str) -> Option<u32> {
    let stem = file_stem(file_name);
    let caps = track_regex().captures(stem.trim())?;
    caps[1].parse().ok()
}

/// Track title from a file name: the part after the leading digits and
/// separator punctuation, or the whole stem when there are no leading
/// digits. A purely numeric name has no title.
pub fn extract_track_title(file_name: &str) -> Option<String> {
    let stem = file_stem(file_name);
    let stem = stem.trim();
    let title = match track_regex().captures(stem) {
        Some(caps) => caps.get(2).map(|m| m.as_str()).unwrap_or_default().trim().to_string(),
        None => stem.to_string(),
    };
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}
