//! Loading the flat key/value configuration file.
//!
//! The native format is `key=value` properties text. A file with a `.toml`
//! extension is read with the `toml` crate and its tables are flattened into
//! dotted keys, so `[move] mk = "Y"` and `move.mk=Y` mean the same thing.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::flag::{is_true, UNSET};

pub const DEFAULT_CONFIG_FILE: &str = "catfetch.properties";

/// Immutable string-keyed settings of one job run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stage-flag lookup; an absent key reads as the [`UNSET`] placeholder.
    pub fn flag(&self, key: &str) -> bool {
        is_true(self.get(key).unwrap_or(UNSET))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// `$XDG_CONFIG_HOME/catfetch/catfetch.properties`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("catfetch")?;
    Ok(xdg_dirs
        .get_config_home()
        .join("catfetch")
        .join(DEFAULT_CONFIG_FILE))
}

/// Read and parse the config file at `path`.
///
/// Properties files that are not valid UTF-8 are read as ISO-8859-1, the
/// classic encoding of such files. TOML must be UTF-8.
pub fn load_from_path(path: &Path) -> Result<Properties, ConfigError> {
    let read_error = |source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_error)?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if !is_toml {
        return Ok(parse_properties(&decode_properties(bytes)));
    }

    let text = String::from_utf8(bytes)
        .map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let table: toml::Table = text.parse().map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    let mut entries = BTreeMap::new();
    flatten_toml("", &table, &mut entries);
    Ok(Properties { entries })
}

fn decode_properties(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        // Every Latin-1 byte is the code point of the same value.
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

fn flatten_toml(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_toml(&key, inner, out),
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
}

/// Parse properties text: `#`/`!` comments, `=`, `:` or whitespace between
/// key and value, backslash escapes and line continuations. Leading
/// whitespace of a value is dropped, trailing whitespace is kept. Later
/// duplicates win.
pub fn parse_properties(text: &str) -> Properties {
    let mut entries = BTreeMap::new();
    let mut lines = text.lines();

    while let Some(first) = lines.next() {
        let mut logical = first.trim_start_matches(is_blank).to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        entries.insert(unescape(key), unescape(value));
    }

    Properties { entries }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// A line continues when it ends in an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(after) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = after.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
