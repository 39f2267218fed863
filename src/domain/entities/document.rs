//! Parsed structured documents
//!
//! YAML is parsed with `serde_yaml_ng`, which keeps custom tags such as
//! `!secret` as `Value::Tagged`, so references can be read straight off the
//! document instead of being pattern-matched out of raw text.

use serde_yaml_ng::Value as YamlValue;

use super::reference::{Location, Reference, ReferenceKind};

/// Top-level shape of a structured document
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Mapping,
    Sequence,
    Scalar,
    Empty,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Shape::Mapping => "mapping",
            Shape::Sequence => "sequence",
            Shape::Scalar => "scalar",
            Shape::Empty => "empty document",
        };
        f.write_str(s)
    }
}

/// A successfully parsed structured file
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Yaml(YamlValue),
    Json(serde_json::Value),
}

/// Why a structured file failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Document {
    pub fn parse_yaml(text: &str) -> Result<Self, ParseFailure> {
        serde_yaml_ng::from_str::<YamlValue>(text)
            .map(Document::Yaml)
            .map_err(|e| {
                let location = e.location();
                ParseFailure {
                    message: e.to_string(),
                    line: location.as_ref().map(|l| l.line()),
                    column: location.as_ref().map(|l| l.column()),
                }
            })
    }

    pub fn parse_json(text: &str) -> Result<Self, ParseFailure> {
        serde_json::from_str::<serde_json::Value>(text)
            .map(Document::Json)
            .map_err(|e| ParseFailure {
                message: e.to_string(),
                line: Some(e.line()),
                column: Some(e.column()),
            })
    }

    pub fn shape(&self) -> Shape {
        match self {
            Document::Yaml(value) => yaml_shape(value),
            Document::Json(value) => match value {
                serde_json::Value::Null => Shape::Empty,
                serde_json::Value::Object(_) => Shape::Mapping,
                serde_json::Value::Array(_) => Shape::Sequence,
                _ => Shape::Scalar,
            },
        }
    }

    /// Keys of a top-level mapping, in document order. Empty for other shapes.
    pub fn top_level_keys(&self) -> Vec<String> {
        match self {
            Document::Yaml(value) => match untag(value) {
                YamlValue::Mapping(map) => map.keys().filter_map(scalar_text).collect(),
                _ => Vec::new(),
            },
            Document::Json(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            Document::Json(_) => Vec::new(),
        }
    }

    /// Extract every reference tag, locating each one in `text`.
    pub fn references(&self, text: &str) -> Vec<Reference> {
        let Document::Yaml(value) = self else {
            return Vec::new();
        };

        let mut found = Vec::new();
        collect_references(value, &mut Vec::new(), &mut found);

        let mut seen: Vec<(String, String)> = Vec::new();
        found
            .into_iter()
            .map(|(kind, target, key_path)| {
                let tag = kind.tag();
                let nth = seen
                    .iter()
                    .filter(|(t, g)| t == tag && *g == target)
                    .count();
                seen.push((tag.to_string(), target.clone()));
                let (line, column) = locate_tag(text, tag, &target, nth);
                Reference::new(
                    kind,
                    target,
                    Location::at_key(key_path)
                        .with_line(line)
                        .with_column(column),
                )
            })
            .collect()
    }

    /// Plain-string values stored under any of `keys`, anywhere in the document.
    ///
    /// Tagged values (`!secret`, `!env_var`) are never returned.
    pub fn plain_values_for(&self, keys: &[&str]) -> Vec<(String, String, String)> {
        let mut out = Vec::new();
        if let Document::Yaml(value) = self {
            collect_plain_values(value, keys, &mut Vec::new(), &mut out);
        }
        out
    }
}

fn yaml_shape(value: &YamlValue) -> Shape {
    match untag(value) {
        YamlValue::Null => Shape::Empty,
        YamlValue::Mapping(_) => Shape::Mapping,
        YamlValue::Sequence(_) => Shape::Sequence,
        _ => Shape::Scalar,
    }
}

fn untag(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Render a scalar as text (strings, numbers, booleans).
pub(crate) fn scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

fn render_key_path(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Segment::Index(i) => out.push_str(&format!("[{}]", i)),
        }
    }
    out
}

fn collect_references(
    value: &YamlValue,
    path: &mut Vec<Segment>,
    out: &mut Vec<(ReferenceKind, String, String)>,
) {
    match value {
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            match ReferenceKind::from_tag(&tag) {
                Some(ReferenceKind::EnvVar { .. }) => {
                    let arg = scalar_text(&tagged.value).unwrap_or_default();
                    let mut parts = arg.split_whitespace();
                    let name = parts.next().unwrap_or_default().to_string();
                    let has_default = parts.next().is_some();
                    out.push((
                        ReferenceKind::EnvVar { has_default },
                        name,
                        render_key_path(path),
                    ));
                }
                Some(kind) => {
                    let arg = scalar_text(&tagged.value).unwrap_or_default();
                    out.push((kind, arg.trim().to_string(), render_key_path(path)));
                }
                None => collect_references(&tagged.value, path, out),
            }
        }
        YamlValue::Mapping(map) => {
            for (key, child) in map {
                path.push(Segment::Key(scalar_text(key).unwrap_or_else(|| "?".into())));
                collect_references(child, path, out);
                path.pop();
            }
        }
        YamlValue::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                collect_references(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn collect_plain_values(
    value: &YamlValue,
    keys: &[&str],
    path: &mut Vec<Segment>,
    out: &mut Vec<(String, String, String)>,
) {
    match value {
        YamlValue::Mapping(map) => {
            for (key, child) in map {
                let key_text = scalar_text(key).unwrap_or_else(|| "?".into());
                path.push(Segment::Key(key_text.clone()));
                match child {
                    YamlValue::String(s) if keys.contains(&key_text.as_str()) => {
                        out.push((render_key_path(path), key_text, s.clone()));
                    }
                    _ => collect_plain_values(child, keys, path, out),
                }
                path.pop();
            }
        }
        YamlValue::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                collect_plain_values(child, keys, path, out);
                path.pop();
            }
        }
        YamlValue::Tagged(tagged) => collect_plain_values(&tagged.value, keys, path, out),
        _ => {}
    }
}

/// Find the `nth` line containing `tag` followed by `target`.
fn locate_tag(text: &str, tag: &str, target: &str, nth: usize) -> (Option<usize>, Option<usize>) {
    let mut hits = 0;
    for (i, line) in text.lines().enumerate() {
        let mut offset = 0;
        while let Some(pos) = line[offset..].find(tag) {
            let start = offset + pos;
            let rest = &line[start + tag.len()..];
            // `!include` is a prefix of `!include_dir_*`; require a word boundary.
            let boundary = rest.chars().next().map_or(true, |c| c.is_whitespace());
            if boundary && rest.trim_start().starts_with(target) {
                if hits == nth {
                    return (Some(i + 1), Some(start + 1));
                }
                hits += 1;
            }
            offset = start + tag.len();
        }
    }
    (None, None)
}

/// Find the first line that defines `key:` as a mapping key.
pub(crate) fn find_key_line(text: &str, key: &str) -> Option<usize> {
    text.lines().enumerate().find_map(|(i, line)| {
        let trimmed = line.trim_start().trim_start_matches("- ");
        trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with(':'))
            .then_some(i + 1)
    })
}
