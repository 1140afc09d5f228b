//! File manifests extracted from model output.
//!
//! Models are asked for `{"files": [{"path": ..., "content": ...}]}` but
//! rarely answer with bare JSON. Extraction runs an ordered list of pure
//! strategies and takes the first one that yields a JSON object.

use serde_json::Value;

use crate::domain::{DomainError, RelativePath};

/// Longest response snippet carried in a parse error.
pub const SNIPPET_LEN: usize = 200;

/// One extraction strategy: text in, JSON object out (or nothing).
pub type ExtractStrategy = fn(&str) -> Option<Value>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, ExtractStrategy)] = &[
    ("whole", parse_whole),
    ("json_fence", parse_json_fenced),
    ("fenced", parse_fenced),
    ("braces", parse_braces),
];

/// A single file the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileManifestEntry {
    pub path: RelativePath,
    pub content: String,
}

/// Validated, ordered list of files to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileManifest {
    entries: Vec<FileManifestEntry>,
}

impl FileManifest {
    /// Extract and validate a manifest from raw model output.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let value = extract_json(text)?;
        Self::from_value(&value)
    }

    /// Validate an already-decoded manifest object.
    ///
    /// Every entry is checked before anything is returned, so a bad path
    /// late in the list still prevents all writes.
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        let files = match value.get("files") {
            Some(Value::Array(files)) if !files.is_empty() => files,
            _ => return Err(DomainError::EmptyManifest),
        };

        let entries = files
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FileManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FileManifestEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(index: usize, entry: &Value) -> Result<FileManifestEntry, DomainError> {
    let invalid = |reason: &str| DomainError::InvalidManifestEntry {
        index,
        reason: reason.to_string(),
    };

    let object = entry.as_object().ok_or_else(|| invalid("entry is not an object"))?;

    let raw_path = object
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing string field 'path'"))?;

    let content = match object.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(content)) => content.clone(),
        Some(_) => return Err(invalid("field 'content' is not a string")),
    };

    let path = RelativePath::try_new(raw_path).map_err(|err| match err {
        DomainError::UnsafeManifestPath { .. } => err,
        _ => invalid("field 'path' is empty"),
    })?;

    Ok(FileManifestEntry { path, content })
}

/// Run every strategy in order and return the first JSON object found.
pub fn extract_json(text: &str) -> Result<Value, DomainError> {
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(text) {
            tracing::trace!(strategy = name, "extracted manifest JSON");
            return Ok(value);
        }
    }

    Err(DomainError::ManifestParse {
        reason: failure_reason(text),
        snippet: snippet(text),
    })
}

/// Strategy 1: the whole response is the JSON object.
pub fn parse_whole(text: &str) -> Option<Value> {
    parse_object(text.trim())
}

/// Strategy 2: the first ```` ```json ```` block holds the JSON object.
///
/// Tried before plain fences so an earlier code sample in another language
/// does not hide the manifest.
pub fn parse_json_fenced(text: &str) -> Option<Value> {
    let open = text.find("```json")?;
    let body = &text[open + "```json".len()..];
    let close = body.find("```")?;

    parse_object(body[..close].trim())
}

/// Strategy 3: the first fenced code block holds the JSON object.
///
/// The opening fence may carry any language tag.
pub fn parse_fenced(text: &str) -> Option<Value> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n').map_or(0, |newline| newline + 1);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;

    parse_object(body[..close].trim())
}

/// Strategy 4: everything from the first `{` to the last `}`.
pub fn parse_braces(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&text[start..=end])
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn failure_reason(text: &str) -> String {
    let Some(start) = text.find('{') else {
        return "no JSON object found in the response".into();
    };
    let end = text.rfind('}').filter(|end| *end >= start);
    let candidate = end.map_or(&text[start..], |end| &text[start..=end]);

    match serde_json::from_str::<Value>(candidate) {
        Err(err) => err.to_string(),
        Ok(_) => "response JSON is not an object".into(),
    }
}

/// Up to [`SNIPPET_LEN`] characters starting at the first `{`, or from the
/// start when there is none.
pub fn snippet(text: &str) -> String {
    let from = text.find('{').map_or(text, |start| &text[start..]);
    from.chars().take(SNIPPET_LEN).collect()
}
