use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, ValueStruct)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(s: &str) -> Result<Self, String> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err("Language code must not be empty".to_string());
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("Invalid language code: {}", s));
        }
        Ok(LanguageCode(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ValueStruct)]
#[serde(transparent)]
pub struct RequestId(String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub confidence: Option<f32>,
}

impl RecognizedLine {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognizedPage {
    pub lines: Vec<RecognizedLine>,
}

impl RecognizedPage {
    pub fn new(lines: Vec<RecognizedLine>) -> Self {
        Self { lines }
    }
}

/// Joins every recognized line of every page, keeping the order reported by the engine.
pub fn join_recognized_lines(pages: &[RecognizedPage]) -> String {
    pages
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.text.as_str())
        .collect::<Vec<&str>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSizeLimit {
    pub bytes: usize,
}

impl MessageSizeLimit {
    pub const DEFAULT_BYTES: usize = 20 * 1024 * 1024;

    pub fn new(bytes: usize) -> Self {
        assert!(bytes > 0, "Message size limit should be more than zero");
        Self { bytes }
    }
}

impl Default for MessageSizeLimit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BYTES)
    }
}

impl FromStr for MessageSizeLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let index = s.find(|c: char| !c.is_numeric()).unwrap_or(s.len());
        let (number, unit) = s.split_at(index);
        let value = number
            .parse::<usize>()
            .map_err(|e| format!("Failed to parse number in MessageSizeLimit: {}", e))?;
        let multiplier = match unit.trim().to_lowercase().as_str() {
            "" | "b" => 1,
            "kb" | "kib" => 1024,
            "mb" | "mib" => 1024 * 1024,
            unknown => return Err(format!("Unknown unit specified: {}", unknown)),
        };
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Message size limit is too large: {}", s))?;
        if bytes == 0 {
            return Err("Message size limit should be more than zero".to_string());
        }
        Ok(MessageSizeLimit::new(bytes))
    }
}
