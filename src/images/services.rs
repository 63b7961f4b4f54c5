use std::path::Path;

use anyhow::Context;
use bytes::Bytes;

use crate::error::ApiError;
use crate::images::dto::RecognizedFoodCandidate;

/// Image bytes ready for `POST /image/analyze`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub body: Bytes,
    pub file_name: String,
    pub content_type: &'static str,
}

impl ImageUpload {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let body = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
        anyhow::ensure!(!body.is_empty(), "image {} is empty", path.display());
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_ext)
            .unwrap_or("application/octet-stream");
        Ok(Self {
            body: Bytes::from(body),
            file_name,
            content_type,
        })
    }
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Decodes the analysis text: a JSON array of candidates, possibly wrapped
/// in a markdown code fence.
pub fn parse_candidates(raw: &str) -> Result<Vec<RecognizedFoodCandidate>, ApiError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| ApiError::Parse(format!("image analysis: {e}")))
}

fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}
