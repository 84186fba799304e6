//! Model discovery.
//!
//! Model names rotate on the service side, so hardcoding one breaks
//! installs with older or regional keys. Resolution runs once before the
//! pipeline starts: list the models visible to this key, prefer the flash
//! family, fall back to anything that can generate content. The result is
//! an immutable identifier; failure here is a configuration error, never a
//! per-call condition.

use serde::Deserialize;

use super::http_client::api_client;
use crate::error::{Error, Result};

/// Model family preferred for review runs: fast and cheap enough to send a
/// whole manuscript through in chunks.
const PREFERRED_FAMILY: &str = "gemini-1.5-flash";

const GENERATE_METHOD: &str = "generateContent";

/// A resolved model identifier in the service's `models/<name>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId(String);

impl ModelId {
    /// Accepts either a bare name or the full `models/<name>` form.
    pub fn new(name: &str) -> Self {
        if name.starts_with("models/") {
            Self(name.to_string())
        } else {
            Self(format!("models/{}", name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
    #[serde(default, rename = "supportedGenerationMethods")]
    supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_METHOD)
    }
}

/// Resolve the model to use for a run.
///
/// An explicit `preferred` name short-circuits discovery. Otherwise the
/// listing endpoint is probed once; no usable model is a fatal
/// configuration error.
pub async fn resolve_model(api_key: &str, preferred: Option<&str>) -> Result<ModelId> {
    if let Some(name) = preferred {
        let id = ModelId::new(name);
        tracing::info!("[Models] Using configured model {}", id);
        return Ok(id);
    }

    let response = api_client()
        .get("https://generativelanguage.googleapis.com/v1beta/models")
        .header("x-goog-api-key", api_key)
        .send()
        .await
        .map_err(|e| Error::Config(format!("model listing failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Config(format!(
            "model listing failed ({}): {}",
            status, body
        )));
    }

    let listing: ModelList = response
        .json()
        .await
        .map_err(|e| Error::Config(format!("unreadable model listing: {}", e)))?;

    let selected = select_model(&listing.models).ok_or_else(|| {
        Error::Config("no model supporting content generation is available for this API key".into())
    })?;

    tracing::info!("[Models] Resolved model {}", selected.name);
    Ok(ModelId::new(&selected.name))
}

/// Selection policy: first flash-family model that can generate content,
/// else the first model that can, in listing order.
fn select_model(models: &[ModelInfo]) -> Option<&ModelInfo> {
    models
        .iter()
        .find(|m| m.name.contains(PREFERRED_FAMILY) && m.supports_generation())
        .or_else(|| models.iter().find(|m| m.supports_generation()))
}
