//! Source generation for solblocks contracts.
//!
//! Renders an ordered component collection into contract source text. The
//! output is deterministic: the same components in the same order always
//! produce the same bytes, which [`GeneratedSource::digest`] makes checkable.
//!
//! # Modules
//!
//! - [`error`] -- Error types for project lookups and option loading
//! - [`render`] -- Per-variant rendering and contract assembly

pub mod error;
pub mod render;

pub use error::CodegenError;
pub use render::{
    generate, generate_source, render_component, render_components, render_contract,
};

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Options controlling the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// The pragma line opening the file.
    pub pragma: String,

    /// SPDX license identifier. `None` omits the license comment.
    pub license: Option<String>,

    /// Indent width in spaces, used for both block and body indentation.
    pub indent: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            pragma: "pragma solidity ^0.8.0;".to_string(),
            license: None,
            indent: 4,
        }
    }
}

impl GeneratorOptions {
    /// Parses an options document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CodegenError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads an options document from disk.
    pub fn load(path: &Path) -> Result<Self, CodegenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Rendered text plus its content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSource {
    pub text: String,
    /// blake3 hex digest of `text`.
    pub digest: String,
}

impl GeneratedSource {
    pub fn new(text: String) -> Self {
        let digest = blake3::hash(text.as_bytes()).to_hex().to_string();
        GeneratedSource { text, digest }
    }
}
