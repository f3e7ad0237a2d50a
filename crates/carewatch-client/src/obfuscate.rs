//! Encodings for the caregiver id passed to the relationship lookup.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use carewatch_core::service::IdObfuscator;
use serde::Deserialize;

/// Sends the id as its decimal string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainIds;

impl IdObfuscator for PlainIds {
  fn obfuscate(&self, id: u64) -> String { id.to_string() }
}

/// Sends the decimal id as URL-safe, unpadded base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Ids;

impl IdObfuscator for Base64Ids {
  fn obfuscate(&self, id: u64) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
  }
}

/// Config-selectable obfuscation scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdEncoding {
  Plain,
  #[default]
  Base64,
}

impl IdEncoding {
  pub fn obfuscator(self) -> Arc<dyn IdObfuscator> {
    match self {
      Self::Plain => Arc::new(PlainIds),
      Self::Base64 => Arc::new(Base64Ids),
    }
  }
}
