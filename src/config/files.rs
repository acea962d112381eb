//! Signed file URL configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for signed file URLs embedded in message payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Public base URL that file paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HMAC key used to sign file URLs
    pub secret_key: String,

    /// Lifetime of a signed URL in seconds
    #[serde(default = "default_signature_ttl")]
    pub signature_ttl_secs: u64,
}

impl FilesConfig {
    /// Validate file URL configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("FILES secret key"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidFilesBaseUrl);
        }
        if self.signature_ttl_secs == 0 || self.signature_ttl_secs > 86_400 {
            return Err(ValidationError::InvalidSignatureTtl);
        }
        Ok(())
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            signature_ttl_secs: default_signature_ttl(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_signature_ttl() -> u64 {
    300
}
