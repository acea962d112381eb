//! HMAC-SHA256 implementation of FileUrlSigner.
//!
//! Signed URLs carry `timestamp`, `nonce`, and `sign` query parameters:
//!
//! ```text
//! <base>/files/<id>/preview?timestamp=1700000000&nonce=<uuid>&sign=<hex>
//! ```
//!
//! The signature covers `file-access|<path>|<timestamp>|<nonce>` and is
//! compared in constant time on verification.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::FilesConfig;
use crate::ports::FileUrlSigner;

type HmacSha256 = Hmac<Sha256>;

/// Clock skew tolerated for timestamps from the future.
const MAX_FUTURE_TOLERANCE_SECS: u64 = 60;

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// HMAC-SHA256 file URL signer.
#[derive(Clone)]
pub struct HmacFileUrlSigner {
    base_url: String,
    files_prefix: String,
    secret: Secret<String>,
    ttl_secs: u64,
}

impl HmacFileUrlSigner {
    /// Creates a signer for the given base URL and signing key.
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>, ttl_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let files_prefix = format!("{}/files/", base_url);
        Self {
            base_url,
            files_prefix,
            secret: Secret::new(secret_key.into()),
            ttl_secs,
        }
    }

    /// Creates a signer from the files configuration section.
    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.secret_key.clone(),
            config.signature_ttl_secs,
        )
    }

    fn signature(&self, path: &str, timestamp: u64, nonce: &str) -> String {
        let payload = format!("file-access|{}|{}|{}", path, timestamp, nonce);
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    fn sign_at(&self, path: &str, timestamp: u64) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let sign = self.signature(path, timestamp, &nonce);
        format!(
            "{}{}?timestamp={}&nonce={}&sign={}",
            self.base_url, path, timestamp, nonce, sign
        )
    }

    /// Verifies a signature against an explicit current time.
    pub fn verify_at(
        &self,
        path: &str,
        timestamp: u64,
        nonce: &str,
        sign: &str,
        now: u64,
    ) -> bool {
        let expected = self.signature(path, timestamp, nonce);
        if expected.as_bytes().ct_eq(sign.as_bytes()).unwrap_u8() != 1 {
            return false;
        }
        if timestamp > now + MAX_FUTURE_TOLERANCE_SECS {
            return false;
        }
        now.saturating_sub(timestamp) <= self.ttl_secs
    }

    /// Verifies a signature against the current time.
    pub fn verify(&self, path: &str, timestamp: u64, nonce: &str, sign: &str) -> bool {
        self.verify_at(path, timestamp, nonce, sign, now_secs())
    }
}

impl FileUrlSigner for HmacFileUrlSigner {
    fn sign(&self, path: &str) -> String {
        self.sign_at(path, now_secs())
    }

    fn refresh(&self, url: &str) -> Option<String> {
        if !url.starts_with(&self.files_prefix) {
            return None;
        }
        let without_query = url.split('?').next().unwrap_or(url);
        let path = &without_query[self.base_url.len()..];
        Some(self.sign(path))
    }

    fn files_prefix(&self) -> &str {
        &self.files_prefix
    }
}
