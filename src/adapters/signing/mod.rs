//! Signing adapters - HMAC file URL signer.

mod hmac_signer;

pub use hmac_signer::HmacFileUrlSigner;
