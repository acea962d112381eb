//! Signed file URL port and embedded-URL refresh helpers.
//!
//! File URLs handed out in message payloads are signed with a short
//! lifetime. Messages can be listed long after they were produced, so
//! the projection refreshes any signed URL embedded in an answer or in
//! the prompt inputs before returning it.

use serde_json::Value;

/// Signer port for time-limited file URLs.
pub trait FileUrlSigner: Send + Sync {
    /// Returns an absolute signed URL for a file path such as
    /// `/files/<id>/preview`.
    fn sign(&self, path: &str) -> String;

    /// Re-signs a URL previously issued by this signer.
    ///
    /// Returns `None` when the URL was not issued by this signer; the
    /// caller leaves such URLs untouched.
    fn refresh(&self, url: &str) -> Option<String>;

    /// The URL prefix this signer issues (`<base>/files/`).
    fn files_prefix(&self) -> &str;
}

/// Characters that end an embedded URL in prose or markdown.
fn terminates_url(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')' | '<' | '>' | '`')
}

/// Refreshes every signed file URL embedded in a block of text.
///
/// Text without any of this signer's URLs is returned unchanged.
pub fn resign_embedded_urls(text: &str, signer: &dyn FileUrlSigner) -> String {
    let prefix = signer.files_prefix();
    if prefix.is_empty() || !text.contains(prefix) {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(prefix) {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let end = candidate
            .char_indices()
            .find(|(_, c)| terminates_url(*c))
            .map(|(i, _)| i)
            .unwrap_or(candidate.len());

        let url = &candidate[..end];
        match signer.refresh(url) {
            Some(refreshed) => result.push_str(&refreshed),
            None => result.push_str(url),
        }
        rest = &candidate[end..];
    }

    result.push_str(rest);
    result
}

/// Refreshes signed file URLs inside prompt input values.
///
/// Walks the JSON structure; only string leaves that are this signer's
/// URLs are rewritten.
pub fn resign_inputs(inputs: &Value, signer: &dyn FileUrlSigner) -> Value {
    match inputs {
        Value::String(s) => {
            if s.starts_with(signer.files_prefix()) {
                match signer.refresh(s) {
                    Some(refreshed) => Value::String(refreshed),
                    None => inputs.clone(),
                }
            } else {
                Value::String(resign_embedded_urls(s, signer))
            }
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resign_inputs(v, signer)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resign_inputs(v, signer)))
                .collect(),
        ),
        other => other.clone(),
    }
}
