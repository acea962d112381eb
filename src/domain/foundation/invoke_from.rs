//! Invocation source marker for AI operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which surface triggered an AI operation.
///
/// Recorded with generated content for attribution and billing; the
/// service API always tags [`InvokeFrom::ServiceApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvokeFrom {
    ServiceApi,
    WebApp,
    Explore,
    Debugger,
}

impl InvokeFrom {
    /// Returns the wire representation of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvokeFrom::ServiceApi => "service-api",
            InvokeFrom::WebApp => "web-app",
            InvokeFrom::Explore => "explore",
            InvokeFrom::Debugger => "debugger",
        }
    }
}

impl fmt::Display for InvokeFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
