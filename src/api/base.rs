//! Pipeline base URL.
//!
//! The base is resolved once at startup. It may be absolute
//! (`https://host/api`) or a path (`/api`) joined onto the configured origin.

use reqwest::Url;

use super::client::ApiError;

pub const DEFAULT_BASE_PATH: &str = "/api";
pub const PIPELINE_PATH: &str = "/rfantibody_pipeline";

/// Absolute base URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    pub fn resolve(base_url: &str, origin: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim();
        let base = if trimmed.is_empty() {
            DEFAULT_BASE_PATH
        } else {
            trimmed
        };

        let url = if has_http_scheme(base) {
            Url::parse(base).map_err(|err| ApiError::InvalidBaseUrl(format!("{base}: {err}")))?
        } else {
            let origin = origin.trim();
            Url::parse(origin)
                .and_then(|origin| origin.join(base))
                .map_err(|err| ApiError::InvalidBaseUrl(format!("{origin} + {base}: {err}")))?
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{url}: only http and https are supported"
            )));
        }

        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<base><path>`, inserting the separating slash when `path` lacks one.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    pub fn pipeline_url(&self) -> String {
        self.endpoint(PIPELINE_PATH)
    }

    /// Resolve a link returned by the pipeline against this base.
    ///
    /// Absolute links pass through; paths are appended to the base the same way
    /// the request URL was built.
    pub fn resolve_link(&self, link: &str) -> String {
        let link = link.trim();
        if has_http_scheme(link) {
            link.to_string()
        } else {
            self.endpoint(link)
        }
    }
}

impl std::fmt::Display for ApiBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_http_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
