/// Endpoint configuration for the two remote collaborators:
/// the fusion service and the artifact store.
///
/// There is no CLI surface; both endpoints ship with compiled
/// defaults and can be overridden through the environment.

/// Default base URL of the fusion service
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8787";

/// Default base URL of the artifact store
pub const DEFAULT_STORAGE_URL: &str = "http://127.0.0.1:8788";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the image fusion service
    pub service_url: String,
    /// Base URL of the artifact store
    pub storage_url: String,
}

impl Config {
    /// Read the configuration from the environment, falling back to defaults.
    ///
    /// - `FUSION_SERVICE_URL` overrides the fusion service endpoint
    /// - `FUSION_STORAGE_URL` overrides the artifact store endpoint
    pub fn from_env() -> Self {
        Self {
            service_url: base_url("FUSION_SERVICE_URL", DEFAULT_SERVICE_URL),
            storage_url: base_url("FUSION_STORAGE_URL", DEFAULT_STORAGE_URL),
        }
    }
}

/// Read a base URL from an environment variable, normalizing away a
/// trailing slash so callers can join paths with plain formatting.
fn base_url(var: &str, default: &str) -> String {
    let url = std::env::var(var).unwrap_or_else(|_| default.to_string());
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_trailing_slash() {
        assert!(!DEFAULT_SERVICE_URL.ends_with('/'));
        assert!(!DEFAULT_STORAGE_URL.ends_with('/'));
    }
}
