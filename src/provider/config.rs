//! Provider configuration: the `sonarr` provider block and its
//! environment fallbacks.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::schema::{Attribute, Diagnostic, Schema};
use crate::sonarr::{ClientError, SonarrClient};

/// Environment variable used when `url` is not configured.
pub const URL_ENV: &str = "SONARR_URL";

/// Environment variable used when `api_key` is not configured.
pub const API_KEY_ENV: &str = "SONARR_API_KEY";

/// Looks up an environment variable. Swappable so tests don't touch the
/// process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the real process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|name: &str| std::env::var(name).ok())
}

/// Schema of the provider block.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Interact with Sonarr")
        .with_attribute(
            "url",
            Attribute::optional_string().with_description(
                "URL of the Sonarr server. Can also be set via SONARR_URL environment variable.",
            ),
        )
        .with_attribute(
            "api_key",
            Attribute::optional_string()
                .sensitive()
                .with_description(
                    "API key for the Sonarr instance. Can also be set via SONARR_API_KEY environment variable.",
                ),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    url: Option<String>,
    api_key: Option<String>,
}

/// Resolved provider settings.
pub struct ProviderConfig {
    /// Base URL of the Sonarr instance.
    pub url: String,
    /// API key sent with every request.
    pub api_key: SecretString,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve settings from the provider block, falling back to the
    /// environment. Empty strings count as unset.
    pub fn resolve(config: &Value, env: &EnvLookup) -> Result<Self, Vec<Diagnostic>> {
        let raw: RawConfig = if config.is_null() {
            RawConfig::default()
        } else {
            serde_json::from_value(config.clone()).map_err(|e| {
                vec![Diagnostic::error("Invalid provider configuration").with_detail(e.to_string())]
            })?
        };

        let lookup: &(dyn Fn(&str) -> Option<String> + Send + Sync) = env.as_ref();
        let pick = |configured: Option<String>, var: &str| {
            configured
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(var).filter(|v| !v.is_empty()))
        };
        let url = pick(raw.url, URL_ENV);
        let api_key = pick(raw.api_key, API_KEY_ENV);

        let mut diagnostics = Vec::new();
        if url.is_none() {
            diagnostics.push(
                Diagnostic::error("Sonarr URL missing")
                    .with_detail("Sonarr URL should be provided")
                    .with_attribute("url"),
            );
        }
        if api_key.is_none() {
            diagnostics.push(
                Diagnostic::error("Sonarr API key missing")
                    .with_detail("Sonarr API key should be provided")
                    .with_attribute("api_key"),
            );
        }

        match (url, api_key) {
            (Some(url), Some(api_key)) => Ok(Self {
                url,
                api_key: SecretString::from(api_key),
            }),
            _ => Err(diagnostics),
        }
    }

    /// Build the shared client.
    pub fn client(&self) -> Result<SonarrClient, Diagnostic> {
        SonarrClient::new(self.url.as_str(), self.api_key.expose_secret()).map_err(|e| {
            let diagnostic = Diagnostic::error("Unable to create Sonarr client");
            match e {
                ClientError::InvalidUrl(detail) => diagnostic
                    .with_detail(format!("Invalid Sonarr URL: {}", detail))
                    .with_attribute("url"),
                other => diagnostic.with_detail(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> EnvLookup {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| vars.get(name).cloned())
    }

    #[test]
    fn test_configured_values_win() {
        let config = ProviderConfig::resolve(
            &json!({"url": "http://sonarr:8989", "api_key": "abc"}),
            &env(&[(URL_ENV, "http://other"), (API_KEY_ENV, "zzz")]),
        )
        .unwrap();
        assert_eq!(config.url, "http://sonarr:8989");
        assert_eq!(config.api_key.expose_secret(), "abc");
    }

    #[test]
    fn test_env_fallback() {
        let config = ProviderConfig::resolve(
            &json!({"url": ""}),
            &env(&[(URL_ENV, "http://env:8989"), (API_KEY_ENV, "envkey")]),
        )
        .unwrap();
        assert_eq!(config.url, "http://env:8989");
        assert_eq!(config.api_key.expose_secret(), "envkey");
    }

    #[test]
    fn test_missing_values() {
        let diagnostics = ProviderConfig::resolve(&Value::Null, &env(&[])).unwrap_err();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].summary, "Sonarr URL missing");
        assert_eq!(diagnostics[1].summary, "Sonarr API key missing");

        let diagnostics =
            ProviderConfig::resolve(&json!({"url": "http://x"}), &env(&[(API_KEY_ENV, "")]))
                .unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("api_key"));
    }

    #[test]
    fn test_invalid_url_points_at_attribute() {
        let config = ProviderConfig::resolve(
            &json!({"url": "not a url", "api_key": "abc"}),
            &env(&[]),
        )
        .unwrap();
        let diagnostic = config.client().unwrap_err();
        assert_eq!(diagnostic.attribute.as_deref(), Some("url"));
    }

    #[test]
    fn test_debug_hides_key() {
        let config =
            ProviderConfig::resolve(&json!({"url": "http://x", "api_key": "secret"}), &env(&[]))
                .unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_schema_marks_key_sensitive() {
        let schema = schema();
        assert!(schema.block.attributes["api_key"].flags.sensitive);
        assert!(schema.block.attributes["url"].flags.optional);
    }
}
