//! The `sonarr` provider: configuration, handler registry and the
//! [`ProviderService`] implementation served over gRPC.
//!
//! Each resource and data source lives in its own module and implements
//! [`ResourceHandler`] or [`DataSourceHandler`]. Handlers receive the
//! client built by `Configure`; they never see the raw provider block.

pub mod config;
mod series_data_source;
mod series_lookup_data_source;
mod series_resource;
mod system_status_data_source;

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::sonarr::SonarrClient;
use crate::types::ImportedResource;

pub use config::{EnvLookup, ProviderConfig, API_KEY_ENV, URL_ENV};
pub use series_data_source::SeriesDataSource;
pub use series_lookup_data_source::SeriesLookupDataSource;
pub use series_resource::SeriesResource;
pub use system_status_data_source::SystemStatusDataSource;

/// Provider type name; resource and data source names are prefixed with it.
pub const PROVIDER_TYPE_NAME: &str = "sonarr";

/// A managed resource type.
#[async_trait::async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Full type name, e.g. `sonarr_series`.
    fn type_name(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// Create the remote object and return the resulting state.
    async fn create(&self, client: &SonarrClient, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh state. `None` removes the resource from state.
    async fn read(&self, client: &SonarrClient, current: Value)
        -> Result<Option<Value>, ProviderError>;

    /// Apply a planned change in place.
    async fn update(
        &self,
        client: &SonarrClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Destroy the remote object.
    async fn delete(&self, client: &SonarrClient, current: Value) -> Result<(), ProviderError>;

    /// Bring an existing object under management.
    async fn import(
        &self,
        _client: &SonarrClient,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "Import not supported for resource type: {}",
            self.type_name()
        )))
    }
}

/// A read-only data source.
#[async_trait::async_trait]
pub trait DataSourceHandler: Send + Sync {
    /// Full type name, e.g. `sonarr_system_status`.
    fn type_name(&self) -> &'static str;

    /// The data source schema.
    fn schema(&self) -> Schema;

    /// Read the data source for an already validated config.
    async fn read(&self, client: &SonarrClient, config: Value) -> Result<Value, ProviderError>;
}

/// Provider for managing a Sonarr instance.
pub struct SonarrProvider {
    version: String,
    env: EnvLookup,
    client: RwLock<Option<SonarrClient>>,
    resources: BTreeMap<&'static str, Box<dyn ResourceHandler>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSourceHandler>>,
}

impl SonarrProvider {
    /// Create a provider reporting `version`, with every resource and data
    /// source registered.
    pub fn new(version: impl Into<String>) -> Self {
        let mut provider = Self {
            version: version.into(),
            env: config::process_env(),
            client: RwLock::new(None),
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        };
        provider.register_resource(SeriesResource);
        provider.register_data_source(SeriesDataSource);
        provider.register_data_source(SeriesLookupDataSource);
        provider.register_data_source(SystemStatusDataSource);
        provider
    }

    /// Replace the environment used for `SONARR_URL` / `SONARR_API_KEY`.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// The provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn register_resource(&mut self, handler: impl ResourceHandler + 'static) {
        self.resources.insert(handler.type_name(), Box::new(handler));
    }

    fn register_data_source(&mut self, handler: impl DataSourceHandler + 'static) {
        self.data_sources.insert(handler.type_name(), Box::new(handler));
    }

    /// Whether `Configure` has succeeded.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    async fn client(&self) -> Result<SonarrClient, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "Expected a configured Sonarr client. Run Configure before using resources or data sources."
                    .to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn ResourceHandler, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|h| h.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSourceHandler, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|h| h.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for SonarrProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(config::schema());
        for (name, handler) in &self.resources {
            schema = schema.with_resource(*name, handler.schema());
        }
        for (name, handler) in &self.data_sources {
            schema = schema.with_data_source(*name, handler.schema());
        }
        schema
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = match ProviderConfig::resolve(&config, &self.env) {
            Ok(resolved) => resolved,
            Err(diagnostics) => {
                warn!(diagnostics = diagnostics.len(), "Provider configuration incomplete");
                return Ok(diagnostics);
            }
        };

        let client = match resolved.client() {
            Ok(client) => client,
            Err(diagnostic) => return Ok(vec![diagnostic]),
        };

        info!(
            url = %client.base_url(),
            version = %self.version,
            "Configured Sonarr client"
        );
        *self.client.write().await = Some(client);
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Dropping Sonarr client");
        self.client.write().await.take();
        Ok(())
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let handler = self.resource(resource_type)?;
        handler.create(&self.client().await?, planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let handler = self.resource(resource_type)?;
        handler.read(&self.client().await?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let handler = self.resource(resource_type)?;
        handler
            .update(&self.client().await?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let handler = self.resource(resource_type)?;
        handler.delete(&self.client().await?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let handler = self.resource(resource_type)?;
        handler.import(&self.client().await?, id).await
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let handler = self.data_source(data_source_type)?;
        handler.read(&self.client().await?, config).await
    }
}

/// Parse a series id kept in state as a string. `summary` names the
/// failure in the diagnostic; the parse error is the detail.
fn parse_series_id(raw: &str, summary: &str) -> Result<i32, ProviderError> {
    raw.parse::<i32>()
        .map_err(|e| ProviderError::invalid(summary, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn provider() -> SonarrProvider {
        SonarrProvider::new("0.1.0").with_env_lookup(Arc::new(|_: &str| None::<String>))
    }

    #[test]
    fn test_schema_registers_everything() {
        let schema = provider().schema();
        assert!(schema.resources.contains_key("sonarr_series"));
        let data_sources: Vec<_> = schema.data_sources.keys().cloned().collect();
        assert_eq!(
            data_sources,
            vec!["sonarr_series", "sonarr_series_lookup", "sonarr_system_status"]
        );
        assert!(schema.provider.block.attributes.contains_key("api_key"));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let provider = provider();
        assert!(!provider.is_configured().await);

        let err = provider
            .read("sonarr_series", json!({"id": "1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        let err = provider
            .read_data_source("sonarr_system_status", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_configure_and_stop() {
        let provider = provider();
        let diagnostics = provider
            .configure(json!({"url": "http://localhost:8989", "api_key": "key"}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());
        assert!(provider.is_configured().await);

        provider.stop().await.unwrap();
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_configure_reports_missing_settings() {
        let provider = provider();
        let diagnostics = provider.configure(json!({})).await.unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let provider = provider();
        let err = provider
            .create("sonarr_movie", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[test]
    fn test_parse_series_id() {
        assert_eq!(parse_series_id("42", "Error parsing series ID").unwrap(), 42);
        let err = parse_series_id("abc", "Error parsing series ID").unwrap_err();
        assert!(matches!(err, ProviderError::Invalid { .. }));
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.summary, "Error parsing series ID");
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("invalid digit found in string")
        );
    }
}
