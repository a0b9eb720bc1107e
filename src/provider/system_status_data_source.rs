//! The `sonarr_system_status` data source.

use serde_json::{json, Value};

use super::DataSourceHandler;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::sonarr::SonarrClient;

/// Reports what the configured Sonarr instance is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStatusDataSource;

#[async_trait::async_trait]
impl DataSourceHandler for SystemStatusDataSource {
    fn type_name(&self) -> &'static str {
        "sonarr_system_status"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("System information data source")
            .with_attribute(
                "app_name",
                Attribute::computed_string().with_description("App name of the instance (Sonarr)"),
            )
            .with_attribute(
                "version",
                Attribute::computed_string().with_description("Version of the Sonarr installation"),
            )
            .with_attribute(
                "os_name",
                Attribute::computed_string().with_description("OS name of the Sonarr installation"),
            )
    }

    async fn read(&self, client: &SonarrClient, _config: Value) -> Result<Value, ProviderError> {
        let status = client
            .get_system_status()
            .await
            .map_err(ProviderError::client("Unable to communicate with Sonarr"))?;

        Ok(json!({
            "app_name": status.app_name,
            "version": status.version,
            "os_name": status.os_name,
        }))
    }
}
