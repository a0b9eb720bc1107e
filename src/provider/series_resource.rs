//! The `sonarr_series` resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{parse_series_id, ResourceHandler};
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::sonarr::{AddOptions, Series, SonarrClient};
use crate::types::ImportedResource;

/// Manages a series in the Sonarr library.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeriesResource;

/// State of a `sonarr_series`. `None` fields are null, either unset or not
/// known yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SeriesState {
    id: Option<String>,
    tvdb_id: i32,
    title: Option<String>,
    path: String,
    monitored: Option<bool>,
    quality_profile: i32,
    add_options: Option<AddOptionsState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct AddOptionsState {
    monitor: Option<String>,
}

impl SeriesState {
    fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    fn into_value(self) -> Result<Value, ProviderError> {
        Ok(serde_json::to_value(self)?)
    }

    /// The stored id, if there is a usable one.
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Copy everything Sonarr owns from `series`.
    fn refresh_from(&mut self, series: &Series) {
        self.tvdb_id = series.tvdb_id;
        self.title = Some(series.title.clone());
        self.path = series.root_folder_path.clone();
        self.monitored = Some(series.monitored);
        self.quality_profile = series.quality_profile_id;
    }

    fn to_new_series(&self) -> Series {
        Series {
            title: self.title.clone().unwrap_or_default(),
            tvdb_id: self.tvdb_id,
            quality_profile_id: self.quality_profile,
            root_folder_path: self.path.clone(),
            monitored: self.monitored.unwrap_or(false),
            add_options: self.add_options.as_ref().map(|o| AddOptions {
                monitor: o.monitor.clone().unwrap_or_default(),
            }),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for SeriesResource {
    fn type_name(&self) -> &'static str {
        "sonarr_series"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Resource for the Sonarr Series")
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .use_state_for_unknown()
                    .with_description("ID of the series in Sonarr"),
            )
            .with_attribute(
                "tvdb_id",
                Attribute::required_int32()
                    .requires_replace()
                    .with_description("TVDB ID of the series"),
            )
            .with_attribute(
                "title",
                Attribute::optional_string()
                    .optional_computed()
                    .with_description("Title of the series"),
            )
            .with_attribute(
                "path",
                Attribute::required_string().with_description("Root folder path of the series"),
            )
            .with_attribute(
                "monitored",
                Attribute::computed_bool()
                    .optional_computed()
                    .with_description("Whether the series is monitored"),
            )
            .with_attribute(
                "quality_profile",
                Attribute::required_int32().with_description("Quality profile ID for the series"),
            )
            .with_block(
                "add_options",
                NestedBlock::optional(
                    Block::new().with_attribute(
                        "monitor",
                        Attribute::optional_string()
                            .with_description("Valid values: all, future, missing, etc."),
                    ),
                ),
            )
    }

    async fn create(&self, client: &SonarrClient, planned: Value) -> Result<Value, ProviderError> {
        let mut state = SeriesState::from_value(planned)?;
        let request = state.to_new_series();

        let created = client
            .create_series(&request)
            .await
            .map_err(ProviderError::client("Error creating series"))?;

        state.id = Some(created.id.to_string());
        if state.title.is_none() {
            state.title = Some(created.title);
        }
        if state.monitored.is_none() {
            state.monitored = Some(created.monitored);
        }
        info!(id = created.id, tvdb_id = state.tvdb_id, "Created series");
        state.into_value()
    }

    async fn read(
        &self,
        client: &SonarrClient,
        current: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let mut state = SeriesState::from_value(current)?;
        let Some(raw_id) = state.id() else {
            debug!("Series has no id, removing from state");
            return Ok(None);
        };
        let id = parse_series_id(raw_id, "Error parsing series ID")?;

        let Some(series) = client
            .get_series(id)
            .await
            .map_err(ProviderError::client("Error getting series"))?
        else {
            info!(id, "Series no longer exists in Sonarr");
            return Ok(None);
        };

        state.refresh_from(&series);
        state.into_value().map(Some)
    }

    async fn update(
        &self,
        client: &SonarrClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior = SeriesState::from_value(prior)?;
        let mut planned = SeriesState::from_value(planned)?;
        let raw_id = prior.id().unwrap_or_default();
        let id = parse_series_id(raw_id, "Error parsing series ID from the state")?;

        let mut current = client
            .get_series(id)
            .await
            .map_err(ProviderError::client("Error fetching series"))?
            .ok_or_else(|| {
                ProviderError::not_found(
                    "Series not found",
                    "Could not find series to update. It might have been deleted manually.",
                )
            })?;

        if let Some(title) = &planned.title {
            current.title = title.clone();
        }
        if let Some(monitored) = planned.monitored {
            current.monitored = monitored;
        }
        current.root_folder_path = planned.path.clone();
        current.quality_profile_id = planned.quality_profile;
        current.tvdb_id = planned.tvdb_id;

        let updated = client
            .update_series(&current)
            .await
            .map_err(ProviderError::client("Error updating series"))?;

        planned.id = prior.id.clone();
        if planned.title.is_none() {
            planned.title = Some(updated.title);
        }
        if planned.monitored.is_none() {
            planned.monitored = Some(updated.monitored);
        }
        info!(id, "Updated series");
        planned.into_value()
    }

    async fn delete(&self, client: &SonarrClient, current: Value) -> Result<(), ProviderError> {
        let state = SeriesState::from_value(current)?;
        let Some(raw_id) = state.id() else {
            return Ok(());
        };
        let id = parse_series_id(raw_id, "Invalid ID format")?;

        info!(
            id,
            title = state.title.as_deref().unwrap_or_default(),
            "Deleting series"
        );
        client
            .delete_series(id, true)
            .await
            .map_err(ProviderError::client("Error deleting series"))
    }

    async fn import(
        &self,
        client: &SonarrClient,
        raw_id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let id = parse_series_id(raw_id, "Invalid ID format")?;
        let series = client
            .get_series(id)
            .await
            .map_err(ProviderError::client("Error getting series"))?
            .ok_or_else(|| {
                ProviderError::not_found(
                    "Series not found",
                    format!("No series found with ID: {}", id),
                )
            })?;

        let mut state = SeriesState {
            id: Some(series.id.to_string()),
            ..Default::default()
        };
        state.refresh_from(&series);
        Ok(vec![ImportedResource::new(
            self.type_name(),
            state.into_value()?,
        )])
    }
}
