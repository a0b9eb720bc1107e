//! The `sonarr_series` data source: find a library series by title.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::DataSourceHandler;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::sonarr::{Series, SonarrClient};

/// Looks up a series already in the library by its title.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeriesDataSource;

#[derive(Debug, Deserialize)]
struct Config {
    title: String,
}

/// Case-insensitive title match; the first match wins.
fn find_by_title<'a>(series: &'a [Series], title: &str) -> Option<&'a Series> {
    let wanted = title.to_lowercase();
    series.iter().find(|s| s.title.to_lowercase() == wanted)
}

#[async_trait::async_trait]
impl DataSourceHandler for SeriesDataSource {
    fn type_name(&self) -> &'static str {
        "sonarr_series"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Data source for finding a series in Sonarr by title")
            .with_attribute(
                "title",
                Attribute::required_string().with_description("Title of the series to find"),
            )
            .with_attribute(
                "id",
                Attribute::computed_int32().with_description("ID of the series in Sonarr"),
            )
            .with_attribute(
                "path",
                Attribute::computed_string().with_description("Root folder path of the series"),
            )
            .with_attribute(
                "quality_profile_id",
                Attribute::computed_int32().with_description("Quality profile ID for the series"),
            )
            .with_attribute(
                "monitored",
                Attribute::computed_bool().with_description("Whether the series is monitored"),
            )
            .with_attribute(
                "season_folder",
                Attribute::computed_bool().with_description("Whether to use season folders"),
            )
            .with_attribute(
                "tvdb_id",
                Attribute::computed_int32().with_description("TVDB ID of the series"),
            )
    }

    async fn read(&self, client: &SonarrClient, config: Value) -> Result<Value, ProviderError> {
        let config: Config = serde_json::from_value(config)?;
        let all = client
            .get_all_series()
            .await
            .map_err(ProviderError::client("Unable to get series from Sonarr"))?;
        debug!(count = all.len(), title = %config.title, "Searching series by title");

        let found = find_by_title(&all, &config.title).ok_or_else(|| {
            ProviderError::not_found(
                "Series not found",
                format!("No series found with title: {}", config.title),
            )
        })?;

        Ok(json!({
            "title": found.title,
            "id": found.id,
            "path": found.root_folder_path,
            "quality_profile_id": found.quality_profile_id,
            "monitored": found.monitored,
            "season_folder": found.season_folder,
            "tvdb_id": found.tvdb_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(id: i32, title: &str) -> Series {
        Series {
            id,
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_by_title_ignores_case() {
        let all = vec![series(1, "Lost"), series(2, "The Wire"), series(3, "the wire")];
        assert_eq!(find_by_title(&all, "THE WIRE").map(|s| s.id), Some(2));
        assert!(find_by_title(&all, "Wire").is_none());
    }

    #[test]
    fn test_title_is_required() {
        let schema = SeriesDataSource.schema();
        assert!(schema.block.attributes["title"].flags.required);
        assert!(schema.block.attributes["id"].flags.is_computed_only());
    }
}
