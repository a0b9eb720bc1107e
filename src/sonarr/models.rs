//! Typed views of the Sonarr JSON schema.
//!
//! Only the fields the provider works with are modelled; everything else
//! Sonarr returns for a series is carried in `extra` so updates can send
//! the object back unchanged.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A series in the Sonarr library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    /// Sonarr's identifier. Zero for a series that has not been added yet.
    #[serde(deserialize_with = "null_as_default")]
    pub id: i32,
    /// Series title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Root folder the series lives under.
    #[serde(deserialize_with = "null_as_default")]
    pub root_folder_path: String,
    /// Quality profile applied to downloads.
    #[serde(deserialize_with = "null_as_default")]
    pub quality_profile_id: i32,
    /// Whether Sonarr monitors the series for new episodes.
    #[serde(deserialize_with = "null_as_default")]
    pub monitored: bool,
    /// Whether episodes are sorted into season folders.
    #[serde(deserialize_with = "null_as_default")]
    pub season_folder: bool,
    /// TheTVDB identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tvdb_id: i32,
    /// Options applied only when the series is first added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_options: Option<AddOptions>,
    /// Fields returned by Sonarr that this crate does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Options used when adding a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddOptions {
    /// Which episodes to monitor: `all`, `future`, `missing`, `existing`, ...
    #[serde(deserialize_with = "null_as_default")]
    pub monitor: String,
}

/// A search result from the TVDB lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesLookup {
    /// Series title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Title used for sorting, lowercase without articles.
    #[serde(deserialize_with = "null_as_default")]
    pub sort_title: String,
    /// `continuing`, `ended`, `upcoming`, ...
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Plot summary.
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    /// Network the series airs on.
    #[serde(deserialize_with = "null_as_default")]
    pub network: String,
    /// Year the series started.
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    /// TheTVDB identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub tvdb_id: i32,
    /// IMDb identifier, e.g. `tt0903747`.
    #[serde(deserialize_with = "null_as_default")]
    pub imdb_id: String,
    /// Episode runtime in minutes.
    #[serde(deserialize_with = "null_as_default")]
    pub runtime: i32,
    /// Seasons, including specials as season 0.
    #[serde(deserialize_with = "null_as_default")]
    pub seasons: Vec<Season>,
    /// Library statistics, when Sonarr has them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<SeriesStatistics>,
}

impl SeriesLookup {
    /// Number of seasons, preferring Sonarr's own statistics when present.
    pub fn season_count(&self) -> i32 {
        match &self.statistics {
            Some(stats) if stats.season_count > 0 => stats.season_count,
            _ => self.seasons.len() as i32,
        }
    }
}

/// A season entry within a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Season {
    /// Season number; 0 is specials.
    #[serde(deserialize_with = "null_as_default")]
    pub season_number: i32,
    /// Whether the season is monitored.
    #[serde(deserialize_with = "null_as_default")]
    pub monitored: bool,
}

/// Aggregate counters Sonarr reports for a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesStatistics {
    /// Number of seasons.
    #[serde(deserialize_with = "null_as_default")]
    pub season_count: i32,
}

/// Response of `GET /api/v3/system/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemStatus {
    /// Application name, normally `Sonarr`.
    #[serde(deserialize_with = "null_as_default")]
    pub app_name: String,
    /// Installed version.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    /// Host operating system.
    #[serde(deserialize_with = "null_as_default")]
    pub os_name: String,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Platform: {}, version: {}", self.app_name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_series_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "title": "The Expanse",
            "rootFolderPath": "/tv",
            "qualityProfileId": 4,
            "monitored": true,
            "seasonFolder": true,
            "tvdbId": 280619,
            "languageProfileId": 1,
            "tags": [3, 5]
        });

        let series: Series = serde_json::from_value(raw).unwrap();
        assert_eq!(series.id, 7);
        assert_eq!(series.tvdb_id, 280619);
        assert_eq!(series.extra["tags"], json!([3, 5]));

        let back = serde_json::to_value(&series).unwrap();
        assert_eq!(back["languageProfileId"], 1);
        assert_eq!(back["rootFolderPath"], "/tv");
        assert!(back.get("addOptions").is_none());
    }

    #[test]
    fn test_series_serializes_add_options() {
        let series = Series {
            title: "Severance".to_string(),
            add_options: Some(AddOptions {
                monitor: "future".to_string(),
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&series).unwrap();
        assert_eq!(value["addOptions"], json!({"monitor": "future"}));
        assert_eq!(series.to_string(), "Severance");
    }

    #[test]
    fn test_lookup_season_count() {
        let lookup: SeriesLookup = serde_json::from_value(json!({
            "title": "Dark",
            "seasons": [{"seasonNumber": 1}, {"seasonNumber": 2}, {"seasonNumber": 3}]
        }))
        .unwrap();
        assert_eq!(lookup.season_count(), 3);

        let lookup: SeriesLookup = serde_json::from_value(json!({
            "title": "Dark",
            "seasons": [{"seasonNumber": 1}],
            "statistics": {"seasonCount": 3}
        }))
        .unwrap();
        assert_eq!(lookup.season_count(), 3);
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let results: Vec<SeriesLookup> = serde_json::from_value(json!([{
            "title": "Dark",
            "tvdbId": 1,
            "network": null,
            "imdbId": null,
            "year": null,
            "seasons": null,
            "statistics": null
        }]))
        .unwrap();
        assert_eq!(results[0].title, "Dark");
        assert_eq!(results[0].network, "");
        assert_eq!(results[0].imdb_id, "");
        assert_eq!(results[0].year, 0);
        assert_eq!(results[0].season_count(), 0);

        let series: Series = serde_json::from_value(json!({
            "id": 4,
            "title": null,
            "monitored": null,
            "tags": null
        }))
        .unwrap();
        assert_eq!(series.title, "");
        assert!(!series.monitored);
        assert_eq!(series.extra["tags"], serde_json::Value::Null);

        let status: SystemStatus =
            serde_json::from_value(json!({"appName": "Sonarr", "osName": null})).unwrap();
        assert_eq!(status.os_name, "");
    }

    #[test]
    fn test_system_status_display() {
        let status = SystemStatus {
            app_name: "Sonarr".to_string(),
            version: "4.0.9.2244".to_string(),
            os_name: "ubuntu".to_string(),
        };
        assert_eq!(status.to_string(), "Platform: Sonarr, version: 4.0.9.2244");
    }
}
