//! Helpers for driving a [`ProviderService`] in tests without a gRPC server.
//!
//! # Example
//!
//! ```no_run
//! use sonarr_provider::provider::SonarrProvider;
//! use sonarr_provider::testing::{assert_plan_creates, ProviderTester};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tester = ProviderTester::new(SonarrProvider::new("test"));
//! tester
//!     .configure(json!({"url": "http://localhost:8989", "api_key": "key"}))
//!     .await?;
//!
//! let plan = tester
//!     .plan_create("sonarr_series", json!({
//!         "tvdb_id": 81189,
//!         "quality_profile_id": 1,
//!         "root_folder_path": "/tv"
//!     }))
//!     .await?;
//! assert_plan_creates(&plan);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::error::ProviderError;
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Wraps a [`ProviderService`] and exposes its operations the way the host
/// would call them.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Resource type names, sorted.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.schema().resources.into_keys().collect()
    }

    /// Data source type names, sorted.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.schema().data_sources.into_keys().collect()
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate and then configure the provider, as the host does.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        self.validate_provider_config(config.clone()).await?;
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure without validating first. Returns all diagnostics.
    pub async fn configure_raw(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        self.provider.configure(config).await
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, config).await
    }

    /// Plan a change to an existing resource.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), config)
            .await
    }

    /// Plan destroying a resource.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null)
            .await
    }

    /// Create a resource from a planned state.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Refresh a resource. `None` means it is gone.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update a resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource by id.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a data source configuration, then read it.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_data_source_config(data_source_type, config.clone())
            .await?;
        Ok(self
            .provider
            .read_data_source(data_source_type, config)
            .await?)
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Plan, create, then read back. Returns the state after the read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read_existing(resource_type, created).await
    }

    /// Plan, update, then read back. Returns the state after the read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read_existing(resource_type, updated).await
    }

    /// Plan a destroy, then delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), TestError> {
        self.plan_delete(resource_type, current_state.clone())
            .await?;
        Ok(self.delete(resource_type, current_state).await?)
    }

    async fn read_existing(&self, resource_type: &str, state: Value) -> Result<Value, TestError> {
        self.read(resource_type, state).await?.ok_or_else(|| {
            TestError::Provider(ProviderError::not_found(
                "Resource not found",
                format!("{} disappeared right after apply", resource_type),
            ))
        })
    }
}

/// Failure of a tester operation.
#[derive(Debug, Error)]
pub enum TestError {
    /// The operation returned error diagnostics.
    #[error("Operation failed with diagnostics: {}", summarize(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The provider returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TestError {
    /// The diagnostics, if this failure carries any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Diagnostics(diagnostics) => diagnostics,
            Self::Provider(_) => &[],
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match (&d.attribute, &d.detail) {
            (Some(attr), Some(detail)) => format!("{} ({}): {}", d.summary, attr, detail),
            (Some(attr), None) => format!("{} ({})", d.summary, attr),
            (None, Some(detail)) => format!("{}: {}", d.summary, detail),
            (None, None) => d.summary.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    if has_errors(&diagnostics) {
        Err(TestError::Diagnostics(
            diagnostics.into_iter().filter(Diagnostic::is_error).collect(),
        ))
    } else {
        Ok(())
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan creates a resource.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty() && plan.changes.iter().all(|c| c.before.is_none()),
        "Expected plan to create, got changes: {:?}",
        plan.changes
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// Assert that a plan does nothing.
///
/// # Panics
///
/// Panics if the plan has changes or unknown values.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        !plan.has_changes(),
        "Expected no changes, but got changes {:?} and unknown values {:?}",
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>(),
        plan.unknown_attributes
    );
}

/// Assert that a plan requires replacing the resource.
///
/// # Panics
///
/// Panics if the plan updates in place.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan updates the resource in place.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(plan.has_changes(), "Expected plan to have changes");
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan changes the attribute at `path`.
///
/// # Panics
///
/// Panics if no change has that path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change '{}'. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that an attribute is only known after apply.
///
/// # Panics
///
/// Panics if `path` is not listed as unknown.
pub fn assert_plan_unknown(plan: &PlanResult, path: &str) {
    assert!(
        plan.unknown_attributes.iter().any(|p| p == path),
        "Expected '{}' to be unknown. Unknown attributes: {:?}",
        path,
        plan.unknown_attributes
    );
}

/// Assert that an error diagnostic's summary contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "Expected an error containing '{}', got: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryProvider {
        items: Mutex<Vec<Value>>,
    }

    #[async_trait::async_trait]
    impl ProviderService for MemoryProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new()
                .with_provider_config(
                    Schema::v0().with_attribute("token", Attribute::required_string()),
                )
                .with_resource(
                    "memory_item",
                    Schema::v0()
                        .with_attribute("name", Attribute::required_string())
                        .with_attribute("id", Attribute::computed_string().use_state_for_unknown())
                        .with_attribute("size", Attribute::required_int32().requires_replace()),
                )
                .with_data_source(
                    "memory_count",
                    Schema::v0().with_attribute("count", Attribute::computed_int32()),
                )
        }

        async fn configure(&self, _config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            Ok(vec![])
        }

        async fn create(&self, _: &str, mut planned: Value) -> Result<Value, ProviderError> {
            let mut items = self.items.lock().unwrap();
            planned["id"] = json!(items.len().to_string());
            items.push(planned.clone());
            Ok(planned)
        }

        async fn read(&self, _: &str, current: Value) -> Result<Option<Value>, ProviderError> {
            let items = self.items.lock().unwrap();
            Ok(items.iter().find(|i| i["id"] == current["id"]).cloned())
        }

        async fn update(&self, _: &str, _: Value, planned: Value) -> Result<Value, ProviderError> {
            let mut items = self.items.lock().unwrap();
            for item in items.iter_mut() {
                if item["id"] == planned["id"] {
                    *item = planned.clone();
                }
            }
            Ok(planned)
        }

        async fn delete(&self, _: &str, current: Value) -> Result<(), ProviderError> {
            self.items.lock().unwrap().retain(|i| i["id"] != current["id"]);
            Ok(())
        }

        async fn read_data_source(&self, _: &str, _: Value) -> Result<Value, ProviderError> {
            Ok(json!({"count": self.items.lock().unwrap().len()}))
        }
    }

    #[tokio::test]
    async fn test_configure_validates_first() {
        let tester = ProviderTester::new(MemoryProvider::default());
        let err = tester.configure(json!({})).await.unwrap_err();
        assert_eq!(err.diagnostics()[0].attribute.as_deref(), Some("token"));
        assert!(tester.configure(json!({"token": "t"})).await.is_ok());
    }

    #[test]
    fn test_type_names() {
        let tester = ProviderTester::new(MemoryProvider::default());
        assert_eq!(tester.resource_types(), vec!["memory_item"]);
        assert_eq!(tester.data_source_types(), vec!["memory_count"]);
    }

    #[tokio::test]
    async fn test_plan_helpers() {
        let tester = ProviderTester::new(MemoryProvider::default());
        let plan = tester
            .plan_create("memory_item", json!({"name": "a", "size": 1}))
            .await
            .unwrap();
        assert_plan_creates(&plan);
        assert_plan_unknown(&plan, "id");

        let prior = json!({"id": "0", "name": "a", "size": 1});
        let plan = tester
            .plan_update("memory_item", prior.clone(), json!({"name": "a", "size": 1}))
            .await
            .unwrap();
        assert_plan_no_changes(&plan);

        let plan = tester
            .plan_update("memory_item", prior.clone(), json!({"name": "b", "size": 1}))
            .await
            .unwrap();
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "name");

        let plan = tester
            .plan_update("memory_item", prior, json!({"name": "a", "size": 2}))
            .await
            .unwrap();
        assert_plan_replaces(&plan);
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let tester = ProviderTester::new(MemoryProvider::default());
        let created = tester
            .lifecycle_create("memory_item", json!({"name": "a", "size": 1}))
            .await
            .unwrap();
        assert_eq!(created["id"], "0");

        let updated = tester
            .lifecycle_update("memory_item", created, json!({"name": "b", "size": 1}))
            .await
            .unwrap();
        assert_eq!(updated["name"], "b");
        assert_eq!(updated["id"], "0");

        let count = tester.read_data_source("memory_count", json!({})).await.unwrap();
        assert_eq!(count["count"], 1);

        tester.lifecycle_delete("memory_item", updated.clone()).await.unwrap();
        assert!(tester.read("memory_item", updated).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lifecycle_rejects_invalid_config() {
        let tester = ProviderTester::new(MemoryProvider::default());
        let err = tester
            .lifecycle_create("memory_item", json!({"name": "a"}))
            .await
            .unwrap_err();
        assert_error_contains(err.diagnostics(), "Missing required attribute 'size'");
    }

    #[tokio::test]
    async fn test_import_defaults_to_unimplemented() {
        let tester = ProviderTester::new(MemoryProvider::default());
        let err = tester.import_resource("memory_item", "0").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unimplemented(_)));
    }

    #[test]
    fn test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("First error").with_attribute("field1"),
            Diagnostic::error("Second error").with_detail("More info"),
        ]);

        let display = err.to_string();
        assert!(display.contains("First error (field1)"));
        assert!(display.contains("Second error: More info"));
    }

    #[test]
    #[should_panic(expected = "Expected an error containing")]
    fn test_assert_error_contains_fails() {
        assert_error_contains(&[Diagnostic::warning("Invalid")], "Invalid");
    }
}
