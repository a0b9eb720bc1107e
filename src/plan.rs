//! Schema-driven planning.
//!
//! Given a resource schema, its prior state and the new configuration,
//! [`plan_resource_change`] works out the planned state, the attribute
//! changes, whether the change forces replacement, and which computed
//! values are only known after apply.
//!
//! Rules:
//!
//! - Configured values always win.
//! - A computed attribute that isn't configured keeps its prior value if
//!   nothing else about the resource changes.
//! - If something does change, such attributes become unknown (`null` in
//!   the planned state and listed in [`PlanResult::unknown_attributes`]),
//!   unless they carry [`PlanModifier::UseStateForUnknown`] and have a
//!   prior value.
//! - On create every unconfigured computed attribute is unknown.
//! - A change to an attribute with [`PlanModifier::RequiresReplace`] makes
//!   the plan a replacement.

use serde_json::{Map, Value};

use crate::schema::{Block, PlanModifier, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan a create (`prior` is `None`), update, or destroy (`config` is `null`).
pub fn plan_resource_change(schema: &Schema, prior: Option<&Value>, config: &Value) -> PlanResult {
    let empty = Map::new();
    let prior_obj = prior.and_then(Value::as_object);

    if config.is_null() {
        let mut changes = Vec::new();
        let mut replace = false;
        if let Some(prior_obj) = prior_obj {
            diff_block(&schema.block, Some(prior_obj), &empty, "", &mut changes, &mut replace);
        }
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let config_obj = config.as_object().unwrap_or(&empty);

    let Some(prior_obj) = prior_obj else {
        let mut unknown = Vec::new();
        let planned = plan_block(&schema.block, None, config_obj, "", true, &mut unknown);
        let mut changes = Vec::new();
        let mut replace = false;
        diff_block(&schema.block, None, &planned, "", &mut changes, &mut replace);
        return PlanResult::with_changes(Value::Object(planned), changes, false)
            .with_unknown(unknown);
    };

    // First pass: would anything change if computed values kept their state?
    let mut ignored = Vec::new();
    let settled = plan_block(&schema.block, Some(prior_obj), config_obj, "", false, &mut ignored);
    let mut changes = Vec::new();
    let mut replace = false;
    diff_block(&schema.block, Some(prior_obj), &settled, "", &mut changes, &mut replace);
    if changes.is_empty() {
        return PlanResult::no_change(Value::Object(settled));
    }

    let mut unknown = Vec::new();
    let planned = plan_block(&schema.block, Some(prior_obj), config_obj, "", true, &mut unknown);
    let mut changes = Vec::new();
    let mut replace = false;
    diff_block(&schema.block, Some(prior_obj), &planned, "", &mut changes, &mut replace);

    PlanResult::with_changes(Value::Object(planned), changes, replace).with_unknown(unknown)
}

fn plan_block(
    block: &Block,
    prior: Option<&Map<String, Value>>,
    config: &Map<String, Value>,
    path: &str,
    mark_unknown: bool,
    unknown: &mut Vec<String>,
) -> Map<String, Value> {
    let mut planned = Map::new();

    for (name, attr) in &block.attributes {
        let configured = non_null(config.get(name));
        let prior_value = non_null(prior.and_then(|p| p.get(name)));

        let value = match configured {
            Some(v) => v.clone(),
            None if attr.flags.computed => {
                let keep = !mark_unknown
                    || (attr.has_modifier(PlanModifier::UseStateForUnknown)
                        && prior_value.is_some());
                if keep {
                    prior_value.cloned().unwrap_or(Value::Null)
                } else {
                    unknown.push(join_path(path, name));
                    Value::Null
                }
            }
            None => Value::Null,
        };
        planned.insert(name.clone(), value);
    }

    for (name, nested) in &block.blocks {
        let value = match config.get(name).and_then(Value::as_object) {
            Some(config_block) => {
                let prior_block = prior.and_then(|p| p.get(name)).and_then(Value::as_object);
                Value::Object(plan_block(
                    &nested.block,
                    prior_block,
                    config_block,
                    &join_path(path, name),
                    mark_unknown,
                    unknown,
                ))
            }
            None => Value::Null,
        };
        planned.insert(name.clone(), value);
    }

    planned
}

fn diff_block(
    block: &Block,
    prior: Option<&Map<String, Value>>,
    planned: &Map<String, Value>,
    path: &str,
    changes: &mut Vec<AttributeChange>,
    replace: &mut bool,
) {
    for (name, attr) in &block.attributes {
        let before = non_null(prior.and_then(|p| p.get(name))).cloned();
        let after = non_null(planned.get(name)).cloned();
        if before != after {
            if attr.has_modifier(PlanModifier::RequiresReplace) {
                *replace = true;
            }
            changes.push(AttributeChange::new(join_path(path, name), before, after));
        }
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        let before = prior.and_then(|p| p.get(name)).and_then(Value::as_object);
        let after = planned.get(name).and_then(Value::as_object);
        match (before, after) {
            (None, None) => {}
            (Some(before), Some(after)) => {
                diff_block(&nested.block, Some(before), after, &block_path, changes, replace);
            }
            (before, after) => {
                changes.push(AttributeChange::new(
                    block_path,
                    before.cloned().map(Value::Object),
                    after.cloned().map(Value::Object),
                ));
            }
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string().use_state_for_unknown())
            .with_attribute("tvdb_id", Attribute::required_int32().requires_replace())
            .with_attribute("title", Attribute::optional_string().optional_computed())
            .with_attribute("path", Attribute::required_string())
            .with_block(
                "add_options",
                NestedBlock::optional(
                    Block::new().with_attribute("monitor", Attribute::optional_string()),
                ),
            )
    }

    fn prior() -> Value {
        json!({
            "id": "12",
            "tvdb_id": 81189,
            "title": "Breaking Bad",
            "path": "/tv",
            "add_options": null
        })
    }

    #[test]
    fn test_plan_create() {
        let plan = plan_resource_change(&schema(), None, &json!({"tvdb_id": 81189, "path": "/tv"}));

        assert!(!plan.requires_replace);
        assert_eq!(plan.unknown_attributes, vec!["id", "title"]);
        assert_eq!(plan.planned_state["id"], Value::Null);
        assert_eq!(plan.planned_state["path"], "/tv");
        assert_eq!(plan.planned_state["add_options"], Value::Null);

        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["path", "tvdb_id"]);
        assert!(plan.changes.iter().all(|c| c.before.is_none()));
    }

    #[test]
    fn test_plan_no_change_keeps_computed() {
        let plan = plan_resource_change(
            &schema(),
            Some(&prior()),
            &json!({"tvdb_id": 81189, "path": "/tv"}),
        );
        assert!(!plan.has_changes());
        assert_eq!(plan.planned_state, prior());
    }

    #[test]
    fn test_plan_update_marks_computed_unknown() {
        let plan = plan_resource_change(
            &schema(),
            Some(&prior()),
            &json!({"tvdb_id": 81189, "path": "/anime"}),
        );

        assert!(!plan.requires_replace);
        // id keeps its state, title becomes unknown
        assert_eq!(plan.planned_state["id"], "12");
        assert_eq!(plan.unknown_attributes, vec!["title"]);
        assert_eq!(plan.planned_state["title"], Value::Null);

        let path_change = plan.changes.iter().find(|c| c.path == "path").unwrap();
        assert_eq!(path_change.before, Some(json!("/tv")));
        assert_eq!(path_change.after, Some(json!("/anime")));
    }

    #[test]
    fn test_plan_configured_computed_value() {
        let plan = plan_resource_change(
            &schema(),
            Some(&prior()),
            &json!({"tvdb_id": 81189, "path": "/tv", "title": "Breaking Bad (2008)"}),
        );
        assert!(plan.unknown_attributes.is_empty());
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "title");
    }

    #[test]
    fn test_plan_requires_replace() {
        let plan = plan_resource_change(
            &schema(),
            Some(&prior()),
            &json!({"tvdb_id": 1, "path": "/tv"}),
        );
        assert!(plan.requires_replace);
    }

    #[test]
    fn test_plan_nested_block_changes() {
        let mut with_options = prior();
        with_options["add_options"] = json!({"monitor": "all"});

        let plan = plan_resource_change(
            &schema(),
            Some(&with_options),
            &json!({"tvdb_id": 81189, "path": "/tv", "add_options": {"monitor": "future"}}),
        );
        assert!(plan.changes.iter().any(|c| c.path == "add_options.monitor"));

        let plan = plan_resource_change(
            &schema(),
            Some(&prior()),
            &json!({"tvdb_id": 81189, "path": "/tv", "add_options": {}}),
        );
        assert_eq!(plan.changes.len(), 2);
        assert!(plan.changes.iter().any(|c| c.path == "add_options"
            && c.before.is_none()
            && c.after == Some(json!({"monitor": null}))));
    }

    #[test]
    fn test_plan_destroy() {
        let plan = plan_resource_change(&schema(), Some(&prior()), &Value::Null);
        assert_eq!(plan.planned_state, Value::Null);
        assert!(!plan.requires_replace);
        assert_eq!(plan.changes.len(), 4);
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
    }
}
