//! Revision and diff engine.
//!
//! Computes field-level differences between a content item's live state
//! and a proposed state. The pending change is represented as data (a map
//! of field to `{from, to}`) rather than a second copy of the item, which
//! keeps merge and conflict detection explicit and serializable across a
//! request boundary.

use std::collections::BTreeMap;

use chapterhub_common::{AppError, AppResult};
use chapterhub_db::entities::content_item;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// The editable fields of a content item.
///
/// This is the projection the diff engine operates on; lifecycle and
/// review bookkeeping columns are deliberately outside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContentFields {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub hero_image_id: Option<String>,
    pub attachment_ids: Vec<String>,
}

impl ContentFields {
    /// Extract the editable fields from a stored content item.
    #[must_use]
    pub fn from_model(model: &content_item::Model) -> Self {
        Self {
            title: model.title.clone(),
            body: model.body.clone(),
            excerpt: model.excerpt.clone(),
            tags: serde_json::from_value(model.tags.clone()).unwrap_or_default(),
            category: model.category.clone(),
            featured: model.featured,
            hero_image_id: model.hero_image_id.clone(),
            attachment_ids: serde_json::from_value(model.attachment_ids.clone())
                .unwrap_or_default(),
        }
    }
}

/// One changed field: the live value the change was computed against and
/// the proposed replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: Value,
    pub to: Value,
}

/// Minimal field-level diff, keyed by field name.
///
/// A `BTreeMap` keeps key order deterministic for summaries and for the
/// serialized form stored on the item.
pub type Patch = BTreeMap<String, FieldChange>;

fn diff_field<T: Serialize + PartialEq>(patch: &mut Patch, name: &str, live: &T, proposed: &T) {
    if live != proposed {
        patch.insert(
            name.to_string(),
            FieldChange {
                from: json!(live),
                to: json!(proposed),
            },
        );
    }
}

/// Compute the minimal field-level diff between live and proposed state.
///
/// Fields compare by value; unchanged fields are omitted, so
/// `compute_diff(a, a)` is empty.
#[must_use]
pub fn compute_diff(live: &ContentFields, proposed: &ContentFields) -> Patch {
    let mut patch = Patch::new();
    diff_field(&mut patch, "title", &live.title, &proposed.title);
    diff_field(&mut patch, "body", &live.body, &proposed.body);
    diff_field(&mut patch, "excerpt", &live.excerpt, &proposed.excerpt);
    diff_field(&mut patch, "tags", &live.tags, &proposed.tags);
    diff_field(&mut patch, "category", &live.category, &proposed.category);
    diff_field(&mut patch, "featured", &live.featured, &proposed.featured);
    diff_field(
        &mut patch,
        "hero_image_id",
        &live.hero_image_id,
        &proposed.hero_image_id,
    );
    diff_field(
        &mut patch,
        "attachment_ids",
        &live.attachment_ids,
        &proposed.attachment_ids,
    );
    patch
}

/// Derive the human-readable change summary from a patch.
///
/// The summary is a pure function of the patch keys, never free text.
#[must_use]
pub fn summarize(patch: &Patch) -> String {
    if patch.is_empty() {
        return "no changes".to_string();
    }
    let fields: Vec<&str> = patch.keys().map(String::as_str).collect();
    format!("{} changed", fields.join(", "))
}

/// Apply a patch to the live state it was computed against.
///
/// Every patch entry's recorded `from` value must still equal the current
/// live value; on any mismatch the merge is refused with a conflict error
/// naming the stale fields rather than silently overwriting newer state.
pub fn apply_patch(live: &ContentFields, patch: &Patch) -> AppResult<ContentFields> {
    let mut live_value = serde_json::to_value(live)
        .map_err(|e| AppError::Internal(format!("Failed to serialize live fields: {e}")))?;

    let obj = live_value
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("Live fields did not serialize to a map".to_string()))?;

    let mut stale: Vec<&str> = Vec::new();
    for (field, change) in patch {
        match obj.get(field.as_str()) {
            Some(current) if *current == change.from => {}
            Some(_) => stale.push(field),
            None => {
                return Err(AppError::Validation(format!(
                    "Patch references unknown field '{field}'"
                )));
            }
        }
    }
    if !stale.is_empty() {
        return Err(AppError::Conflict(format!(
            "Live content has changed since the revision was staged: {}",
            stale.join(", ")
        )));
    }

    for (field, change) in patch {
        obj.insert(field.clone(), change.to.clone());
    }

    serde_json::from_value(live_value)
        .map_err(|e| AppError::Validation(format!("Patch produced invalid content fields: {e}")))
}

/// Serialize a patch for storage on the content item.
pub fn patch_to_json(patch: &Patch) -> AppResult<Value> {
    serde_json::to_value(patch)
        .map_err(|e| AppError::Internal(format!("Failed to serialize patch: {e}")))
}

/// Deserialize a stored patch.
///
/// A malformed stored patch is a validation error, not a panic.
pub fn patch_from_json(value: &Value) -> AppResult<Patch> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Validation(format!("Malformed stored patch: {e}")))
}
