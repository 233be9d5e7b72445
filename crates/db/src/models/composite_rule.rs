//! Composite rule entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `composite_rules` table.
///
/// `conditions` holds the JSON array of conditions; it is parsed into
/// `registra_core::rules::composite::CompositeRuleSpec` at evaluation
/// time and validated against the known field registry at creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompositeRule {
    pub id: DbId,
    pub tenant_id: String,
    pub asset_id: DbId,
    pub name: String,
    pub description: String,
    pub operator: String,
    pub conditions: serde_json::Value,
    pub enabled: bool,
    pub severity: String,
    pub jurisdiction: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a composite rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompositeRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub operator: String,
    pub conditions: serde_json::Value,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub severity: Option<String>,
    pub jurisdiction: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// DTO for updating a composite rule. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompositeRule {
    pub name: Option<String>,
    pub description: Option<String>,
    pub operator: Option<String>,
    pub conditions: Option<serde_json::Value>,
    pub enabled: Option<bool>,
    pub severity: Option<String>,
    pub jurisdiction: Option<String>,
}
