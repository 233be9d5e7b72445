//! Single-condition evaluation with a typed field accessor registry.
//!
//! Condition fields are not free-form path strings: every field a rule may
//! reference is a [`ConditionField`] variant with a typed extraction
//! function over the [`ValidationContext`]. Unknown field names fail to
//! parse, so malformed rules are rejected when they are created, never at
//! decision time.
//!
//! Evaluation is fail-closed: a missing context value or a type mismatch
//! makes the comparison false (except `neq`/`not_in`, which pass against
//! absent values), and evaluation never panics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreError;
use crate::rules::context::ValidationContext;

/// A context field a rule condition may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConditionField {
    ToJurisdiction,
    ToAccredited,
    ToInvestorType,
    ToKycStatus,
    FromJurisdiction,
    FromAccredited,
    FromInvestorType,
    TransferUnits,
    HoldingUnits,
    AssetTotalUnits,
}

impl ConditionField {
    /// All recognized field names, for error messages and API discovery.
    pub const KNOWN_FIELDS: &'static [&'static str] = &[
        "to.jurisdiction",
        "to.accredited",
        "to.investor_type",
        "to.kyc_status",
        "from.jurisdiction",
        "from.accredited",
        "from.investor_type",
        "transfer.units",
        "holding.units",
        "asset.total_units",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::ToJurisdiction => "to.jurisdiction",
            ConditionField::ToAccredited => "to.accredited",
            ConditionField::ToInvestorType => "to.investor_type",
            ConditionField::ToKycStatus => "to.kyc_status",
            ConditionField::FromJurisdiction => "from.jurisdiction",
            ConditionField::FromAccredited => "from.accredited",
            ConditionField::FromInvestorType => "from.investor_type",
            ConditionField::TransferUnits => "transfer.units",
            ConditionField::HoldingUnits => "holding.units",
            ConditionField::AssetTotalUnits => "asset.total_units",
        }
    }

    /// Extract this field's value from the context.
    ///
    /// Returns `None` when the underlying data is absent (e.g. the sender
    /// has no holding yet).
    pub fn extract(&self, ctx: &ValidationContext) -> Option<Value> {
        match self {
            ConditionField::ToJurisdiction => Some(json!(ctx.to_investor.jurisdiction)),
            ConditionField::ToAccredited => Some(json!(ctx.to_investor.accredited)),
            ConditionField::ToInvestorType => Some(json!(ctx.to_investor.investor_type.as_str())),
            ConditionField::ToKycStatus => Some(json!(ctx.to_investor.kyc_status.as_str())),
            ConditionField::FromJurisdiction => Some(json!(ctx.from_investor.jurisdiction)),
            ConditionField::FromAccredited => Some(json!(ctx.from_investor.accredited)),
            ConditionField::FromInvestorType => {
                Some(json!(ctx.from_investor.investor_type.as_str()))
            }
            ConditionField::TransferUnits => Some(json!(ctx.transfer.units)),
            ConditionField::HoldingUnits => ctx.from_holding.as_ref().map(|h| json!(h.units)),
            ConditionField::AssetTotalUnits => Some(json!(ctx.asset.total_units)),
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to.jurisdiction" | "investor.jurisdiction" => Ok(ConditionField::ToJurisdiction),
            "to.accredited" | "investor.accredited" => Ok(ConditionField::ToAccredited),
            "to.investor_type" | "investor.investor_type" => Ok(ConditionField::ToInvestorType),
            "to.kyc_status" | "investor.kyc_status" => Ok(ConditionField::ToKycStatus),
            "from.jurisdiction" => Ok(ConditionField::FromJurisdiction),
            "from.accredited" => Ok(ConditionField::FromAccredited),
            "from.investor_type" => Ok(ConditionField::FromInvestorType),
            "transfer.units" => Ok(ConditionField::TransferUnits),
            "holding.units" => Ok(ConditionField::HoldingUnits),
            "asset.total_units" => Ok(ConditionField::AssetTotalUnits),
            other => Err(CoreError::Validation(format!(
                "Unknown condition field '{other}'. Known fields: {}",
                Self::KNOWN_FIELDS.join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for ConditionField {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|e: CoreError| e.to_string())
    }
}

impl From<ConditionField> for String {
    fn from(f: ConditionField) -> String {
        f.as_str().to_string()
    }
}

/// Comparison operator for a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

/// One field comparison inside a composite rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: Value,
}

/// Evaluate a single condition against the context. Never panics.
pub fn evaluate_condition(condition: &RuleCondition, ctx: &ValidationContext) -> bool {
    let actual = condition.field.extract(ctx);

    match condition.operator {
        ConditionOperator::Eq => actual.as_ref() == Some(&condition.value),
        ConditionOperator::Neq => actual.as_ref() != Some(&condition.value),
        ConditionOperator::Gt => compare_numeric(&actual, &condition.value, |a, b| a > b),
        ConditionOperator::Gte => compare_numeric(&actual, &condition.value, |a, b| a >= b),
        ConditionOperator::Lt => compare_numeric(&actual, &condition.value, |a, b| a < b),
        ConditionOperator::Lte => compare_numeric(&actual, &condition.value, |a, b| a <= b),
        ConditionOperator::In => match (&actual, condition.value.as_array()) {
            (Some(v), Some(set)) => set.contains(v),
            _ => false,
        },
        ConditionOperator::NotIn => match condition.value.as_array() {
            Some(set) => match &actual {
                Some(v) => !set.contains(v),
                // Absent values pass a negative set-membership test.
                None => true,
            },
            None => false,
        },
    }
}

/// Numeric comparison, false unless both operands are numbers.
fn compare_numeric(actual: &Option<Value>, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.as_ref().and_then(Value::as_f64), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
