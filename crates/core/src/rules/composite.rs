//! Composite rule evaluation: AND / OR / NOT over field conditions.
//!
//! `NOT` is defined as the negation of the conjunction of the condition
//! list: a NOT rule passes iff `AND(conditions)` is false. For a single
//! condition this degenerates to plain negation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decision::DecisionCheck;
use crate::error::CoreError;
use crate::rules::condition::{evaluate_condition, RuleCondition};
use crate::rules::context::ValidationContext;

/// Boolean combinator of a composite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "NOT")]
    Not,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(LogicalOperator::And),
            "OR" => Ok(LogicalOperator::Or),
            "NOT" => Ok(LogicalOperator::Not),
            other => Err(CoreError::Validation(format!(
                "Unknown rule operator '{other}'. Must be AND, OR, or NOT"
            ))),
        }
    }
}

/// Severity of a composite rule. Advisory metadata only: every failing
/// enabled rule blocks regardless of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for RuleSeverity {
    fn default() -> Self {
        RuleSeverity::Medium
    }
}

/// An operator-authored rule layered on top of the built-in checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeRuleSpec {
    pub name: String,
    pub description: String,
    pub operator: LogicalOperator,
    pub conditions: Vec<RuleCondition>,
    pub enabled: bool,
    #[serde(default)]
    pub severity: RuleSeverity,
    /// Optional jurisdiction scope: when set, the rule only applies to
    /// transfers whose receiver is in this jurisdiction.
    pub jurisdiction: Option<String>,
}

impl CompositeRuleSpec {
    /// Reject rules that could never evaluate meaningfully. Run at
    /// creation time so bad rules never reach the decision path.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Rule name must not be empty".into()));
        }
        if self.conditions.is_empty() {
            return Err(CoreError::Validation(
                "Rule must have at least one condition".into(),
            ));
        }
        Ok(())
    }
}

/// Evaluate a composite rule against the context.
///
/// Returns `None` for rules that emit no check: disabled rules, and
/// jurisdiction-scoped rules that do not apply to the receiver.
pub fn evaluate_composite_rule(
    rule: &CompositeRuleSpec,
    ctx: &ValidationContext,
) -> Option<DecisionCheck> {
    if !rule.enabled {
        return None;
    }
    if let Some(scope) = &rule.jurisdiction {
        if scope != &ctx.to_investor.jurisdiction {
            return None;
        }
    }

    let passed = match rule.operator {
        LogicalOperator::And => rule.conditions.iter().all(|c| evaluate_condition(c, ctx)),
        LogicalOperator::Or => rule.conditions.iter().any(|c| evaluate_condition(c, ctx)),
        // NOT(AND(conditions)): passes iff the conjunction is false.
        LogicalOperator::Not => !rule.conditions.iter().all(|c| evaluate_condition(c, ctx)),
    };

    let message = if passed {
        format!("{}: passed", rule.name)
    } else {
        format!("{}: failed ({})", rule.name, rule.description)
    };

    Some(DecisionCheck {
        rule: rule.name.clone(),
        passed,
        message,
    })
}
