//! Transfer rule evaluation: pure logic, no database access.
//!
//! Three layers, evaluated in order by [`builtin::validate_transfer`]:
//!
//! 1. [`builtin`]: the fixed structural checks every asset gets
//!    (qualification, lockup, whitelists, balance, concentration, cap, KYC).
//! 2. [`composite`]: operator-defined AND/OR/NOT rules layered on top.
//! 3. [`condition`]: the single-condition evaluator both share.

pub mod builtin;
pub mod composite;
pub mod condition;
pub mod context;
