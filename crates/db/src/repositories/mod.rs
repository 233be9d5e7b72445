//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods on tenant-scoped
//! tables take the tenant as the second argument; forgetting it is a
//! compile error, not a data leak.

pub mod asset_repo;
pub mod composite_rule_repo;
pub mod decision_record_repo;
pub mod eligibility_criteria_repo;
pub mod event_repo;
pub mod fund_structure_repo;
pub mod holding_repo;
pub mod investor_repo;
pub mod onboarding_repo;
pub mod rule_set_repo;
pub mod transfer_repo;
pub mod user_repo;
pub mod webhook_repo;

pub use asset_repo::AssetRepo;
pub use composite_rule_repo::CompositeRuleRepo;
pub use decision_record_repo::DecisionRecordRepo;
pub use eligibility_criteria_repo::EligibilityCriteriaRepo;
pub use event_repo::EventRepo;
pub use fund_structure_repo::FundStructureRepo;
pub use holding_repo::HoldingRepo;
pub use investor_repo::InvestorRepo;
pub use onboarding_repo::OnboardingRepo;
pub use rule_set_repo::RuleSetRepo;
pub use transfer_repo::TransferRepo;
pub use user_repo::UserRepo;
pub use webhook_repo::WebhookRepo;
