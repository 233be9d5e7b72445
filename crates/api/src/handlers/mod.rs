pub mod assets;
pub mod auth;
pub mod decisions;
pub mod eligibility;
pub mod events;
pub mod funds;
pub mod investors;
pub mod onboarding;
pub mod rules;
pub mod transfers;
pub mod webhooks;
