pub mod assets;
pub mod auth;
pub mod decisions;
pub mod eligibility;
pub mod events;
pub mod funds;
pub mod health;
pub mod investors;
pub mod onboarding;
pub mod rules;
pub mod transfers;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                             register (public)
/// /auth/login                                login (public)
/// /auth/me                                   current user (requires auth)
///
/// /investors                                 list, create
/// /investors/{id}                            get, update, delete
/// /investors/{id}/kyc                        update KYC status (PUT)
/// /investors/{id}/holdings                   investor's holdings (GET)
///
/// /funds                                     list, create
/// /funds/{id}                                get, update
/// /funds/{id}/criteria                       eligibility criteria (GET, POST)
///
/// /assets                                    list, create
/// /assets/{id}                               get, update
/// /assets/{id}/holdings                      list, create
/// /assets/{id}/transfers                     transfer history (GET)
/// /assets/{id}/rule-sets                     versions (GET), publish (POST)
/// /assets/{id}/rule-sets/active              active version (GET)
/// /assets/{id}/rule-sets/{version}           specific version (GET)
/// /assets/{id}/rules                         composite rules (GET, POST)
///
/// /rules/fields                              known condition fields (GET)
/// /rules/{id}                                update, delete composite rule
///
/// /eligibility/check                         run eligibility checks (POST)
///
/// /transfers                                 execute (POST)
/// /transfers/validate                        validate without executing (POST)
/// /transfers/simulate                        what-if simulation (POST)
/// /transfers/pending                         pending approvals (GET)
/// /transfers/{id}                            get transfer (GET)
/// /transfers/{id}/approve                    approve pending transfer (POST)
/// /transfers/{id}/reject                     reject pending transfer (POST)
///
/// /onboarding                                list (?status), apply (POST)
/// /onboarding/{id}                           get application (GET)
/// /onboarding/{id}/check-eligibility         run eligibility review (POST)
/// /onboarding/{id}/approve                   approve application (POST)
/// /onboarding/{id}/reject                    reject application (POST)
/// /onboarding/{id}/allocate                  allocate units (POST)
///
/// /decisions                                 recent records (GET)
/// /decisions/verify-chain                    hash chain verification (GET)
/// /decisions/subject/{type}/{id}             records for a subject (GET)
/// /decisions/{id}                            get record (GET)
///
/// /events                                    recent events (GET)
/// /events/entity/{type}/{id}                 events for an entity (GET)
///
/// /webhooks                                  list, register (GET, POST)
/// /webhooks/{id}                             delete (DELETE)
/// /webhooks/{id}/disable                     disable (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, current user).
        .nest("/auth", auth::router())
        // Investor registry and KYC.
        .nest("/investors", investors::router())
        // Fund structures and eligibility criteria.
        .nest("/funds", funds::router())
        // Assets and asset-scoped holdings, transfers, and rules.
        .nest("/assets", assets::router())
        // Asset-independent rule endpoints.
        .nest("/rules", rules::router())
        // Standalone eligibility checks.
        .nest("/eligibility", eligibility::router())
        // Transfer validation, execution, and approval queue.
        .nest("/transfers", transfers::router())
        // Investor onboarding workflow.
        .nest("/onboarding", onboarding::router())
        // Append-only decision record chain.
        .nest("/decisions", decisions::router())
        // Persisted event log.
        .nest("/events", events::router())
        // Webhook subscriptions.
        .nest("/webhooks", webhooks::router())
}
