//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod dev;
pub mod health;
pub mod transactions;
pub mod trial_balance;
pub mod wallet;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(wallet::routes())
        .merge(transactions::routes())
        .merge(trial_balance::routes())
        .merge(dev::routes())
}
