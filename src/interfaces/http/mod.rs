//! HTTP surface of the relay.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST/GET /account-balance` | cached balance as plain text |
//! | `POST /webhook` | signed intake from the banking API |
//! | `POST /register` | add a subscriber (`?class=raw` for raw subscribers) |
//! | `POST /process` | pipeline trigger for pushed queue messages |

pub mod error;
pub mod handlers;

use crate::application::intake::IntakeService;
use crate::application::pipeline::TransactionPipeline;
use crate::domain::ports::BalanceStoreHandle;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TransactionPipeline>,
    pub intake: Arc<IntakeService>,
    pub store: BalanceStoreHandle,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/account-balance",
            get(handlers::account_balance).post(handlers::account_balance),
        )
        .route("/webhook", post(handlers::webhook))
        .route("/register", post(handlers::register))
        .route("/process", post(handlers::process))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
