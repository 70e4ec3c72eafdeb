use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, holdings, ledger, plans, review};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api/v1", api())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        // ledger
        .route("/accounts", get(ledger::list_accounts).post(ledger::create_account))
        .route(
            "/accounts/{id}",
            get(ledger::get_account)
                .patch(ledger::update_account)
                .delete(ledger::delete_account),
        )
        .route(
            "/transactions",
            get(ledger::list_transactions).post(ledger::create_transaction),
        )
        .route("/transactions/import", post(ledger::import_transactions))
        .route("/transactions/{id}", delete(ledger::delete_transaction))
        // holdings
        .route(
            "/credit-cards",
            get(holdings::list_credit_cards).post(holdings::create_credit_card),
        )
        .route(
            "/credit-cards/{id}",
            patch(holdings::update_credit_card).delete(holdings::delete_credit_card),
        )
        .route(
            "/investments",
            get(holdings::list_investments).post(holdings::create_investment),
        )
        .route(
            "/investments/{id}",
            patch(holdings::update_investment).delete(holdings::delete_investment),
        )
        .route(
            "/installments",
            get(holdings::list_installments).post(holdings::create_installment),
        )
        .route("/installments/{id}", delete(holdings::delete_installment))
        // plans
        .route("/goals", get(plans::list_goals).post(plans::create_goal))
        .route(
            "/goals/{id}",
            patch(plans::update_goal).delete(plans::delete_goal),
        )
        .route("/expenses", get(plans::list_expenses).post(plans::create_expense))
        .route("/expenses/{id}", delete(plans::delete_expense))
        // review
        .route("/dashboard", get(review::dashboard))
        .route("/analysis/insights", get(review::insights))
        .route("/weekly-review", get(review::current_review))
        .route("/weekly-review/history", get(review::history))
        .route("/weekly-review/{id}/action", patch(review::resolve_action))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
