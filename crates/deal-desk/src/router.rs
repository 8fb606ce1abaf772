use crate::reports::ReportError;
use crate::service::DealDeskService;
use crate::synthesis::{DealContext, DealQuery};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Dashboard endpoints, one per view plus the ranked decision queue.
pub fn deal_router(service: Arc<DealDeskService>) -> Router {
    Router::new()
        .route("/api/deal/summary", get(summary_handler))
        .route("/api/deal/analysis", get(analysis_handler))
        .route("/api/deal/risk", get(risk_handler))
        .route("/api/deal/documents", get(documents_handler))
        .route("/api/deal/customer", get(customer_handler))
        .route("/api/deal/inquiry", get(inquiry_handler))
        .route("/api/deal/decision-queue", get(decision_queue_handler))
        .with_state(service)
}

fn resolve(
    service: &DealDeskService,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Result<DealContext, Response> {
    match query {
        Ok(Query(query)) => Ok(service.context(query)),
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
            });
            Err((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response())
        }
    }
}

fn respond<T: Serialize>(result: Result<T, ReportError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => {
            tracing::error!(%error, "dashboard payload rejected");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn summary_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.summary(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn analysis_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.analysis(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn risk_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.risk(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn documents_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.documents(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn customer_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.customer(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn inquiry_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.inquiry(&ctx).await),
        Err(response) => response,
    }
}

pub(crate) async fn decision_queue_handler(
    State(service): State<Arc<DealDeskService>>,
    query: Result<Query<DealQuery>, QueryRejection>,
) -> Response {
    match resolve(&service, query) {
        Ok(ctx) => respond(service.decision_queue(&ctx).await),
        Err(response) => response,
    }
}
