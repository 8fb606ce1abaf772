use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use deal_desk::router::deal_router;
use deal_desk::service::{Clock, DealDeskService, SimulatedLatency};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_with(latency: SimulatedLatency) -> Router {
    let as_of = Utc
        .with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
        .single()
        .expect("valid timestamp");
    deal_router(Arc::new(
        DealDeskService::new(latency).with_clock(Clock::Fixed(as_of)),
    ))
}

async fn fetch(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn every_view_endpoint_answers_with_camel_case_json() {
    let cases = [
        ("summary", "riskBreakdown"),
        ("analysis", "qoeMetrics"),
        ("risk", "tieOuts"),
        ("documents", "coverage"),
        ("customer", "topTrend"),
        ("inquiry", "inquiries"),
        ("decision-queue", "readiness"),
    ];
    for (path, field) in cases {
        let uri = format!("/api/deal/{path}?deal=Zyphon+Holdings&period=Quarterly&basis=Normalized");
        let (status, body) = fetch(router_with(SimulatedLatency::none()), &uri).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert!(!body[field].is_null(), "{path} is missing {field}");
    }
}

#[tokio::test]
async fn blank_deal_falls_back_to_the_default() {
    let (_, blank) = fetch(router_with(SimulatedLatency::none()), "/api/deal/inquiry?deal=+").await;
    let (_, default) = fetch(router_with(SimulatedLatency::none()), "/api/deal/inquiry").await;
    assert_eq!(blank, default);
}

#[tokio::test]
async fn unknown_basis_is_rejected_before_building() {
    let (status, body) = fetch(
        router_with(SimulatedLatency::none()),
        "/api/deal/decision-queue?basis=GAAP",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn risk_score_agrees_between_summary_risk_and_queue() {
    let query = "deal=Tesla&period=Annual&basis=Pro+Forma";
    let (_, risk) = fetch(router_with(SimulatedLatency::none()), &format!("/api/deal/risk?{query}")).await;
    let (_, summary) =
        fetch(router_with(SimulatedLatency::none()), &format!("/api/deal/summary?{query}")).await;
    let (_, queue) = fetch(
        router_with(SimulatedLatency::none()),
        &format!("/api/deal/decision-queue?{query}"),
    )
    .await;

    let score = risk["riskScore"].as_f64().expect("numeric risk score");
    let overall = summary["metrics"]
        .as_array()
        .and_then(|metrics| metrics.iter().find(|metric| metric["id"] == "overall-risk"))
        .expect("overall risk metric");
    assert_eq!(overall["value"], format!("{score:.1} / 10"));

    let failing = risk["tieOuts"]
        .as_array()
        .expect("tie-outs")
        .iter()
        .any(|row| row["status"] == "Fail");
    if failing {
        assert_eq!(queue["readiness"], "Blocked");
    }
}

#[tokio::test(start_paused = true)]
async fn simulated_latency_delays_the_response() {
    let router = router_with(SimulatedLatency::new(
        Duration::from_millis(250),
        Duration::ZERO,
    ));
    let started = tokio::time::Instant::now();
    let (status, _) = fetch(router, "/api/deal/customer?deal=Apple").await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(250));
}
