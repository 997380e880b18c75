mod common;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use common::{targets, Harness, RecordingLedger, RecordingNotifier, TestServer};

fn is_sale_timestamp(s: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
}

#[tokio::test]
async fn toy_sale_is_recorded_and_announced() {
    let harness = Harness::healthy();
    let srv = TestServer::spawn(harness.app.clone()).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/3d-toy-sale/", srv.base_url))
        .json(&json!({
            "item": "Марк",
            "material": "Золотой",
            "price": "40",
            "paymentType": "Карта"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": "success", "message": "Sale processed successfully"})
    );

    let rows = harness.ledger.rows();
    assert_eq!(rows.len(), 1);
    let (target, row) = &rows[0];
    assert_eq!(target, &targets().toy);
    assert!(is_sale_timestamp(&row.cells()[0]), "got {:?}", row.cells()[0]);
    assert_eq!(&row.cells()[1..], ["Марк", "Золотой", "40", "Карта"]);

    assert_eq!(
        harness.notifier.messages(),
        ["Фигурка: Марк\nПластик: Золотой\nПродано за: 40\nТип оплаты: Карта"]
    );
}

#[tokio::test]
async fn jewelry_sale_uses_four_columns_and_caller_time() {
    let harness = Harness::healthy();
    let srv = TestServer::spawn(harness.app.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/jewelry-sale/", srv.base_url))
        .json(&json!({
            "time": "2025-11-18 22:45:48",
            "item": "Браслет",
            "price": "1 200",
            "paymentType": "Наличные"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let rows = harness.ledger.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, targets().jewelry);
    assert_eq!(
        rows[0].1.cells(),
        ["2025-11-18 22:45:48", "Браслет", "1 200", "Наличные"]
    );
    assert_eq!(
        harness.notifier.messages(),
        ["Товар: Браслет\nПродано за: 1 200\nТип оплаты: Наличные"]
    );
}

#[tokio::test]
async fn empty_item_is_rejected_without_touching_sinks() {
    let harness = Harness::healthy();
    let srv = TestServer::spawn(harness.app.clone()).await;
    let client = reqwest::Client::new();

    for path in ["3d-toy-sale/", "jewelry-sale/"] {
        for body in [json!({"item": ""}), json!({"price": "40"}), json!({"item": null})] {
            let res = client
                .post(format!("{}/{}", srv.base_url, path))
                .json(&body)
                .send()
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(res.text().await.unwrap(), "Missing required field: item");
        }
    }

    assert!(harness.ledger.rows().is_empty());
    assert!(harness.notifier.messages().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let harness = Harness::healthy();
    let srv = TestServer::spawn(harness.app.clone()).await;
    let client = reqwest::Client::new();

    for body in ["{\"item\": ", "[\"Марк\"]", "", "{\"item\": 42}"] {
        let res = client
            .post(format!("{}/3d-toy-sale/", srv.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(
            res.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(res.text().await.unwrap(), "Invalid request body");
    }

    assert!(harness.ledger.rows().is_empty());
    assert!(harness.notifier.messages().is_empty());
}

#[tokio::test]
async fn ledger_failure_is_a_partial_failure_but_still_notifies() {
    let harness = Harness::new(
        RecordingLedger {
            fail: true,
            ..Default::default()
        },
        RecordingNotifier::default(),
    );
    let srv = TestServer::spawn(harness.app.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/3d-toy-sale/", srv.base_url))
        .json(&json!({"item": "Марк", "material": "Золотой", "price": "40", "paymentType": "Карта"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.text().await.unwrap(),
        "Partial failure: some operations failed"
    );
    assert_eq!(harness.ledger.rows().len(), 1);
    assert_eq!(harness.notifier.messages().len(), 1);
}

#[tokio::test]
async fn notifier_failure_is_a_partial_failure_after_the_row_is_written() {
    let harness = Harness::new(
        RecordingLedger::default(),
        RecordingNotifier {
            fail: true,
            ..Default::default()
        },
    );
    let srv = TestServer::spawn(harness.app.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/jewelry-sale/", srv.base_url))
        .json(&json!({"item": "Кольцо", "price": "25", "paymentType": "Карта"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.ledger.rows().len(), 1);
    assert_eq!(harness.notifier.messages().len(), 1);
}

#[tokio::test]
async fn health_is_ok_with_empty_body() {
    let srv = TestServer::spawn(Harness::healthy().app).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_requests_each_reach_both_sinks() {
    let harness = Harness::healthy();
    let srv = TestServer::spawn(harness.app.clone()).await;
    let client = reqwest::Client::new();

    let requests = (0..20).map(|i| {
        let client = client.clone();
        let url = format!("{}/3d-toy-sale", srv.base_url);
        async move {
            client
                .post(url)
                .json(&json!({"item": format!("Фигурка {i}")}))
                .send()
                .await
                .unwrap()
                .status()
        }
    });
    let handles: Vec<_> = requests.map(tokio::spawn).collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(harness.ledger.rows().len(), 20);
    assert_eq!(harness.notifier.messages().len(), 20);
}

#[tokio::test]
async fn response_waits_for_a_slow_ledger() {
    let harness = Harness::new(
        RecordingLedger {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        },
        RecordingNotifier::default(),
    );
    let srv = TestServer::spawn(harness.app.clone()).await;

    let started = std::time::Instant::now();
    let res = reqwest::Client::new()
        .post(format!("{}/3d-toy-sale/", srv.base_url))
        .json(&json!({"item": "Марк"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(harness.ledger.rows().len(), 1);
    assert_eq!(harness.notifier.messages().len(), 1);
}
