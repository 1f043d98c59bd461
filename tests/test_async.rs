//! Async client tests: dispatch through the blocking pool and deadlines.

#![cfg(feature = "async")]

mod common;

use serde_json::json;
use shopmetrics::{AsyncShopMetrics, Granularity, Metric, MetricsError, ShopMetrics};
use std::time::Duration;

fn sample_client(deadline: Duration) -> (AsyncShopMetrics, tempfile::TempDir) {
    let (conn, tmp) = common::setup_sample_db();
    (AsyncShopMetrics::new(ShopMetrics::from_connection(conn), deadline), tmp)
}

#[tokio::test(flavor = "multi_thread")]
async fn metric_runs_on_blocking_pool() {
    let (client, _tmp) = sample_client(Duration::from_secs(10));

    let rows = client.metric(Metric::SalesGrowthRate, Some("yearly")).await.unwrap();
    assert_eq!(rows, json!([{"bucket": "2024", "totalSales": 35.0, "growthRate": 0.0}]));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_exposes_typed_queries() {
    let (client, _tmp) = sample_client(Duration::from_secs(10));

    let geo = client
        .run(|m| m.geography().distribution(Granularity::Monthly))
        .await
        .unwrap();
    assert_eq!(geo.len(), 3);
    assert_eq!(client.collections().await.unwrap(), vec!["customers", "orders"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_all_complete() {
    let (client, _tmp) = sample_client(Duration::from_secs(10));
    let client = std::sync::Arc::new(client);

    let handles: Vec<_> = Metric::ALL
        .into_iter()
        .map(|metric| {
            let client = client.clone();
            tokio::spawn(async move { client.metric(metric, None).await })
        })
        .collect();

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert!(value.is_array());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn deadline_breach_is_store_unavailable() {
    let (client, _tmp) = sample_client(Duration::from_millis(20));

    let err = client
        .run(|_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MetricsError::StoreUnavailable(_)), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn builder_reports_missing_exports_on_first_query() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let client = AsyncShopMetrics::builder()
        .data_dir(tmp_dir.path())
        .deadline(Duration::from_secs(5))
        .build()
        .await
        .unwrap();
    assert_eq!(client.deadline(), Duration::from_secs(5));

    let err = client.metric(Metric::NewCustomersOverTime, None).await.unwrap_err();
    assert!(err.is_store_unavailable());
}

#[tokio::test(flavor = "multi_thread")]
async fn queued_call_gets_its_full_deadline() {
    let (client, _tmp) = sample_client(Duration::from_millis(400));

    let slow = client.run(|_| {
        std::thread::sleep(Duration::from_millis(300));
        Ok(1)
    });
    let queued = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client
            .run(|_| {
                std::thread::sleep(Duration::from_millis(250));
                Ok(2)
            })
            .await
    };

    // the second call waits ~250ms for the engine, then runs for 250ms
    let (slow, queued) = tokio::join!(slow, queued);
    assert_eq!(slow.unwrap(), 1);
    assert_eq!(queued.unwrap(), 2);
}
