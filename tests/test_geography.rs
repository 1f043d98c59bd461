//! Geographic distribution integration tests.

mod common;

use shopmetrics::models::CityBucket;
use shopmetrics::queries::geography::{city_distribution, GeographyQuery};
use shopmetrics::Granularity;

fn bucket(bucket: &str, customer_count: u64) -> CityBucket {
    CityBucket {
        bucket: bucket.to_string(),
        customer_count,
    }
}

#[test]
fn cities_pivot_into_per_bucket_counts() {
    let (conn, _tmp) = common::setup_sample_db();
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Monthly)
        .unwrap();

    assert_eq!(rows.len(), 3);

    // Ottawa and Toronto tie on 2; name breaks the tie
    assert_eq!(rows[0].city, "Ottawa");
    assert_eq!(rows[0].customer_count, 2);
    assert_eq!(rows[0].data, vec![bucket("2024-01", 1), bucket("2024-02", 1)]);

    assert_eq!(rows[1].city, "Toronto");
    assert_eq!(rows[1].customer_count, 2);
    assert_eq!(rows[1].data, vec![bucket("2024-01", 2)]);

    assert_eq!(rows[2].city, "");
    assert_eq!(rows[2].customer_count, 1);
    assert_eq!(rows[2].data, vec![bucket("2024-02", 1)]);
}

#[test]
fn sorted_by_total_across_buckets() {
    let customers = vec![
        common::customer(1, "2024-01-01", Some("Halifax")),
        common::customer(2, "2024-02-01", Some("Halifax")),
        common::customer(3, "2024-03-01", Some("Halifax")),
        // largest single bucket, smaller total
        common::customer(4, "2024-04-01", Some("Regina")),
        common::customer(5, "2024-04-02", Some("Regina")),
        common::customer(6, "2024-04-03", Some("")),
    ];
    let (conn, _tmp) = common::setup_db(&common::sample_orders(), &customers);
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Monthly)
        .unwrap();

    let order: Vec<(&str, u64)> = rows
        .iter()
        .map(|r| (r.city.as_str(), r.customer_count))
        .collect();
    assert_eq!(order, vec![("Halifax", 3), ("Regina", 2), ("", 1)]);
}

#[test]
fn empty_and_missing_city_share_a_group() {
    let customers = vec![
        common::customer(1, "2024-01-01", Some("")),
        common::customer(2, "2024-01-02", None),
        serde_json::json!({"id": 3, "created_at": "2024-01-03", "default_address": {"city": null}}),
    ];
    let (conn, _tmp) = common::setup_db(&common::sample_orders(), &customers);
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Yearly)
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "");
    assert_eq!(rows[0].customer_count, 3);
    assert_eq!(rows[0].data, vec![bucket("2024", 3)]);
}

#[test]
fn unparseable_signups_are_skipped() {
    let (conn, _tmp) = common::setup_sample_db();
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Yearly)
        .unwrap();

    let total: u64 = rows.iter().map(|r| r.customer_count).sum();
    assert_eq!(total, 5);
}

#[test]
fn city_buckets_are_ascending() {
    let (conn, _tmp) = common::setup_sample_db();
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Daily)
        .unwrap();

    for row in &rows {
        let buckets: Vec<&String> = row.data.iter().map(|b| &b.bucket).collect();
        let mut sorted = buckets.clone();
        sorted.sort();
        assert_eq!(buckets, sorted, "{}", row.city);
    }
}

#[test]
fn serializes_with_nested_data() {
    let (conn, _tmp) = common::setup_sample_db();
    let rows = GeographyQuery::new(&conn)
        .distribution(Granularity::Yearly)
        .unwrap();
    let value = serde_json::to_value(&rows).unwrap();

    assert_eq!(value[0]["city"], "Ottawa");
    assert_eq!(value[0]["customerCount"], 2);
    assert_eq!(value[0]["data"][0]["bucket"], "2024");
    assert_eq!(value[0]["data"][0]["customerCount"], 2);
}

#[test]
fn no_customers_no_rows() {
    assert!(city_distribution(&[], Granularity::Monthly).is_empty());
}

#[test]
fn distribution_is_identical_across_calls() {
    let (conn, _tmp) = common::setup_sample_db();
    let gq = GeographyQuery::new(&conn);

    let first = gq.distribution(Granularity::Daily).unwrap();
    for _ in 0..20 {
        assert_eq!(gq.distribution(Granularity::Daily).unwrap(), first);
    }
}
