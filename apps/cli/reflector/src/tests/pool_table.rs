use crate::commands::pool::format_pool;

use models::{Instance, LATENCY_UNUSABLE};

#[test]
fn given_empty_pool_when_formatting_then_only_header() {
    let table = format_pool(&[]);

    assert_eq!(table.lines().count(), 1);
    assert!(table.starts_with("LOCAL"));
}

#[test]
fn given_mixed_instances_when_formatting_then_latency_column_reflects_health() {
    // GIVEN: One healthy, one unreachable and one unprobed instance
    let mut healthy = Instance::new("wss://a.example.org", "127.0.0.1:40001").with_label("a");
    healthy.latency = Some(12);
    let mut down = Instance::new("wss://b.example.org", "127.0.0.1:40002");
    down.latency = Some(LATENCY_UNUSABLE);
    let unprobed = Instance::new("wss://c.example.org", "127.0.0.1:40003");

    // WHEN: Formatting
    let table = format_pool(&[healthy, down, unprobed]);
    let rows: Vec<&str> = table.lines().skip(1).collect();

    // THEN: One row each with the matching latency cell
    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("12ms") && rows[0].contains("wss://a.example.org"));
    assert!(rows[1].contains("down"));
    assert!(rows[2].contains(" - "));
}
