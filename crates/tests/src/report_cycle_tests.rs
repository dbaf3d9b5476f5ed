//! Report Pipeline Tests Against Real Files
//!
//! These tests run full report cycles with a file sink in a temporary
//! directory and read the JSON lines back:
//! - A simulated day of 3-hour cycles producing every rollup kind
//! - Day boundaries splitting output across files
//! - Persistence failures that must not stall counting

use chrono::{DateTime, TimeZone, Utc};
use counter_core::{
    counter::JokeCounter,
    reports::{DailyFileSink, ReportAggregator, ReportKind, ReportRecord, ReportSink},
};
use std::sync::Arc;

use crate::support::agree_pairs;

fn boundary(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn read_records(path: &std::path::Path) -> Vec<ReportRecord> {
    let contents = std::fs::read_to_string(path).unwrap();
    contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect()
}

#[tokio::test]
async fn test_simulated_day_writes_every_rollup_kind() {
    let dir = tempfile::tempdir().unwrap();
    let counter = Arc::new(JokeCounter::new(3));
    let sink = DailyFileSink::new(dir.path());
    let aggregator =
        ReportAggregator::new(Arc::clone(&counter), Arc::new(sink.clone()) as Arc<dyn ReportSink>);

    // Eight cycles at the day's boundaries, one agreement per window.
    for hour in [0, 3, 6, 9, 12, 15, 18, 21] {
        agree_pairs(&counter, 1).await;
        aggregator.run_cycle(boundary(1, hour)).await;
    }

    let records = read_records(&sink.file_for(boundary(1, 0)));
    assert_eq!(records.len(), 15);

    let three_hour: Vec<&ReportRecord> =
        records.iter().filter(|r| r.kind == ReportKind::ThreeHour).collect();
    assert_eq!(three_hour.len(), 8);
    for record in &three_hour {
        assert_eq!(record.joke_count, 1);
        let ip_counts = record.ip_counts.as_ref().unwrap();
        assert_eq!(ip_counts.get("10.0.0.1"), Some(&1));
        assert_eq!(ip_counts.get("10.0.0.2"), Some(&1));
    }

    let six_hour: Vec<u64> = records
        .iter()
        .filter(|r| r.kind == ReportKind::SixHour)
        .map(|r| r.joke_count)
        .collect();
    assert_eq!(six_hour, vec![2, 2, 2, 2]);

    let twelve_hour: Vec<u64> = records
        .iter()
        .filter(|r| r.kind == ReportKind::TwelveHour)
        .map(|r| r.joke_count)
        .collect();
    assert_eq!(twelve_hour, vec![4, 4]);

    let daily: Vec<&ReportRecord> =
        records.iter().filter(|r| r.kind == ReportKind::Daily).collect();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].joke_count, 8);
    assert!(daily[0].ip_counts.is_none());

    // The daily record closes the file for the day.
    assert_eq!(records.last().unwrap().kind, ReportKind::Daily);
}

#[tokio::test]
async fn test_midnight_boundary_splits_files() {
    let dir = tempfile::tempdir().unwrap();
    let counter = Arc::new(JokeCounter::new(3));
    let sink = DailyFileSink::new(dir.path());
    let aggregator =
        ReportAggregator::new(Arc::clone(&counter), Arc::new(sink.clone()) as Arc<dyn ReportSink>);

    agree_pairs(&counter, 1).await;
    aggregator.run_cycle(boundary(1, 21)).await;
    agree_pairs(&counter, 2).await;
    aggregator.run_cycle(boundary(2, 0)).await;

    let day_one = read_records(&sink.file_for(boundary(1, 0)));
    let day_two = read_records(&sink.file_for(boundary(2, 0)));

    assert_eq!(day_one.len(), 1);
    assert_eq!(day_one[0].joke_count, 1);

    // The second cycle lands entirely in the new day's file.
    assert_eq!(day_two.len(), 2);
    assert_eq!(day_two[0].kind, ReportKind::ThreeHour);
    assert_eq!(day_two[0].joke_count, 2);
    assert_eq!(day_two[1].kind, ReportKind::SixHour);
    assert_eq!(day_two[1].joke_count, 3);
}

#[tokio::test]
async fn test_sink_failure_does_not_stall_counting() {
    let dir = tempfile::tempdir().unwrap();
    // A file occupies the sink's directory path, so directory creation fails.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"in the way").unwrap();

    let counter = Arc::new(JokeCounter::new(3));
    let sink = DailyFileSink::new(&blocked);
    let aggregator =
        ReportAggregator::new(Arc::clone(&counter), Arc::new(sink.clone()) as Arc<dyn ReportSink>);

    agree_pairs(&counter, 2).await;
    aggregator.run_cycle(boundary(1, 0)).await;

    // The record is lost but the epoch still rolled.
    assert_eq!(counter.status().await.agreed_count, 0);

    // Once the path clears, the next cycle persists again.
    std::fs::remove_file(&blocked).unwrap();
    agree_pairs(&counter, 1).await;
    aggregator.run_cycle(boundary(1, 3)).await;

    let records = read_records(&sink.file_for(boundary(1, 3)));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].joke_count, 1);
    // The lost window still counted toward the running 6-hour sum.
    assert_eq!(records[1].kind, ReportKind::SixHour);
    assert_eq!(records[1].joke_count, 3);
}

#[tokio::test]
async fn test_epoch_rates_cover_the_closed_window() {
    let dir = tempfile::tempdir().unwrap();
    let counter = Arc::new(JokeCounter::new(3));
    let sink = DailyFileSink::new(dir.path());
    let aggregator =
        ReportAggregator::new(Arc::clone(&counter), Arc::new(sink.clone()) as Arc<dyn ReportSink>);

    // First cycle pins the epoch start to a known boundary.
    aggregator.run_cycle(boundary(1, 0)).await;
    agree_pairs(&counter, 6).await;
    aggregator.run_cycle(boundary(1, 3)).await;

    let records = read_records(&sink.file_for(boundary(1, 0)));
    let second_three_hour = records
        .iter()
        .filter(|r| r.kind == ReportKind::ThreeHour)
        .nth(1)
        .unwrap();

    // 6 jokes over a 3 hour epoch.
    assert_eq!(second_three_hour.joke_count, 6);
    assert!((second_three_hour.rate_hour - 2.0).abs() < 1e-9);
    assert!((second_three_hour.rate_day - 48.0).abs() < 1e-9);
}
