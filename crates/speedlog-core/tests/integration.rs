//! Integration tests for speedlog-core.
//!
//! These exercise the engine end to end through a real file:
//! append → scan → stats / windowed series / latest.

use std::fs;

use chrono::{Local, NaiveDateTime, TimeDelta};
use speedlog_core::{LogConfig, LogStore, Measurement, Record, parse_timestamp, series, stats};

fn record(ts: NaiveDateTime, dl: f64, ul: f64, ping: f64) -> Record {
    Record {
        timestamp: ts,
        download_mbps: dl,
        upload_mbps: ul,
        ping_ms: ping,
        server_id: "4242".to_string(),
        server_name: "Speedy (Bergen)".to_string(),
    }
}

fn temp_store() -> (tempfile::TempDir, LogStore) {
    let tmp = tempfile::tempdir().unwrap();
    let store = LogStore::new(tmp.path().join("speed_log.txt"));
    (tmp, store)
}

#[test]
fn appended_records_roundtrip_through_scan() {
    let (_tmp, store) = temp_store();
    let base = parse_timestamp("2025-03-01T08:15:30.5").unwrap();
    let written: Vec<Record> = (0..5)
        .map(|i| record(base + TimeDelta::hours(i), 100.0 + i as f64, 20.0, 9.5))
        .collect();
    for r in &written {
        store.append(r).unwrap();
    }

    let scanned: Vec<Record> = store.scan().unwrap().map(Result::unwrap).collect();
    assert_eq!(scanned, written);

    let again: Vec<Record> = store.scan().unwrap().map(Result::unwrap).collect();
    assert_eq!(again, scanned);
}

#[test]
fn malformed_middle_line_is_ignored() {
    let (_tmp, store) = temp_store();
    fs::write(
        store.path(),
        "2025-01-01T12:00:00,100.0,50.0,10.0,1,S1\n\
         2025-01-01T12:30:00,oops\n\
         2025-01-01T13:00:00,200.0,100.0,20.0,2,S2\n",
    )
    .unwrap();

    let stats = store.stats().unwrap().unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.avg_download, 150.0);
    assert_eq!(stats.avg_upload, 75.0);
    assert_eq!(stats.avg_ping, 15.0);
    assert_eq!(stats.min_download, 100.0);
    assert_eq!(stats.max_download, 200.0);
}

#[test]
fn missing_file_answers_none_everywhere() {
    let (_tmp, store) = temp_store();
    assert!(store.stats().unwrap().is_none());
    assert!(store.latest().unwrap().is_none());
    assert!(store.series(30, Local::now().naive_local()).unwrap().is_none());
    assert!(store.tail_line().unwrap().is_none());
    assert!(!store.path().exists());
}

#[test]
fn window_uses_full_history_for_cumulative_average() {
    let (_tmp, store) = temp_store();
    let now = parse_timestamp("2025-06-30T12:00:00").unwrap();
    store
        .append(&record(now - TimeDelta::days(40), 10.0, 1.0, 5.0))
        .unwrap();
    store
        .append(&record(now - TimeDelta::days(5), 20.0, 3.0, 5.0))
        .unwrap();

    let series = store.series(30, now).unwrap().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.downloads, vec![20.0]);
    assert_eq!(series.cumulative_avg_downloads, vec![15.0]);
    assert_eq!(series.cumulative_avg_uploads, vec![2.0]);

    // Same answer from the free functions over an explicit scan.
    let direct = series::build(store.scan().unwrap(), series::window_days(30), now)
        .unwrap()
        .unwrap();
    assert_eq!(direct, series);
}

#[test]
fn latest_matches_last_scanned_record() {
    for n in [1usize, 2, 1000] {
        let tmp = tempfile::tempdir().unwrap();
        let store = LogStore::from_config(&LogConfig {
            path: tmp.path().join("speed_log.txt"),
            tail_stride: 256,
        });
        let base = parse_timestamp("2025-01-01T00:00:00").unwrap();
        for i in 0..n {
            store
                .append(&record(
                    base + TimeDelta::minutes(i as i64 * 30),
                    i as f64 * 1.5,
                    i as f64 / 4.0,
                    (i % 17) as f64,
                ))
                .unwrap();
        }

        let last = store.scan().unwrap().map(Result::unwrap).last();
        assert_eq!(store.latest().unwrap(), last, "n = {n}");
    }
}

#[test]
fn stats_from_free_function_match_store() {
    let (_tmp, store) = temp_store();
    let now = Local::now().naive_local();
    for dl in [10.0, 30.0, 20.0] {
        store.append(&record(now, dl, dl / 10.0, 12.0)).unwrap();
    }
    let via_store = store.stats().unwrap();
    let via_fn = stats::compute(store.scan().unwrap()).unwrap();
    assert_eq!(via_store, via_fn);
    let s = via_store.unwrap();
    assert_eq!(s.min_download, 10.0);
    assert_eq!(s.max_download, 30.0);
    assert_eq!(s.min_upload, 1.0);
    assert_eq!(s.max_upload, 3.0);
}

#[test]
fn logged_measurement_is_latest() {
    let (_tmp, store) = temp_store();
    let logged = store
        .log_measurement(Measurement {
            download_mbps: 512.25,
            upload_mbps: 48.0,
            ping_ms: 3.75,
            server_id: "N/A".to_string(),
            server_name: "Acme, Inc (Tromsø)".to_string(),
        })
        .unwrap();
    assert_eq!(logged.server_name, "Acme  Inc (Tromsø)");
    let latest = store.latest().unwrap().unwrap();
    assert_eq!(latest, logged);
}

#[test]
fn separate_stores_do_not_interfere() {
    let (_a_dir, a) = temp_store();
    let (_b_dir, b) = temp_store();
    let now = Local::now().naive_local();
    a.append(&record(now, 1.0, 1.0, 1.0)).unwrap();
    assert_eq!(a.stats().unwrap().unwrap().count, 1);
    assert!(b.stats().unwrap().is_none());
}
