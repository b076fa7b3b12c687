use ipm_results::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    well: String,
    rate: f64,
    bhp: Option<f64>,
}

fn fresh_store(name: &str) -> ResultStore {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    ResultStore::new(dir).unwrap()
}

fn manifest(id: &str, timestamp: &str) -> BatchManifest {
    BatchManifest {
        batch_id: id.to_string(),
        project: "Field A".to_string(),
        window: None,
        timestamp: timestamp.to_string(),
        tool_version: "0.1.0".to_string(),
        summary: BatchSummary::default(),
    }
}

#[test]
fn appends_accumulate_across_batches() {
    let store = fresh_store("ipm_results_append");
    let first = vec![Sample {
        well: "A12".into(),
        rate: 600.0,
        bhp: Some(2500.0),
    }];
    let second = vec![
        Sample {
            well: "A12".into(),
            rate: 610.0,
            bhp: None,
        },
        Sample {
            well: "B3".into(),
            rate: 90.0,
            bhp: Some(1800.0),
        },
    ];

    store.append(Table::WellTuning, "b1", &first).unwrap();
    store.append(Table::WellTuning, "b2", &second).unwrap();

    let rows: Vec<Row<Sample>> = store.read(Table::WellTuning).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].batch_id, "b1");
    assert_eq!(rows[0].record, first[0]);

    let b2: Vec<Sample> = store.read_batch(Table::WellTuning, "b2").unwrap();
    assert_eq!(b2, second);

    let content = std::fs::read_to_string(store.root().join("well_tuning.jsonl")).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().all(|l| l.contains("\"batch_id\"")));
}

#[test]
fn tables_are_independent() {
    let store = fresh_store("ipm_results_tables");
    store
        .append(
            Table::PipeTuning,
            "b1",
            &[Sample {
                well: "FL1".into(),
                rate: 0.0,
                bhp: None,
            }],
        )
        .unwrap();
    let wells: Vec<Row<Sample>> = store.read(Table::WellTuning).unwrap();
    let pipes: Vec<Row<Sample>> = store.read(Table::PipeTuning).unwrap();
    assert!(wells.is_empty());
    assert_eq!(pipes.len(), 1);
}

#[test]
fn empty_append_creates_nothing() {
    let store = fresh_store("ipm_results_empty");
    store
        .append::<Sample>(Table::NetworkResults, "b1", &[])
        .unwrap();
    assert!(!store.root().join("network_results.jsonl").exists());
}

#[test]
fn manifests_list_oldest_first() {
    let store = fresh_store("ipm_results_manifests");
    store
        .save_manifest(&manifest("bbb222", "2024-03-02T06:00:00+00:00"))
        .unwrap();
    store
        .save_manifest(&manifest("aaa111", "2024-03-01T06:00:00+00:00"))
        .unwrap();

    let listed = store.list_batches().unwrap();
    let ids: Vec<&str> = listed.iter().map(|m| m.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["aaa111", "bbb222"]);
    assert!(store.has_batch("aaa111"));
    assert_eq!(store.resolve("bbb").unwrap().batch_id, "bbb222");
    assert!(store.resolve("").is_err());
    assert!(matches!(
        store.load_manifest("zzz"),
        Err(ResultsError::BatchNotFound { .. })
    ));
}

#[test]
fn malformed_row_reports_line() {
    let store = fresh_store("ipm_results_malformed");
    store
        .append(
            Table::WellTuning,
            "b1",
            &[Sample {
                well: "A1".into(),
                rate: 1.0,
                bhp: None,
            }],
        )
        .unwrap();
    let path = store.root().join("well_tuning.jsonl");
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{not json\n");
    std::fs::write(&path, content).unwrap();

    let err = store.read::<Sample>(Table::WellTuning).unwrap_err();
    assert!(matches!(err, ResultsError::MalformedRow { line: 2, .. }));
}
