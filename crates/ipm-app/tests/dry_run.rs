use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use ipm_app::*;
use ipm_results::{ResultStore, Row, Table};
use ipm_solver::PIPE_BOX;
use ipm_tuning::{NeutralReason, PipeTuningReport, WellOutcome, WellTuningReport};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
}

fn fresh_store(name: &str) -> ResultStore {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    ResultStore::new(dir).unwrap()
}

fn options(hour: u32) -> RunOptions {
    RunOptions {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 2, hour, 0, 0).unwrap()),
        ..RunOptions::default()
    }
}

#[test]
fn dry_run_tunes_wells_and_pipelines_end_to_end() {
    let fixture = DryRunFixture::load(&demo("field_a_fixture.yaml")).unwrap();
    let mut session = fixture.session().unwrap();
    let store = fresh_store("ipm_app_dry_run_e2e");
    let project_path = demo("field_a.yaml");
    let request = RunRequest {
        project_path: &project_path,
        options: options(6),
    };

    let mut stages = Vec::new();
    let mut cb = |e: RunProgressEvent| stages.push(e.stage);
    let response = run_batch(
        &request,
        &mut session,
        fixture.sources(),
        &store,
        Some(&mut cb),
    )
    .unwrap();

    assert_eq!(stages.first(), Some(&RunStage::LoadingProject));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
    assert!(stages.contains(&RunStage::OptimizingChokes));

    assert_eq!(response.iprs.len(), 2);
    assert_eq!(response.iprs[0].productivity_index, 1.0);

    let a12 = &response.wells[0];
    assert_eq!(a12.well.as_str(), "A12");
    assert!(matches!(a12.outcome, WellOutcome::Tuned { .. }));
    assert!((a12.tuned.cp1 - 1.1).abs() < 1e-9);
    assert!(a12.tuned.cp2 >= 1.2 && a12.tuned.cp2 <= 3.0);

    let b3 = &response.wells[1];
    assert_eq!(
        b3.outcome,
        WellOutcome::Neutral {
            reason: NeutralReason::MissingBottomholePressure
        }
    );
    assert_eq!((b3.tuned.cp1, b3.tuned.cp2), (1.0, 1.0));

    assert_eq!(response.pipes.len(), 1);
    let fitted = response.pipes[0].tuned_pair().unwrap();
    assert!(PIPE_BOX.contains(fitted));

    let base: Vec<_> = response
        .network
        .iter()
        .filter(|r| r.case == OutputCase::Base)
        .collect();
    let optimized: Vec<_> = response
        .network
        .iter()
        .filter(|r| r.case == OutputCase::Optimized)
        .collect();
    assert_eq!(base.len(), 2);
    assert_eq!(optimized.len(), 2);
    let base_gas: f64 = base.iter().map(|r| r.gas_rate).sum();
    let optimized_gas: f64 = optimized.iter().map(|r| r.gas_rate).sum();
    assert!(base_gas > 0.2);
    assert!(optimized_gas <= 0.2 + 1e-9);

    let summary = &response.manifest.summary;
    assert_eq!(summary.wells_tuned, 1);
    assert_eq!(summary.wells_neutral, 1);
    assert_eq!(summary.groups_tuned, 1);
    assert!(summary.optimized);
}

#[test]
fn dry_run_rows_are_appended_per_batch() {
    let fixture = DryRunFixture::load(&demo("field_a_fixture.yaml")).unwrap();
    let store = fresh_store("ipm_app_dry_run_append");
    let project_path = demo("field_a.yaml");

    let mut ids = Vec::new();
    for hour in [6, 7] {
        let mut session = fixture.session().unwrap();
        let request = RunRequest {
            project_path: &project_path,
            options: options(hour),
        };
        let response = run_batch(&request, &mut session, fixture.sources(), &store, None).unwrap();
        ids.push(response.manifest.batch_id);
    }
    assert_ne!(ids[0], ids[1]);

    let wells: Vec<Row<WellTuningReport>> = store.read(Table::WellTuning).unwrap();
    assert_eq!(wells.len(), 4);
    let pipes: Vec<PipeTuningReport> = store.read_batch(Table::PipeTuning, &ids[1]).unwrap();
    assert_eq!(pipes.len(), 1);
    let network: Vec<NetworkWellResult> =
        store.read_batch(Table::NetworkResults, &ids[0]).unwrap();
    assert_eq!(network.len(), 4);

    let listed = store.list_batches().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].batch_id, ids[0]);
}

#[test]
fn network_model_is_saved_and_closed() {
    let fixture = DryRunFixture::load(&demo("field_a_fixture.yaml")).unwrap();
    let mut session = fixture.session().unwrap();
    let store = fresh_store("ipm_app_dry_run_lifecycle");
    let project_path = demo("field_a.yaml");
    let request = RunRequest {
        project_path: &project_path,
        options: RunOptions {
            optimize: false,
            ..options(6)
        },
    };
    let response = run_batch(&request, &mut session, fixture.sources(), &store, None).unwrap();
    assert!(response
        .network
        .iter()
        .all(|r| r.case == OutputCase::Base));

    let oracle = session.oracle();
    assert_eq!(oracle.count_commands("GAP.OPENFILE"), 1);
    assert_eq!(oracle.count_commands("GAP.SAVEFILE"), 1);
    assert_eq!(oracle.count_commands("GAP.SHUTDOWN"), 1);
    assert_eq!(oracle.count_commands("GAP.SOLVENETWORK(1)"), 0);
    // read-back plus tuning for each well model
    assert_eq!(oracle.count_commands("PROSPER.OPENFILE"), 4);
    assert_eq!(oracle.count_commands("PROSPER.SAVEFILE"), 2);
}

#[test]
fn missing_window_is_rejected() {
    let fixture = DryRunFixture::load(&demo("field_a_fixture.yaml")).unwrap();
    let mut session = fixture.session().unwrap();
    let store = fresh_store("ipm_app_dry_run_window");

    let dir = std::env::temp_dir().join("ipm_app_dry_run_window_project");
    std::fs::create_dir_all(&dir).unwrap();
    let mut project = load_project(&demo("field_a.yaml")).unwrap();
    project.window = None;
    let project_path = dir.join("project.yaml");
    ipm_project::save_yaml(&project_path, &project).unwrap();

    let request = RunRequest {
        project_path: &project_path,
        options: options(6),
    };
    let err = run_batch(&request, &mut session, fixture.sources(), &store, None).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}
