//! End-to-end runs: config + trace -> artifacts on disk

use glam::DVec3;
use std::fs;
use std::path::PathBuf;
use trajdet_core::tests::test_helpers::{
    backscatter, first_trajectory, last_trajectory, trajectory_end, trajectory_start, transmission,
};
use trajdet_core::trace::write_trace;
use trajdet_core::{
    run_trace, ChannelConfig, DetectorConfig, DetectorKind, Event, PropertyBag, RunConfig,
    Session, Table,
};

fn config() -> RunConfig {
    let window = ChannelConfig {
        min: 0.0,
        max: 10.0,
        channels: 5,
        primary_only: false,
    };
    RunConfig {
        results_dir: PathBuf::from("results"),
        detectors: vec![
            DetectorConfig {
                base_name: "bse".to_string(),
                detector: DetectorKind::BackscatteredElectronEnergy(window),
            },
            DetectorConfig {
                base_name: "te".to_string(),
                detector: DetectorKind::TransmittedElectronEnergy(window),
            },
            DetectorConfig {
                base_name: "fractions".to_string(),
                detector: DetectorKind::ElectronFraction,
            },
        ],
    }
}

fn events() -> Vec<Event> {
    let mut events = vec![first_trajectory()];
    let energies = [-1.0, 0.0, 0.5, 4.999, 5.0, 9.999, 10.0, 11.0];
    for (id, &e) in energies.iter().enumerate() {
        events.push(trajectory_start(id as u64));
        events.push(backscatter(e));
        events.push(trajectory_end(id as u64));
    }
    events.push(trajectory_start(100));
    events.push(transmission(DVec3::Z, 7.0));
    events.push(trajectory_end(100));
    events.push(trajectory_start(101));
    events.push(trajectory_end(101));
    events.push(last_trajectory());
    events
}

#[test]
fn test_run_trace_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("results");

    let artifacts = run_trace(&config(), events(), &out).unwrap();
    assert_eq!(artifacts.len(), 3);
    for artifact in &artifacts {
        assert!(artifact.results.is_file());
        assert!(artifact.log.is_file());
        assert_eq!(artifact.results, out.join(format!("{}.csv", artifact.base_name)));
        assert_eq!(artifact.log, out.join(format!("{}.log", artifact.base_name)));
    }

    let bse = Table::read(&out.join("bse.csv")).unwrap();
    assert_eq!(bse.integer_column(1), Some(vec![2, 0, 2, 0, 2]));

    let te = Table::read(&out.join("te.csv")).unwrap();
    assert_eq!(te.integer_column(1), Some(vec![0, 0, 0, 1, 0]));

    let fractions = Table::read(&out.join("fractions.csv")).unwrap();
    assert_eq!(fractions.rows[0], vec!["backscattered", "8", "0.8"]);
    assert_eq!(fractions.rows[1], vec!["transmitted", "1", "0.1"]);
    assert_eq!(fractions.rows[2], vec!["absorbed", "1", "0.1"]);

    let log = PropertyBag::load_from_path(&out.join("te.log")).unwrap();
    assert_eq!(log.get_property("histogram.channels"), Some("5"));
    let comment = fs::read_to_string(out.join("te.log")).unwrap();
    assert!(comment.starts_with("#TransmittedElectronEnergy\n"));
}

#[test]
fn test_session_tracks_engine_state() {
    let mut session = Session::from_config(&config()).unwrap();
    assert_eq!(session.detectors().len(), 3);
    assert_eq!(session.engine().listener_count(), 3);
    assert!(!session.engine().has_started());

    let delivered = session.replay(events());
    assert_eq!(delivered, events().len() as u64);
    assert!(session.engine().has_started());
}

#[test]
fn test_invalid_config_builds_nothing() {
    let mut bad = config();
    bad.detectors[1].base_name = "bse".to_string();
    assert!(Session::from_config(&bad).is_err());
}

#[test]
fn test_trace_file_to_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let trace = dir.path().join("run.jsonl");
    write_trace(&trace, &events()).unwrap();

    let loaded = trajdet_core::trace::read_trace(&trace).unwrap();
    let out = dir.path().join("results");
    run_trace(&config(), loaded, &out).unwrap();

    let bse = Table::read(&out.join("bse.csv")).unwrap();
    assert_eq!(bse.real_column(0), Some(vec![1.0, 3.0, 5.0, 7.0, 9.0]));
}

#[test]
fn test_results_dir_that_is_a_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("results");
    fs::write(&blocker, "not a directory").unwrap();

    let err = run_trace(&config(), events(), &blocker).unwrap_err();
    assert_eq!(err.path(), Some(blocker.as_path()));
}
