//! Lifecycle and artifact tests for channel detectors

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use trajdet_core::detectors::{BackscatteredElectronEnergyDetector, BackscatteredEnergy};
use trajdet_core::format::parse_real;
use trajdet_core::tests::test_helpers::{backscatter, feed, first_trajectory, last_trajectory};
use trajdet_core::{
    Detector, DetectorError, Event, EventKind, Phase, PropertyBag, ReplayEngine, Table,
};

fn energy_detector(min: f64, max: f64, channels: usize) -> BackscatteredElectronEnergyDetector {
    BackscatteredElectronEnergyDetector::new(BackscatteredEnergy, min, max, channels).unwrap()
}

#[test]
fn test_limits_and_width() {
    let det = energy_detector(10.0, 0.0, 4);
    assert_eq!(det.minimum_limit(), 0.0);
    assert_eq!(det.maximum_limit(), 10.0);
    assert_eq!(det.channel_width(), 2.5);
    assert_eq!(det.channels(), 4);
    assert_eq!(det.bins_header(), "Energy (eV)");
    assert_eq!(det.counts_header(), "Counts");
}

#[test]
fn test_zero_channels_fails_at_construction() {
    let err = BackscatteredElectronEnergyDetector::new(BackscatteredEnergy, 0.0, 1.0, 0).unwrap_err();
    assert!(matches!(err, DetectorError::InvalidArgument(_)));
}

#[test]
fn test_first_trajectory_zeroes_counts() {
    let mut det = energy_detector(0.0, 1000.0, 10);
    det.on_event(&first_trajectory());
    for i in 0..1000 {
        det.on_event(&backscatter(i as f64));
    }
    assert_eq!(det.histogram().total(), 1000);

    det.on_event(&first_trajectory());
    assert_eq!(det.histogram().total(), 0);
    assert_eq!(det.phase(), Phase::Accumulating);

    // Kinds without a hook, and unknown ids, leave the detector alone
    det.on_event(&backscatter(500.0));
    let before = det.histogram().clone();
    det.on_event(&Event::bare(EventKind::BeamEnergyChanged));
    det.on_event(&Event::bare(EventKind::StartSecondary));
    det.on_event(&Event { id: 4242, state: None });
    det.on_event(&last_trajectory());
    assert_eq!(det.histogram(), &before);
}

#[test]
fn test_steps_before_run_are_ignored() {
    let mut det = energy_detector(0.0, 1000.0, 10);
    det.on_event(&backscatter(100.0));
    assert_eq!(det.histogram().total(), 0);
    assert_eq!(det.phase(), Phase::Uninitialised);
}

#[test]
fn test_only_backscatter_events_are_counted() {
    let mut det = energy_detector(0.0, 1000.0, 10);
    det.on_event(&first_trajectory());

    let mut scatter = backscatter(100.0);
    scatter.id = EventKind::Scatter.id();
    det.on_event(&scatter);
    det.on_event(&backscatter(100.0));

    assert_eq!(det.histogram().total(), 1);
    assert_eq!(det.histogram().counts(1).unwrap(), 1);
}

#[test]
fn test_out_of_range_energies_are_dropped() {
    let mut det = energy_detector(100.0, 200.0, 5);
    feed(
        &mut det,
        &[first_trajectory(), backscatter(50.0), backscatter(150.0), backscatter(250.0)],
    );
    assert_eq!(det.histogram().total(), 1);
}

#[test]
fn test_primary_only_skips_secondaries() {
    use trajdet_core::tests::test_helpers::secondary;

    let mut det = energy_detector(0.0, 100.0, 10).with_primary_only(true);
    det.on_event(&first_trajectory());
    det.on_event(&Event::with_state(EventKind::Backscatter, secondary(1, 50.0)));
    det.on_event(&backscatter(50.0));
    assert_eq!(det.histogram().total(), 1);
}

#[test]
fn test_save_results_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut det = energy_detector(0.0, 10.0, 5);
    feed(
        &mut det,
        &[-1.0, 0.0, 0.5, 4.999, 5.0, 9.999, 10.0, 11.0]
            .iter()
            .map(|&e| backscatter(e))
            .collect::<Vec<_>>(),
    );
    // nothing counted before the run starts
    assert_eq!(det.histogram().total(), 0);

    det.on_event(&first_trajectory());
    for e in [-1.0, 0.0, 0.5, 4.999, 5.0, 9.999, 10.0, 11.0] {
        det.on_event(&backscatter(e));
    }

    det.save_log(dir.path(), "bsed").unwrap();
    assert_eq!(det.phase(), Phase::Accumulating);

    let path = det.save_results(dir.path(), "bsed").unwrap();
    assert_eq!(path, dir.path().join("bsed.csv"));
    assert_eq!(det.phase(), Phase::Finalised);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert_eq!(text.lines().next(), Some("Energy (eV),Counts"));

    let table = Table::read(&path).unwrap();
    assert_eq!(table.rows.len(), 5);
    let centers = table.real_column(0).unwrap();
    assert!(centers.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(centers, vec![1.0, 3.0, 5.0, 7.0, 9.0]);

    let counts = table.integer_column(1).unwrap();
    let expected: Vec<u64> = (0..5).map(|i| det.histogram().counts(i).unwrap()).collect();
    assert_eq!(counts, expected);
    assert_eq!(counts, vec![2, 0, 2, 0, 2]);
}

#[test]
fn test_save_log_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let det = energy_detector(-5.0, 5.0, 20);

    let path = det.save_log(dir.path(), "edet").unwrap();
    assert_eq!(path, dir.path().join("edet.log"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('#'));
    assert!(text.contains("histogram.min=-5.0\n"));
    assert!(text.contains("histogram.max=5.0\n"));
    assert!(text.contains("histogram.channels=20\n"));

    let bag = PropertyBag::load_from_path(&path).unwrap();
    let min = bag.get_property("histogram.min").and_then(parse_real);
    let max = bag.get_property("histogram.max").and_then(parse_real);
    let channels: Option<usize> = bag.get_property("histogram.channels").and_then(|v| v.parse().ok());
    assert_eq!(min, Some(-5.0));
    assert_eq!(max, Some(5.0));
    assert_eq!(channels, Some(20));
    assert_eq!(bag.get_property("detector.primary_only"), Some("false"));
}

#[test]
fn test_distinct_base_names_write_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut edet = energy_detector(0.0, 10.0, 2);
    let mut bsed = energy_detector(0.0, 10.0, 4);

    edet.save_results(dir.path(), "edet").unwrap();
    bsed.save_results(dir.path(), "bsed").unwrap();
    edet.save_log(dir.path(), "edet").unwrap();
    bsed.save_log(dir.path(), "bsed").unwrap();

    assert_eq!(Table::read(&dir.path().join("edet.csv")).unwrap().rows.len(), 2);
    assert_eq!(Table::read(&dir.path().join("bsed.csv")).unwrap().rows.len(), 4);
    let edet_log = PropertyBag::load_from_path(&dir.path().join("edet.log")).unwrap();
    let bsed_log = PropertyBag::load_from_path(&dir.path().join("bsed.log")).unwrap();
    assert_eq!(edet_log.get_property("histogram.channels"), Some("2"));
    assert_eq!(bsed_log.get_property("histogram.channels"), Some("4"));
}

#[test]
fn test_save_into_missing_directory_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let mut det = energy_detector(0.0, 1.0, 1);

    let err = det.save_results(&missing, "x").unwrap_err();
    assert!(matches!(err, DetectorError::Io { .. }));
    assert_eq!(err.path(), Some(missing.join("x.csv").as_path()));

    let err = det.save_log(&missing, "x").unwrap_err();
    assert_eq!(err.path(), Some(missing.join("x.log").as_path()));
}

#[test]
fn test_setup_arms_detector() {
    let det = Rc::new(RefCell::new(energy_detector(0.0, 1.0, 1)));
    let mut engine = ReplayEngine::new();

    BackscatteredElectronEnergyDetector::setup(&det, &mut engine).unwrap();
    assert_eq!(det.borrow().phase(), Phase::Armed);
    assert_eq!(engine.listener_count(), 1);

    engine.emit(&first_trajectory());
    assert_eq!(det.borrow().phase(), Phase::Accumulating);
}

#[test]
fn test_log_comment_names_detector() {
    let dir = tempfile::tempdir().unwrap();
    let det = energy_detector(0.0, 1.0, 1);
    let path = det.save_log(dir.path(), "bse").unwrap();
    let first = fs::read_to_string(path).unwrap().lines().next().map(str::to_string);
    assert_eq!(first.as_deref(), Some("#BackscatteredElectronEnergy"));
}
