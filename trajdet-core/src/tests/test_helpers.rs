//! Test helper utilities for detector tests

use crate::detector::Detector;
use crate::event::{ElectronState, Event, EventKind, Region};
use glam::DVec3;

/// Check if two floating point values are approximately equal within tolerance
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Beam electron at `position` moving along `direction` with `energy_ev`
pub fn electron(position: DVec3, direction: DVec3, energy_ev: f64) -> ElectronState {
    ElectronState {
        trajectory_id: 1,
        parent_id: None,
        position,
        previous_position: position,
        direction,
        energy_ev,
        region: Region::Chamber,
        element: None,
        shell: None,
    }
}

/// Secondary electron spawned by trajectory `parent`
pub fn secondary(parent: u64, energy_ev: f64) -> ElectronState {
    ElectronState {
        parent_id: Some(parent),
        ..electron(DVec3::ZERO, DVec3::NEG_Z, energy_ev)
    }
}

/// Backscatter event of a beam electron leaving through the origin
/// straight back up the column
pub fn backscatter(energy_ev: f64) -> Event {
    Event::with_state(
        EventKind::Backscatter,
        electron(DVec3::ZERO, DVec3::NEG_Z, energy_ev),
    )
}

/// Backscatter event with full control over exit point and direction
pub fn backscatter_at(position: DVec3, direction: DVec3, energy_ev: f64) -> Event {
    Event::with_state(EventKind::Backscatter, electron(position, direction, energy_ev))
}

/// Beam electron leaving the bottom of the sample
pub fn transmission(direction: DVec3, energy_ev: f64) -> Event {
    let mut state = electron(DVec3::new(0.0, 0.0, 1e-6), direction, energy_ev);
    state.region = Region::Chamber;
    Event::with_state(EventKind::ExitMaterial, state)
}

/// Start of a beam electron trajectory
pub fn trajectory_start(trajectory_id: u64) -> Event {
    let mut state = electron(DVec3::ZERO, DVec3::Z, 15_000.0);
    state.trajectory_id = trajectory_id;
    Event::with_state(EventKind::TrajectoryStart, state)
}

pub fn trajectory_end(trajectory_id: u64) -> Event {
    let mut state = electron(DVec3::ZERO, DVec3::Z, 0.0);
    state.trajectory_id = trajectory_id;
    Event::with_state(EventKind::TrajectoryEnd, state)
}

pub fn first_trajectory() -> Event {
    Event::bare(EventKind::FirstTrajectory)
}

pub fn last_trajectory() -> Event {
    Event::bare(EventKind::LastTrajectory)
}

/// Deliver `events` directly to `detector`, bypassing any engine
pub fn feed<D: Detector + ?Sized>(detector: &mut D, events: &[Event]) {
    for event in events {
        detector.on_event(event);
    }
}
