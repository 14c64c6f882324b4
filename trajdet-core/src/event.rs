//! Engine events and the electron state they carry
//!
//! Geometry convention: the beam travels along +z and enters the sample
//! through the plane z = 0. Positions are in metres, energies in eV.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Lifecycle and step events emitted by the transport engine, with the
/// engine's wire identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scatter,
    NonScatter,
    Backscatter,
    ExitMaterial,
    TrajectoryStart,
    TrajectoryEnd,
    LastTrajectory,
    FirstTrajectory,
    StartSecondary,
    EndSecondary,
    PostScatter,
    BeamEnergyChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::Scatter,
        EventKind::NonScatter,
        EventKind::Backscatter,
        EventKind::ExitMaterial,
        EventKind::TrajectoryStart,
        EventKind::TrajectoryEnd,
        EventKind::LastTrajectory,
        EventKind::FirstTrajectory,
        EventKind::StartSecondary,
        EventKind::EndSecondary,
        EventKind::PostScatter,
        EventKind::BeamEnergyChanged,
    ];

    pub fn id(self) -> i32 {
        match self {
            EventKind::Scatter => 1,
            EventKind::NonScatter => 2,
            EventKind::Backscatter => 3,
            EventKind::ExitMaterial => 4,
            EventKind::TrajectoryStart => 5,
            EventKind::TrajectoryEnd => 6,
            EventKind::LastTrajectory => 7,
            EventKind::FirstTrajectory => 8,
            EventKind::StartSecondary => 9,
            EventKind::EndSecondary => 10,
            EventKind::PostScatter => 11,
            EventKind::BeamEnergyChanged => 100,
        }
    }

    /// Decode a wire id; unknown ids yield `None`
    pub fn from_id(id: i32) -> Option<Self> {
        EventKind::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// The step flavour of this event, for the kinds that describe a step
    pub fn step(self) -> Option<StepKind> {
        match self {
            EventKind::Scatter => Some(StepKind::Scatter),
            EventKind::NonScatter => Some(StepKind::NonScatter),
            EventKind::Backscatter => Some(StepKind::Backscatter),
            EventKind::ExitMaterial => Some(StepKind::ExitMaterial),
            EventKind::PostScatter => Some(StepKind::PostScatter),
            _ => None,
        }
    }
}

/// Per-step events delivered through `Detector::on_step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Elastic or inelastic interaction at the current position
    Scatter,
    /// Step ended without an interaction (e.g. boundary crossing)
    NonScatter,
    /// Electron left the sample travelling back towards the beam side
    Backscatter,
    /// Electron crossed out of a region
    ExitMaterial,
    /// State after the scatter has been applied
    PostScatter,
}

/// Where the electron currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Chamber,
    Sample { id: u32 },
}

/// Snapshot of the electron being tracked when an event fires
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronState {
    pub trajectory_id: u64,
    /// Trajectory that produced this electron; `None` for beam electrons
    pub parent_id: Option<u64>,
    pub position: DVec3,
    pub previous_position: DVec3,
    pub direction: DVec3,
    pub energy_ev: f64,
    pub region: Region,
    /// Atomic number of the element involved in the last interaction
    pub element: Option<u8>,
    /// Shell label of the last ionisation (e.g. "K", "L3")
    pub shell: Option<String>,
}

impl ElectronState {
    pub fn is_primary(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Length of the step that ended at the current position
    pub fn step_length(&self) -> f64 {
        self.position.distance(self.previous_position)
    }

    /// Azimuth of the direction of flight around the beam axis, in
    /// [0, 2π). `None` when the electron moves along the axis.
    pub fn azimuth(&self) -> Option<f64> {
        let (x, y) = (self.direction.x, self.direction.y);
        if x == 0.0 && y == 0.0 {
            return None;
        }
        let angle = y.atan2(x);
        Some(if angle < 0.0 { angle + TAU } else { angle })
    }

    /// True when this step carried the electron out the far side of the
    /// sample into the chamber
    pub fn is_transmitted_exit(&self, step: StepKind) -> bool {
        step == StepKind::ExitMaterial && self.region == Region::Chamber && self.direction.z > 0.0
    }
}

/// One engine event as recorded on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Wire id, see [`EventKind::id`]
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ElectronState>,
}

impl Event {
    pub fn new(kind: EventKind, state: Option<ElectronState>) -> Self {
        Self {
            id: kind.id(),
            state,
        }
    }

    /// Event without electron state (run-level events)
    pub fn bare(kind: EventKind) -> Self {
        Event::new(kind, None)
    }

    pub fn with_state(kind: EventKind, state: ElectronState) -> Self {
        Event::new(kind, Some(state))
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_id(self.id)
    }
}
