//! Samplers for electrons leaving through the far side of the sample

use crate::event::{ElectronState, StepKind};
use crate::scattering::ScatterSampler;
use glam::DVec3;

/// Energy of transmitted electrons
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransmittedEnergy;

impl ScatterSampler for TransmittedEnergy {
    fn name(&self) -> &'static str {
        "TransmittedElectronEnergy"
    }

    fn accepts(&self, step: StepKind, state: &ElectronState) -> bool {
        state.is_transmitted_exit(step)
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        Some(state.energy_ev)
    }

    fn bins_header(&self) -> &'static str {
        "Energy (eV)"
    }
}

/// Angle between the exit direction and the beam direction (+z)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransmittedPolarAngle;

impl ScatterSampler for TransmittedPolarAngle {
    fn name(&self) -> &'static str {
        "TransmittedElectronPolarAngular"
    }

    fn accepts(&self, step: StepKind, state: &ElectronState) -> bool {
        state.is_transmitted_exit(step)
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        let direction = state.direction.try_normalize()?;
        Some(direction.dot(DVec3::Z).clamp(-1.0, 1.0).acos())
    }

    fn bins_header(&self) -> &'static str {
        "Polar angle (rad)"
    }
}

/// Azimuth of the exit direction around the beam axis, in [0, 2π)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransmittedAzimuthalAngle;

impl ScatterSampler for TransmittedAzimuthalAngle {
    fn name(&self) -> &'static str {
        "TransmittedElectronAzimuthalAngular"
    }

    fn accepts(&self, step: StepKind, state: &ElectronState) -> bool {
        state.is_transmitted_exit(step)
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        state.azimuth()
    }

    fn bins_header(&self) -> &'static str {
        "Azimuthal angle (rad)"
    }
}
