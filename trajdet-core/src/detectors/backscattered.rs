//! Samplers for electrons leaving the sample on the beam side

use crate::event::{ElectronState, StepKind};
use crate::format::format_real;
use crate::properties::PropertyBag;
use crate::scattering::ScatterSampler;
use glam::{DVec2, DVec3};

/// Energy of backscattered electrons
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackscatteredEnergy;

impl ScatterSampler for BackscatteredEnergy {
    fn name(&self) -> &'static str {
        "BackscatteredElectronEnergy"
    }

    fn accepts(&self, step: StepKind, _state: &ElectronState) -> bool {
        step == StepKind::Backscatter
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        Some(state.energy_ev)
    }

    fn bins_header(&self) -> &'static str {
        "Energy (eV)"
    }
}

/// Angle between the exit direction and the surface normal pointing back
/// towards the gun (-z). 0 is straight back up the beam, π/2 is grazing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackscatteredPolarAngle;

impl ScatterSampler for BackscatteredPolarAngle {
    fn name(&self) -> &'static str {
        "BackscatteredElectronPolarAngular"
    }

    fn accepts(&self, step: StepKind, _state: &ElectronState) -> bool {
        step == StepKind::Backscatter
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        let direction = state.direction.try_normalize()?;
        Some(direction.dot(DVec3::NEG_Z).clamp(-1.0, 1.0).acos())
    }

    fn bins_header(&self) -> &'static str {
        "Polar angle (rad)"
    }
}

/// Azimuth of the exit direction in the sample plane, in [0, 2π)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackscatteredAzimuthalAngle;

impl ScatterSampler for BackscatteredAzimuthalAngle {
    fn name(&self) -> &'static str {
        "BackscatteredElectronAzimuthalAngular"
    }

    fn accepts(&self, step: StepKind, _state: &ElectronState) -> bool {
        step == StepKind::Backscatter
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        state.azimuth()
    }

    fn bins_header(&self) -> &'static str {
        "Azimuthal angle (rad)"
    }
}

/// Distance between the exit point and the beam axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackscatteredRadialDistance {
    /// Where the beam axis pierces the sample plane
    pub origin: DVec2,
}

impl BackscatteredRadialDistance {
    pub fn with_origin(origin: DVec2) -> Self {
        Self { origin }
    }
}

impl ScatterSampler for BackscatteredRadialDistance {
    fn name(&self) -> &'static str {
        "BackscatteredElectronRadial"
    }

    fn accepts(&self, step: StepKind, _state: &ElectronState) -> bool {
        step == StepKind::Backscatter
    }

    fn sample(&self, state: &ElectronState) -> Option<f64> {
        Some(state.position.truncate().distance(self.origin))
    }

    fn bins_header(&self) -> &'static str {
        "Radial distance (m)"
    }

    fn write_properties(&self, props: &mut PropertyBag) {
        props.set_property("radial.origin.x", format_real(self.origin.x));
        props.set_property("radial.origin.y", format_real(self.origin.y));
    }
}
