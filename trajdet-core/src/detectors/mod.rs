//! Concrete detectors

pub mod backscattered;
pub mod fraction;
pub mod transmitted;

pub use backscattered::{
    BackscatteredAzimuthalAngle, BackscatteredEnergy, BackscatteredPolarAngle,
    BackscatteredRadialDistance,
};
pub use fraction::ElectronFractionDetector;
pub use transmitted::{TransmittedAzimuthalAngle, TransmittedEnergy, TransmittedPolarAngle};

use crate::channel::ChannelDetector;

pub type BackscatteredElectronEnergyDetector = ChannelDetector<BackscatteredEnergy>;
pub type BackscatteredElectronPolarAngularDetector = ChannelDetector<BackscatteredPolarAngle>;
pub type BackscatteredElectronAzimuthalAngularDetector = ChannelDetector<BackscatteredAzimuthalAngle>;
pub type BackscatteredElectronRadialDetector = ChannelDetector<BackscatteredRadialDistance>;
pub type TransmittedElectronEnergyDetector = ChannelDetector<TransmittedEnergy>;
pub type TransmittedElectronPolarAngularDetector = ChannelDetector<TransmittedPolarAngle>;
pub type TransmittedElectronAzimuthalAngularDetector = ChannelDetector<TransmittedAzimuthalAngle>;
