use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

use crate::constants::TIME_UNASSIGNED;

/// Number of particle-identification categories carried per trackster.
pub const N_ID_CATEGORIES: usize = 8;

/// Particle-identification categories of the trackster classifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ParticleType {
    Photon,
    Electron,
    Muon,
    NeutralPion,
    ChargedHadron,
    NeutralHadron,
    Ambiguous,
    Unknown,
}

impl ParticleType {
    /// Returns the `ParticleType` corresponding to the given category index.
    pub fn new(category: usize) -> ParticleType {
        match category {
            0 => ParticleType::Photon,
            1 => ParticleType::Electron,
            2 => ParticleType::Muon,
            3 => ParticleType::NeutralPion,
            4 => ParticleType::ChargedHadron,
            5 => ParticleType::NeutralHadron,
            6 => ParticleType::Ambiguous,
            _ => ParticleType::Unknown,
        }
    }

    /// Returns the category index of the `ParticleType`.
    pub fn category_index(&self) -> usize {
        match self {
            ParticleType::Photon => 0,
            ParticleType::Electron => 1,
            ParticleType::Muon => 2,
            ParticleType::NeutralPion => 3,
            ParticleType::ChargedHadron => 4,
            ParticleType::NeutralHadron => 5,
            ParticleType::Ambiguous => 6,
            ParticleType::Unknown => 7,
        }
    }
}

/// A spatially-extended cluster of calorimeter energy deposits.
///
/// Carries the energy-weighted barycenter, the principal axis from the
/// cluster shape decomposition, raw energies, per-category identification
/// probabilities and the cluster time. A time equal to
/// [`TIME_UNASSIGNED`](crate::constants::TIME_UNASSIGNED) means no timing
/// information is available.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trackster {
    pub barycenter: Vector3<f64>,
    pub principal_axis: Vector3<f64>,
    pub raw_energy: f64,
    pub raw_em_energy: f64,
    pub id_probabilities: [f32; N_ID_CATEGORIES],
    pub time: f64,
    pub time_error: f64,
}

impl Trackster {
    /// Creates a new `Trackster`.
    ///
    /// # Arguments
    ///
    /// * `barycenter` - energy-weighted centroid position in cm.
    /// * `principal_axis` - leading eigenvector of the shape decomposition.
    /// * `raw_energy` - total deposited energy in GeV.
    /// * `raw_em_energy` - electromagnetic fraction of the deposited energy.
    /// * `id_probabilities` - per-category identification probabilities.
    /// * `time` - cluster time, or `TIME_UNASSIGNED`.
    /// * `time_error` - uncertainty on the cluster time.
    pub fn new(
        barycenter: Vector3<f64>,
        principal_axis: Vector3<f64>,
        raw_energy: f64,
        raw_em_energy: f64,
        id_probabilities: [f32; N_ID_CATEGORIES],
        time: f64,
        time_error: f64,
    ) -> Self {
        Trackster {
            barycenter,
            principal_axis,
            raw_energy,
            raw_em_energy,
            id_probabilities,
            time,
            time_error,
        }
    }

    /// True if a time was assigned to this trackster.
    pub fn has_time(&self) -> bool {
        self.time != TIME_UNASSIGNED
    }

    pub fn id_probability(&self, particle_type: ParticleType) -> f32 {
        self.id_probabilities[particle_type.category_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_particle_type_roundtrip() {
        for category in 0..N_ID_CATEGORIES {
            assert_eq!(ParticleType::new(category).category_index(), category);
        }
        assert_eq!(ParticleType::new(99), ParticleType::Unknown);
    }

    #[test]
    fn test_time_sentinel() {
        let mut probabilities = [0.0_f32; N_ID_CATEGORIES];
        probabilities[0] = 1.0;
        let trackster = Trackster::new(
            Vector3::new(50.0, 0.0, 330.0),
            Vector3::z(),
            12.0,
            12.0,
            probabilities,
            TIME_UNASSIGNED,
            0.0,
        );
        assert!(!trackster.has_time());
        assert!((trackster.id_probability(ParticleType::Photon) - 1.0).abs() < f32::EPSILON);
    }
}
