use serde::{Serialize, Deserialize};

use hgcore::data::trackster::Trackster;

/// Numeric configuration of the geometric linking algorithm.
///
/// The four `delta_*` values are angular tolerances (half-widths of the
/// (eta, phi) search windows) for the four link-finding passes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkingConfig {
    /// Track to trackster window at the calorimeter front face
    pub delta_tk_ts_layer1: f64,
    /// Track to trackster window at the EM/HAD interface
    pub delta_tk_ts_interface: f64,
    /// EM trackster to hadronic trackster window at the interface
    pub delta_ts_em_had: f64,
    /// Hadronic trackster to hadronic trackster window at the interface
    pub delta_ts_had_had: f64,
    /// Track times with a quality below this are ignored in compatibility
    pub track_time_quality_threshold: f64,
    /// Summed identification probability at or below this marks a trackster hadronic
    pub pid_threshold: f64,
    /// Tracksters with an EM energy fraction below this are hadronic
    pub energy_em_over_total_threshold: f64,
    /// Identification categories summed for the hadronic decision
    pub filter_hadronic_on_categories: Vec<usize>,
    /// Sigma multiplier of the time-compatibility window
    pub max_delta_t: f64,
    /// Tracks below this pion-hypothesis energy are not used to seed links
    pub track_min_energy: f64,
    /// Depth bound of the per-track trackster traversal
    pub max_hops: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        LinkingConfig {
            delta_tk_ts_layer1: 0.02,
            delta_tk_ts_interface: 0.03,
            delta_ts_em_had: 0.03,
            delta_ts_had_had: 0.03,
            track_time_quality_threshold: 0.5,
            pid_threshold: 0.5,
            energy_em_over_total_threshold: 0.9,
            filter_hadronic_on_categories: vec![0, 1],
            max_delta_t: 3.0,
            track_min_energy: 2.0,
            max_hops: 3,
        }
    }
}

impl LinkingConfig {
    /// Classifies a trackster as hadronic (anything but EM).
    ///
    /// A trackster is hadronic if the summed identification probability over
    /// the configured categories is at or below the threshold while some of
    /// its energy is non-electromagnetic, or if its EM energy fraction is
    /// below the configured fraction of the total.
    pub fn is_hadronic(&self, trackster: &Trackster) -> bool {
        let cumulative_prob: f64 = self
            .filter_hadronic_on_categories
            .iter()
            .filter_map(|&category| trackster.id_probabilities.get(category))
            .map(|&p| p as f64)
            .sum();
        (cumulative_prob <= self.pid_threshold && trackster.raw_em_energy != trackster.raw_energy)
            || trackster.raw_em_energy < self.energy_em_over_total_threshold * trackster.raw_energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn trackster_with(id_probabilities: [f32; 8], raw_energy: f64, raw_em_energy: f64) -> Trackster {
        Trackster::new(
            Vector3::new(50.0, 0.0, 330.0),
            Vector3::z(),
            raw_energy,
            raw_em_energy,
            id_probabilities,
            -99.0,
            0.0,
        )
    }

    #[test]
    fn test_default_values() {
        let config = LinkingConfig::default();
        assert_eq!(config.delta_tk_ts_layer1, 0.02);
        assert_eq!(config.filter_hadronic_on_categories, vec![0, 1]);
        assert_eq!(config.max_hops, 3);
    }

    #[test]
    fn test_em_trackster_is_not_hadronic() {
        let config = LinkingConfig::default();
        let mut probabilities = [0.0_f32; 8];
        probabilities[0] = 0.9; // photon-like
        let trackster = trackster_with(probabilities, 10.0, 10.0);
        assert!(!config.is_hadronic(&trackster));
    }

    #[test]
    fn test_low_pid_probability_marks_hadronic() {
        let config = LinkingConfig::default();
        let mut probabilities = [0.0_f32; 8];
        probabilities[4] = 0.9; // charged-hadron-like
        let trackster = trackster_with(probabilities, 10.0, 9.5);
        assert!(config.is_hadronic(&trackster));
    }

    #[test]
    fn test_low_em_fraction_marks_hadronic() {
        let config = LinkingConfig::default();
        let mut probabilities = [0.0_f32; 8];
        probabilities[0] = 0.9; // EM-like scores but little EM energy
        let trackster = trackster_with(probabilities, 10.0, 5.0);
        assert!(config.is_hadronic(&trackster));
    }
}
