use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

use crate::constants::MASS_PION2;
use crate::geometry::vector::EtaPhi;

/// A reconstructed charged-particle trajectory.
///
/// Only the quantities the linking algorithm reads are kept: the momentum
/// vector at the outer state, the charge, and the quality flags the track
/// selection cuts on. Timing is externally supplied per track (see
/// [`TrackTime`]), mirroring the upstream association by track identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    pub momentum: Vector3<f64>,
    pub charge: i32,
    pub high_purity: bool,
    pub missing_outer_hits: u32,
}

impl Track {
    /// Creates a new `Track`.
    ///
    /// # Arguments
    ///
    /// * `momentum` - momentum vector in GeV.
    /// * `charge` - electric charge in units of e.
    /// * `high_purity` - reconstruction quality flag.
    /// * `missing_outer_hits` - lost hits beyond the outermost measurement.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::Vector3;
    /// use hgcore::data::track::Track;
    ///
    /// let track = Track::new(Vector3::new(3.0, 0.0, 4.0), 1, true, 0);
    /// assert!((track.p() - 5.0).abs() < 1e-12);
    /// assert!((track.pt() - 3.0).abs() < 1e-12);
    /// ```
    pub fn new(momentum: Vector3<f64>, charge: i32, high_purity: bool, missing_outer_hits: u32) -> Self {
        Track { momentum, charge, high_purity, missing_outer_hits }
    }

    pub fn p(&self) -> f64 {
        self.momentum.norm()
    }

    pub fn pt(&self) -> f64 {
        EtaPhi::perp(&self.momentum)
    }

    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }

    pub fn phi(&self) -> f64 {
        self.momentum.phi()
    }

    /// Energy under the charged-pion mass hypothesis, `sqrt(p^2 + m_pi^2)`.
    pub fn pion_energy(&self) -> f64 {
        (self.p().powi(2) + MASS_PION2).sqrt()
    }
}

/// Timing values associated to a track by the upstream time reconstruction.
/// Looked up by track index, not stored on the track.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TrackTime {
    pub time: f64,
    pub error: f64,
    pub quality: f64,
}

impl TrackTime {
    pub fn new(time: f64, error: f64, quality: f64) -> Self {
        TrackTime { time, error, quality }
    }
}

/// A reconstructed muon; tracks associated to a muon are vetoed from
/// linking. `track_ref` is the index of the associated track, if any.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Muon {
    pub track_ref: Option<usize>,
}

/// Index of the muon associated to the given track, if any.
pub fn muon_assoc_to_track(track_index: usize, muons: &[Muon]) -> Option<usize> {
    muons.iter().position(|m| m.track_ref == Some(track_index))
}

/// Boolean quality predicate applied to tracks before linking.
///
/// Defaults reproduce the standard selection: pt above 1 GeV, endcap
/// acceptance in |eta|, high purity, and fewer than five missing outer hits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackSelection {
    pub min_pt: f64,
    pub min_abs_eta: f64,
    pub max_abs_eta: f64,
    pub max_missing_outer_hits: u32,
    pub require_high_purity: bool,
}

impl Default for TrackSelection {
    fn default() -> Self {
        TrackSelection {
            min_pt: 1.0,
            min_abs_eta: 1.48,
            max_abs_eta: 3.0,
            max_missing_outer_hits: 5,
            require_high_purity: true,
        }
    }
}

impl TrackSelection {
    /// Accepts every track; used when an upstream selection already ran.
    pub fn permissive() -> Self {
        TrackSelection {
            min_pt: 0.0,
            min_abs_eta: 0.0,
            max_abs_eta: f64::INFINITY,
            max_missing_outer_hits: u32::MAX,
            require_high_purity: false,
        }
    }

    pub fn passes(&self, track: &Track) -> bool {
        let abs_eta = track.eta().abs();
        track.pt() > self.min_pt
            && abs_eta > self.min_abs_eta
            && abs_eta < self.max_abs_eta
            && track.missing_outer_hits < self.max_missing_outer_hits
            && (!self.require_high_purity || track.high_purity)
    }
}
