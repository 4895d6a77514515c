use std::fmt;
use std::fmt::{Display, Formatter};
use itertools::Itertools;
use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

/// A cartesian four-momentum.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
}

impl FourMomentum {
    /// Four-momentum with three-momentum `magnitude` along `direction`.
    ///
    /// A direction too short to normalize yields a null three-momentum.
    pub fn from_direction(direction: &Vector3<f64>, magnitude: f64, energy: f64) -> Self {
        let unit = direction.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        FourMomentum {
            px: magnitude * unit.x,
            py: magnitude * unit.y,
            pz: magnitude * unit.z,
            energy,
        }
    }

    /// Four-momentum from polar coordinates and a mass hypothesis.
    ///
    /// # Examples
    ///
    /// ```
    /// use hgcore::data::candidate::FourMomentum;
    ///
    /// let p4 = FourMomentum::from_pt_eta_phi_m(3.0, 0.0, 0.0, 4.0);
    /// assert!((p4.energy - 5.0).abs() < 1e-12);
    /// ```
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let energy = (px * px + py * py + pz * pz + mass * mass).sqrt();
        FourMomentum { px, py, pz, energy }
    }

    /// Magnitude of the three-momentum.
    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }
}

/// A composite particle candidate.
///
/// Holds index-based references into the event's track and trackster
/// collections; the candidate never owns the objects themselves. After
/// assembly every trackster index appears in exactly one candidate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub charge: i32,
    pub pdg_id: i32,
    pub raw_energy: f64,
    pub p4: FourMomentum,
    pub track: Option<usize>,
    pub tracksters: Vec<usize>,
}

impl Candidate {
    pub fn new() -> Self {
        Candidate::default()
    }

    pub fn add_trackster(&mut self, index: usize) {
        self.tracksters.push(index);
    }

    pub fn has_tracksters(&self) -> bool {
        !self.tracksters.is_empty()
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Candidate(pdg: {}, charge: {}, raw energy: {:.3}, track: {:?}, tracksters: [{}])",
            self.pdg_id,
            self.charge,
            self.raw_energy,
            self.track,
            self.tracksters.iter().join(", "),
        )
    }
}
