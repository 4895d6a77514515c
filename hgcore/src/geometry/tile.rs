use std::f64::consts::PI;
use std::ops::Index;
use serde::{Serialize, Deserialize};

// Binning constants shared by all tiles. Eta bins cover one endcap in
// absolute pseudorapidity, phi bins span one full turn.
pub const MIN_ETA: f64 = 1.5;
pub const MAX_ETA: f64 = 3.2;
pub const N_ETA_BINS: usize = 34;
pub const N_PHI_BINS: usize = 126;
pub const N_BINS: usize = N_ETA_BINS * N_PHI_BINS;

/// Wraps an azimuth into `[-pi, pi)`.
#[inline]
pub fn normalized_phi(phi: f64) -> f64 {
    let mut p = phi % (2.0 * PI);
    if p >= PI {
        p -= 2.0 * PI;
    } else if p < -PI {
        p += 2.0 * PI;
    }
    p
}

/// A 2D binned index over (eta, phi) space.
///
/// Each bin holds the indices of the objects whose propagated point falls
/// into it. Eta is binned in absolute value and clamped to the covered
/// range, phi is periodic. One tile covers one hemisphere; the caller keeps
/// a pair and selects by the sign of the point's eta.
///
/// # Examples
///
/// ```
/// use hgcore::geometry::tile::EtaPhiTile;
///
/// let mut tile = EtaPhiTile::new();
/// tile.fill(2.0, 0.5, 7);
/// let b = tile.search_box_eta_phi(1.95, 2.05, 0.45, 0.55);
/// let mut found = Vec::new();
/// for eta_i in b[0]..=b[1] {
///     for phi_i in b[2]..=b[3] {
///         found.extend_from_slice(&tile[tile.global_bin(eta_i, phi_i)]);
///     }
/// }
/// assert_eq!(found, vec![7]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EtaPhiTile {
    bins: Vec<Vec<usize>>,
}

impl EtaPhiTile {
    pub fn new() -> Self {
        EtaPhiTile { bins: vec![Vec::new(); N_BINS] }
    }

    /// Eta bin of a point, computed on |eta| and clamped to the valid range.
    pub fn eta_bin(&self, eta: f64) -> usize {
        let r = N_ETA_BINS as f64 / (MAX_ETA - MIN_ETA);
        let bin = ((eta.abs() - MIN_ETA) * r) as isize;
        bin.clamp(0, N_ETA_BINS as isize - 1) as usize
    }

    /// Phi bin of a point, periodic in azimuth.
    pub fn phi_bin(&self, phi: f64) -> usize {
        let r = N_PHI_BINS as f64 / (2.0 * PI);
        let bin = ((normalized_phi(phi) + PI) * r) as usize;
        bin.min(N_PHI_BINS - 1)
    }

    #[inline]
    pub fn global_bin(&self, eta_bin: usize, phi_bin: usize) -> usize {
        phi_bin % N_PHI_BINS + eta_bin * N_PHI_BINS
    }

    /// Inserts an object index into the bin covering (eta, phi).
    pub fn fill(&mut self, eta: f64, phi: f64, index: usize) {
        let bin = self.global_bin(self.eta_bin(eta), self.phi_bin(phi));
        self.bins[bin].push(index);
    }

    /// Inclusive bin rectangle `[eta_lo, eta_hi, phi_lo, phi_hi]` covering the
    /// query window. Eta is clamped to the tile range. When `phi_lo > phi_hi`
    /// the window straddles the periodic boundary: the caller iterates up to
    /// `phi_hi + N_PHI_BINS` and reduces bin indices modulo `N_PHI_BINS` when
    /// dereferencing (`global_bin` already does this).
    pub fn search_box_eta_phi(&self, eta_min: f64, eta_max: f64, phi_min: f64, phi_max: f64) -> [usize; 4] {
        if eta_max < eta_min {
            return [0, 0, 0, 0];
        }
        [
            self.eta_bin(eta_min),
            self.eta_bin(eta_max),
            self.phi_bin(phi_min),
            self.phi_bin(phi_max),
        ]
    }

    pub fn clear(&mut self) {
        for bin in self.bins.iter_mut() {
            bin.clear();
        }
    }
}

impl Default for EtaPhiTile {
    fn default() -> Self {
        EtaPhiTile::new()
    }
}

impl Index<usize> for EtaPhiTile {
    type Output = Vec<usize>;

    fn index(&self, index: usize) -> &Vec<usize> {
        &self.bins[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn collect_box(tile: &EtaPhiTile, b: [usize; 4]) -> Vec<usize> {
        let (phi_lo, mut phi_hi) = (b[2], b[3]);
        if phi_lo > phi_hi {
            phi_hi += N_PHI_BINS;
        }
        let mut found = Vec::new();
        for eta_i in b[0]..=b[1] {
            for phi_i in phi_lo..=phi_hi {
                found.extend_from_slice(&tile[tile.global_bin(eta_i, phi_i)]);
            }
        }
        found
    }

    #[test]
    fn test_eta_bin_clamps() {
        let tile = EtaPhiTile::new();
        assert_eq!(tile.eta_bin(0.3), 0);
        assert_eq!(tile.eta_bin(-0.3), 0);
        assert_eq!(tile.eta_bin(5.0), N_ETA_BINS - 1);
        assert_eq!(tile.eta_bin(MIN_ETA), 0);
    }

    #[test]
    fn test_phi_bin_is_periodic() {
        let tile = EtaPhiTile::new();
        let b = tile.phi_bin(1.0);
        assert_eq!(tile.phi_bin(1.0 + 2.0 * PI), b);
        assert_eq!(tile.phi_bin(1.0 - 2.0 * PI), b);
        assert!(tile.phi_bin(PI - 1e-9) < N_PHI_BINS);
    }

    #[test]
    fn test_fill_and_search() {
        let mut tile = EtaPhiTile::new();
        tile.fill(2.0, 1.0, 3);
        tile.fill(2.8, -2.0, 5);
        let b = tile.search_box_eta_phi(1.95, 2.05, 0.95, 1.05);
        assert_eq!(collect_box(&tile, b), vec![3]);
    }

    #[test]
    fn test_search_box_wraps_around_phi() {
        let mut tile = EtaPhiTile::new();
        tile.fill(2.0, PI - 0.005, 1);
        tile.fill(2.0, -PI + 0.01, 2);
        let b = tile.search_box_eta_phi(1.95, 2.05, PI - 0.06, PI + 0.04);
        assert!(b[2] > b[3]);
        let mut found = collect_box(&tile, b);
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn test_clear_empties_all_bins() {
        let mut tile = EtaPhiTile::new();
        tile.fill(2.0, 0.0, 0);
        tile.clear();
        let b = tile.search_box_eta_phi(MIN_ETA, MAX_ETA, -PI, PI - 1e-9);
        assert!(collect_box(&tile, b).is_empty());
    }

    #[test]
    fn test_random_fills_are_found_by_covering_windows() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut tile = EtaPhiTile::new();
        let points: Vec<(f64, f64)> = (0..200)
            .map(|_| {
                (
                    rng.gen_range(MIN_ETA..MAX_ETA),
                    rng.gen_range(-PI..PI),
                )
            })
            .collect();
        for (i, &(eta, phi)) in points.iter().enumerate() {
            tile.fill(eta, phi, i);
        }
        for (i, &(eta, phi)) in points.iter().enumerate() {
            let b = tile.search_box_eta_phi(eta - 0.05, eta + 0.05, phi - 0.05, phi + 0.05);
            assert!(collect_box(&tile, b).contains(&i), "point {} not found", i);
        }
    }
}
