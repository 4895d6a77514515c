use nalgebra::Vector3;

use hgcore::geometry::tile::{EtaPhiTile, MAX_ETA, MIN_ETA, N_PHI_BINS};
use hgcore::geometry::vector::EtaPhi;

/// Finds tracksters within an (eta, phi) window of each seed point.
///
/// Element `i` of `result_collection` receives the trackster indices found
/// close to the seed whose owning object has id `i` (seeds carry the owning
/// object's index, so the adjacency list is indexed by object id, not by
/// seed position). The hemisphere tile is selected by the sign of the seed
/// point's eta; the eta window is taken on |eta| and clamped to the tile
/// range, the phi window is periodic.
///
/// With `use_mask` set, a found trackster is claimed by the first seed (in
/// iteration order) that sees it and is invisible to every later seed of
/// the same pass. This greedy, order-dependent assignment is a deliberate
/// simplification, not an optimal matching.
pub fn find_tracksters_in_window(
    seeding_collection: &[(Vector3<f64>, usize)],
    trackster_tiles: &[EtaPhiTile; 2],
    delta: f64,
    trackster_count: usize,
    result_collection: &mut [Vec<usize>],
    use_mask: bool,
) {
    let mut mask = vec![false; trackster_count];

    for &(seed_point, seed_id) in seeding_collection {
        let seed_eta = seed_point.eta();
        let seed_phi = seed_point.phi();
        let side = (seed_eta > 0.0) as usize;
        let tile = &trackster_tiles[side];

        // clamp the whole window into the tile range so that seeds below the
        // covered acceptance still probe the boundary bin
        let eta_min = (seed_eta.abs() - delta).clamp(MIN_ETA, MAX_ETA);
        let eta_max = (seed_eta.abs() + delta).clamp(MIN_ETA, MAX_ETA);

        let search_box = tile.search_box_eta_phi(eta_min, eta_max, seed_phi - delta, seed_phi + delta);
        let (phi_lo, mut phi_hi) = (search_box[2], search_box[3]);
        if phi_lo > phi_hi {
            phi_hi += N_PHI_BINS;
        }

        for eta_i in search_box[0]..=search_box[1] {
            for phi_i in phi_lo..=phi_hi {
                for &t_i in &tile[tile.global_bin(eta_i, phi_i)] {
                    if !mask[t_i] {
                        result_collection[seed_id].push(t_i);
                        if use_mask {
                            mask[t_i] = true;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use hgcore::geometry::vector::direction_from_eta_phi;

    fn seed(eta: f64, phi: f64, id: usize) -> (Vector3<f64>, usize) {
        (direction_from_eta_phi(eta, phi) * 330.0, id)
    }

    fn filled_tiles(points: &[(f64, f64)]) -> [EtaPhiTile; 2] {
        let mut tiles = [EtaPhiTile::new(), EtaPhiTile::new()];
        for (i, &(eta, phi)) in points.iter().enumerate() {
            tiles[(eta > 0.0) as usize].fill(eta, phi, i);
        }
        tiles
    }

    #[test]
    fn test_finds_tracksters_in_window() {
        let tiles = filled_tiles(&[(2.0, 1.0), (2.0, -2.0), (-2.0, 1.0)]);
        let mut result = vec![Vec::new(); 1];
        find_tracksters_in_window(&[seed(2.0, 1.0, 0)], &tiles, 0.05, 3, &mut result, false);
        assert_eq!(result[0], vec![0]);
    }

    #[test]
    fn test_window_straddles_the_phi_boundary() {
        let tiles = filled_tiles(&[(2.0, PI - 0.005), (2.0, -PI + 0.01)]);
        let mut result = vec![Vec::new(); 1];
        find_tracksters_in_window(&[seed(2.0, PI - 0.01, 0)], &tiles, 0.05, 2, &mut result, false);
        let mut found = result[0].clone();
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_greedy_mask_claims_for_the_first_seed() {
        let tiles = filled_tiles(&[(2.0, 1.0)]);
        let seeds = vec![seed(2.0, 1.0, 0), seed(2.0, 1.01, 1)];

        let mut masked = vec![Vec::new(); 2];
        find_tracksters_in_window(&seeds, &tiles, 0.05, 1, &mut masked, true);
        assert_eq!(masked[0], vec![0]);
        assert!(masked[1].is_empty());

        // without masking both seeds see the trackster
        let mut unmasked = vec![Vec::new(); 2];
        find_tracksters_in_window(&seeds, &tiles, 0.05, 1, &mut unmasked, false);
        assert_eq!(unmasked[0], vec![0]);
        assert_eq!(unmasked[1], vec![0]);
    }

    #[test]
    fn test_hemispheres_do_not_mix() {
        let tiles = filled_tiles(&[(2.0, 1.0), (-2.0, 1.0)]);
        let mut result = vec![Vec::new(); 2];
        let seeds = vec![seed(2.0, 1.0, 0), seed(-2.0, 1.0, 1)];
        find_tracksters_in_window(&seeds, &tiles, 0.05, 2, &mut result, false);
        assert_eq!(result[0], vec![0]);
        assert_eq!(result[1], vec![1]);
    }
}
