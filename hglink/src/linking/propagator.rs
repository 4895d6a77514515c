use nalgebra::Vector3;

use hgcore::data::track::Track;
use hgcore::data::trackster::Trackster;
use hgcore::geometry::disk::BoundDisk;
use hgcore::geometry::tile::EtaPhiTile;
use hgcore::geometry::vector::EtaPhi;

/// External propagation service mapping a track state and a target surface
/// to a point on that surface.
///
/// `None` means the propagation found no valid intersection. A failure is
/// non-fatal: the track is simply absent from the affected propagation
/// stage and is never retried.
pub trait TrackPropagator {
    fn propagate(&self, track: &Track, surface: &BoundDisk) -> Option<Vector3<f64>>;
}

/// Field-free propagation: a straight ray from the origin along the track
/// momentum, intersected with the disk plane. Rays parallel to the plane,
/// pointing away from it, or landing outside the radial bounds fail.
#[derive(Clone, Debug, Default)]
pub struct StraightLinePropagator;

impl TrackPropagator for StraightLinePropagator {
    fn propagate(&self, track: &Track, surface: &BoundDisk) -> Option<Vector3<f64>> {
        let direction = track.momentum.try_normalize(f64::EPSILON)?;
        if direction.z == 0.0 {
            return None;
        }
        let path = surface.z / direction.z;
        if path <= 0.0 {
            return None;
        }
        let point = direction * path;
        surface.contains(&point).then_some(point)
    }
}

/// Projects a trackster onto the plane at `|z| = z_val` and fills the tile
/// of the hemisphere the projected point lands in.
///
/// The projection direction is the unit vector from the origin to the
/// barycenter; the principal-axis direction is deliberately not used. The
/// target plane takes its sign from the barycenter's hemisphere. Returns
/// the intersection point for use in seed collections.
pub fn propagate_trackster(
    trackster: &Trackster,
    index: usize,
    z_val: f64,
    tiles: &mut [EtaPhiTile; 2],
) -> Vector3<f64> {
    let barycenter = trackster.barycenter;
    let direction = barycenter.normalize();

    let z = if barycenter.z > 0.0 { z_val.abs() } else { -z_val.abs() };
    let par = (z - barycenter.z) / direction.z;
    let point = Vector3::new(
        par * direction.x + barycenter.x,
        par * direction.y + barycenter.y,
        z,
    );

    let eta = point.eta();
    if eta > 0.0 {
        tiles[1].fill(eta, point.phi(), index);
    } else if eta < 0.0 {
        tiles[0].fill(eta, point.phi(), index);
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgcore::geometry::vector::direction_from_eta_phi;

    fn track_toward(eta: f64, phi: f64, p: f64) -> Track {
        Track::new(direction_from_eta_phi(eta, phi) * p, 1, true, 0)
    }

    fn trackster_at(eta: f64, phi: f64, z: f64) -> Trackster {
        let direction = direction_from_eta_phi(eta, phi);
        let barycenter = direction * (z / direction.z);
        Trackster::new(barycenter, direction, 10.0, 10.0, [0.0; 8], -99.0, 0.0)
    }

    #[test]
    fn test_straight_line_hits_the_disk() {
        let disk = BoundDisk::new(322.1, 20.0, 200.0).unwrap();
        let track = track_toward(2.0, 0.4, 10.0);
        let point = StraightLinePropagator.propagate(&track, &disk).unwrap();
        assert!((point.z - 322.1).abs() < 1e-9);
        assert!((point.eta() - 2.0).abs() < 1e-9);
        assert!((point.phi() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_backward_track_misses_forward_disk() {
        let disk = BoundDisk::new(322.1, 20.0, 200.0).unwrap();
        let track = track_toward(-2.0, 0.4, 10.0);
        assert!(StraightLinePropagator.propagate(&track, &disk).is_none());
    }

    #[test]
    fn test_point_outside_radial_bounds_fails() {
        // eta 1.0 lands at r = z / sinh(1) ~ 274, outside the annulus
        let disk = BoundDisk::new(322.1, 20.0, 200.0).unwrap();
        let track = track_toward(1.0, 0.0, 10.0);
        assert!(StraightLinePropagator.propagate(&track, &disk).is_none());
    }

    #[test]
    fn test_trackster_projection_keeps_direction() {
        let mut tiles = [EtaPhiTile::new(), EtaPhiTile::new()];
        let trackster = trackster_at(2.0, 1.0, 330.0);
        let point = propagate_trackster(&trackster, 4, 322.1, &mut tiles);
        assert!((point.z - 322.1).abs() < 1e-9);
        assert!((point.eta() - 2.0).abs() < 1e-9);
        // filled into the forward tile under its own coordinates
        let bin = tiles[1].global_bin(tiles[1].eta_bin(2.0), tiles[1].phi_bin(1.0));
        assert_eq!(tiles[1][bin], vec![4]);
        assert!(tiles[0][bin].is_empty());
    }

    #[test]
    fn test_backward_trackster_fills_backward_tile() {
        let mut tiles = [EtaPhiTile::new(), EtaPhiTile::new()];
        let trackster = trackster_at(-2.0, 1.0, -330.0);
        let point = propagate_trackster(&trackster, 0, 322.1, &mut tiles);
        assert!(point.z < 0.0);
        let bin = tiles[0].global_bin(tiles[0].eta_bin(-2.0), tiles[0].phi_bin(1.0));
        assert_eq!(tiles[0][bin], vec![0]);
    }
}
