use nalgebra::Vector3;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::geometry::vector::EtaPhi;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid radial bounds: r_min {r_min}, r_max {r_max}")]
    InvalidRadialBounds { r_min: f64, r_max: f64 },

    #[error("invalid disk z position: {0}")]
    InvalidZ(f64),
}

/// A bounded disk perpendicular to the beam axis.
///
/// Reference surfaces for propagation are annular disks at fixed z; a
/// propagated point counts as on-surface when it lies inside the radial
/// bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundDisk {
    pub z: f64,
    pub r_min: f64,
    pub r_max: f64,
}

impl BoundDisk {
    pub fn new(z: f64, r_min: f64, r_max: f64) -> Result<Self, GeometryError> {
        if !z.is_finite() || z == 0.0 {
            return Err(GeometryError::InvalidZ(z));
        }
        if !r_min.is_finite() || !r_max.is_finite() || r_min < 0.0 || r_max <= r_min {
            return Err(GeometryError::InvalidRadialBounds { r_min, r_max });
        }
        Ok(BoundDisk { z, r_min, r_max })
    }

    /// True if the point's transverse radius lies inside the annulus.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        let r = EtaPhi::perp(point);
        r >= self.r_min && r <= self.r_max
    }

    /// Hemisphere index: 0 backward (z < 0), 1 forward (z > 0).
    pub fn side(&self) -> usize {
        (self.z > 0.0) as usize
    }
}

/// Geometry constants a detector-conditions service supplies: z positions of
/// the calorimeter front face and of the electromagnetic/hadronic interface,
/// with the radial bounds of each disk. Units are centimeters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorGeometry {
    pub z_front: f64,
    pub z_interface: f64,
    pub r_front: (f64, f64),
    pub r_interface: (f64, f64),
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        // nominal endcap values, overridden by the conditions service
        DetectorGeometry {
            z_front: 322.1,
            z_interface: 364.0,
            r_front: (26.0, 152.0),
            r_interface: (30.0, 172.0),
        }
    }
}

/// The two pairs of reference surfaces, built once at algorithm
/// initialization. Index 0 is the backward hemisphere (negative z),
/// index 1 the forward one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceSurfaces {
    pub front_disks: [BoundDisk; 2],
    pub interface_disks: [BoundDisk; 2],
}

impl ReferenceSurfaces {
    /// Builds the front and interface disk pairs from geometry constants.
    ///
    /// Fails on invalid constants; the linking algorithm cannot run without
    /// valid reference surfaces.
    pub fn build(geometry: &DetectorGeometry) -> Result<Self, GeometryError> {
        let (r_min, r_max) = geometry.r_front;
        let (ri_min, ri_max) = geometry.r_interface;
        Ok(ReferenceSurfaces {
            front_disks: [
                BoundDisk::new(-geometry.z_front.abs(), r_min, r_max)?,
                BoundDisk::new(geometry.z_front.abs(), r_min, r_max)?,
            ],
            interface_disks: [
                BoundDisk::new(-geometry.z_interface.abs(), ri_min, ri_max)?,
                BoundDisk::new(geometry.z_interface.abs(), ri_min, ri_max)?,
            ],
        })
    }
}
