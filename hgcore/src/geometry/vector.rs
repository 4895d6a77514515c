use nalgebra::Vector3;

/// Angular accessors for cartesian detector coordinates.
///
/// The linking algorithm works in (eta, phi) space; this trait adds the
/// corresponding accessors to `nalgebra::Vector3<f64>` so that propagated
/// points, barycenters and momenta can be queried uniformly.
pub trait EtaPhi {
    /// Pseudorapidity, `asinh(z / perp)`, signed by the z component.
    fn eta(&self) -> f64;
    /// Azimuth in `(-pi, pi]`.
    fn phi(&self) -> f64;
    /// Transverse magnitude `sqrt(x^2 + y^2)`.
    fn perp(&self) -> f64;
}

impl EtaPhi for Vector3<f64> {
    /// Returns the pseudorapidity of the vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::Vector3;
    /// use hgcore::geometry::vector::EtaPhi;
    ///
    /// let v = Vector3::new(1.0, 0.0, 1.0);
    /// assert!((v.eta() - 1.0_f64.asinh()).abs() < 1e-12);
    /// ```
    fn eta(&self) -> f64 {
        (self.z / EtaPhi::perp(self)).asinh()
    }

    /// Returns the azimuth of the vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::Vector3;
    /// use hgcore::geometry::vector::EtaPhi;
    ///
    /// let v = Vector3::new(0.0, 2.0, 1.0);
    /// assert!((v.phi() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    /// ```
    fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    fn perp(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Unit direction for given (eta, phi).
///
/// The returned vector has unit transverse magnitude before normalization,
/// i.e. `(cos(phi), sin(phi), sinh(eta))`, normalized to length one.
pub fn direction_from_eta_phi(eta: f64, phi: f64) -> Vector3<f64> {
    Vector3::new(phi.cos(), phi.sin(), eta.sinh()).normalize()
}
