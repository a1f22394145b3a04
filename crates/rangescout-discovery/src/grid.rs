//! Lattice of sweep points around a source coordinate.
//!
//! Points sit on integer multiples of 1/1200 degree from the centre on both
//! axes. The provider step only controls how many lattice rows and columns
//! are scanned (`ceil(radius / step)` each way), which keeps the point set
//! reproducible from run to run.

use rangescout_core::Coordinates;

use crate::error::DiscoveryError;
use crate::geo::distance_meters;

/// Lattice spacing in degrees.
pub const GRID_DEGREES: f64 = 1.0 / 1200.0;

/// Single-pass iterator over the sweep points of one request.
///
/// Yields the centre first, then every lattice point within the radius in
/// row-major `(i, j)` order with `i, j` ranging over `[-n, n)`. Rows beyond a
/// pole are skipped and a row on the pole contributes a single point.
#[derive(Debug)]
pub struct Grid {
    center: Coordinates,
    radius_meters: f64,
    n: i32,
    i: i32,
    j: i32,
    center_emitted: bool,
}

impl Grid {
    /// Builds the grid for `center`, failing when no point other than the
    /// centre would fall inside the radius.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoCoverage`] when the radius or step is zero
    /// or no ring point fits, and [`DiscoveryError::InvalidRequest`] when the
    /// lattice would be too large to index.
    pub fn new(
        center: Coordinates,
        radius_meters: u32,
        step_meters: u32,
    ) -> Result<Self, DiscoveryError> {
        let no_coverage = DiscoveryError::NoCoverage {
            radius_meters,
            step_meters,
        };
        if radius_meters == 0 || step_meters == 0 {
            return Err(no_coverage);
        }

        let n = i32::try_from(radius_meters.div_ceil(step_meters)).map_err(|_| {
            DiscoveryError::InvalidRequest(format!(
                "radius {radius_meters} m is too large for a {step_meters} m grid"
            ))
        })?;

        let mut probe = Self::start(center, radius_meters, n);
        if probe.nth(1).is_none() {
            return Err(no_coverage);
        }

        Ok(Self::start(center, radius_meters, n))
    }

    fn start(center: Coordinates, radius_meters: u32, n: i32) -> Self {
        Self {
            center,
            radius_meters: f64::from(radius_meters),
            n,
            i: -n,
            j: -n,
            center_emitted: false,
        }
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        self.center
    }

    fn advance(&mut self) {
        self.j += 1;
        if self.j >= self.n {
            self.j = -self.n;
            self.i += 1;
        }
    }
}

impl Iterator for Grid {
    type Item = Coordinates;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.center_emitted {
            self.center_emitted = true;
            return Some(self.center);
        }

        while self.i < self.n {
            let (i, j) = (self.i, self.j);
            self.advance();
            if i == 0 && j == 0 {
                continue;
            }

            let lat = self.center.lat + f64::from(i) * GRID_DEGREES;
            // Rows past a pole would clamp onto it, and a pole row is one spot.
            if lat.abs() > 90.0 || (j != 0 && lat.abs() >= 90.0) {
                continue;
            }

            let candidate =
                Coordinates::wrapped(lat, self.center.lng + f64::from(j) * GRID_DEGREES);
            let distance = distance_meters(self.center, candidate);
            if distance > 0.0 && distance <= self.radius_meters {
                return Some(candidate);
            }
        }

        None
    }
}

impl std::iter::FusedIterator for Grid {}
