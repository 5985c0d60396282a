// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render configuration, checked once before any work is scheduled.

use num::Complex;

use error::ConfigError;
use planes::PlaneMapper;
use tracer::Fidelity;

/// Everything a render needs to know, apart from the palette.
#[derive(Copy, Clone, Debug)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration budget per point.
    pub max_iterations: usize,
    /// Real part of the point at the center of the image.
    pub center_real: f64,
    /// Imaginary part of the point at the center of the image.
    pub center_imag: f64,
    /// Width of the viewed window on the real axis.
    pub scale: f64,
    /// How far the tracer trusts a black perimeter.
    pub fidelity: Fidelity,
    /// Number of worker threads.
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: 2000,
            height: 1200,
            max_iterations: 3000,
            center_real: -0.745,
            center_imag: 0.149,
            scale: 0.03,
            fidelity: Fidelity::Trust,
            threads: num_cpus::get(),
        }
    }
}

impl RenderConfig {
    /// Reject configurations that cannot produce an image.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::Width);
        }
        if self.height == 0 {
            return Err(ConfigError::Height);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Iterations);
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Scale(self.scale));
        }
        if !(self.center_real.is_finite() && self.center_imag.is_finite()) {
            return Err(ConfigError::Center);
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }
        if let Fidelity::Sampled(0) = self.fidelity {
            return Err(ConfigError::Probes);
        }
        Ok(())
    }

    /// Height over width.
    pub fn aspect(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    /// The center as a complex number.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(self.center_real, self.center_imag)
    }

    /// Number of pixels in the image.
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// The pixel to complex plane mapping of this view.
    pub fn plane(&self) -> PlaneMapper {
        PlaneMapper::new(self.width, self.height, self.center(), self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RenderConfig {
        RenderConfig {
            width: 100,
            height: 50,
            max_iterations: 100,
            center_real: -0.5,
            center_imag: 0.0,
            scale: 3.0,
            fidelity: Fidelity::Trust,
            threads: 2,
        }
    }

    #[test]
    fn accepts_a_sane_config() {
        assert_eq!(small().validate(), Ok(()));
        assert_eq!(RenderConfig::default().validate(), Ok(()));
        assert_eq!(small().aspect(), 0.5);
        assert_eq!(small().pixels(), 5000);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let mut c = small();
        c.width = 0;
        assert_eq!(c.validate(), Err(ConfigError::Width));
        let mut c = small();
        c.height = 0;
        assert_eq!(c.validate(), Err(ConfigError::Height));
        let mut c = small();
        c.max_iterations = 0;
        assert_eq!(c.validate(), Err(ConfigError::Iterations));
    }

    #[test]
    fn rejects_bad_windows() {
        let mut c = small();
        c.scale = 0.0;
        assert_eq!(c.validate(), Err(ConfigError::Scale(0.0)));
        let mut c = small();
        c.scale = ::std::f64::NAN;
        assert!(c.validate().is_err());
        let mut c = small();
        c.center_imag = ::std::f64::INFINITY;
        assert_eq!(c.validate(), Err(ConfigError::Center));
    }

    #[test]
    fn rejects_no_workers_and_no_probes() {
        let mut c = small();
        c.threads = 0;
        assert_eq!(c.validate(), Err(ConfigError::Threads));
        let mut c = small();
        c.fidelity = Fidelity::Sampled(0);
        assert_eq!(c.validate(), Err(ConfigError::Probes));
    }
}
