//! Kernel parameters for the slope-limited gradient reconstruction.
//!
//! # Example
//!
//! ```
//! use cese_rs::CeseParameters;
//!
//! let params = CeseParameters::default()
//!     .with_time_increment(1e-3)
//!     .with_alpha(2.0)
//!     .with_sigma0(3.0);
//! assert!(params.validate().is_ok());
//! assert_eq!(params.half_time_increment(), 5e-4);
//! ```

use thiserror::Error;

/// Floor added to squared gradient norms and limiter denominators.
pub const ALMOST_ZERO: f64 = 1e-200;

/// Error type for invalid kernel parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    /// Parameter is NaN or infinite.
    #[error("Parameter {name} is not finite: {value}")]
    NotFinite { name: &'static str, value: f64 },

    /// Parameter outside its admissible range.
    #[error("Parameter {name} = {value} out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Global constants of the c-tau gradient kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CeseParameters {
    /// Decentering floor: `tau = tau_min + |CFL| * tau_scale`
    pub tau_min: f64,

    /// Decentering growth with the local CFL number
    pub tau_scale: f64,

    /// Bias of the dual point toward the CE centroid of the face (0..=1)
    pub cnbfac: f64,

    /// Fraction of the GGE-centroid offset added to every displacement
    pub sftfac: f64,

    /// Weight of the temporal Taylor correction on neighbor values
    pub taylor: f64,

    /// Limiter ceiling numerator: `sigma0 / |CFL|` caps the limiter bound
    pub sigma0: f64,

    /// Exponent of the smoothness weight
    pub alpha: f64,

    /// Time increment of the outer march; half of it enters the Taylor term
    pub time_increment: f64,

    /// Fail the whole call when any computed gradient is NaN or infinite
    pub trap_non_finite: bool,
}

impl Default for CeseParameters {
    fn default() -> Self {
        Self {
            tau_min: 0.0,
            tau_scale: 1.0,
            cnbfac: 1.0,
            sftfac: 1.0,
            taylor: 1.0,
            sigma0: 3.0,
            alpha: 1.0,
            time_increment: 0.0,
            trap_non_finite: false,
        }
    }
}

impl CeseParameters {
    /// Set the decentering floor and scale.
    pub fn with_tau(mut self, tau_min: f64, tau_scale: f64) -> Self {
        self.tau_min = tau_min;
        self.tau_scale = tau_scale;
        self
    }

    /// Set the dual-point bias factor.
    pub fn with_cnbfac(mut self, cnbfac: f64) -> Self {
        self.cnbfac = cnbfac;
        self
    }

    /// Set the GGE shift factor.
    pub fn with_sftfac(mut self, sftfac: f64) -> Self {
        self.sftfac = sftfac;
        self
    }

    /// Set the temporal Taylor blend.
    pub fn with_taylor(mut self, taylor: f64) -> Self {
        self.taylor = taylor;
        self
    }

    /// Set the limiter ceiling numerator.
    pub fn with_sigma0(mut self, sigma0: f64) -> Self {
        self.sigma0 = sigma0;
        self
    }

    /// Set the smoothness weight exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the time increment.
    pub fn with_time_increment(mut self, dt: f64) -> Self {
        self.time_increment = dt;
        self
    }

    /// Enable or disable the non-finite output trap.
    pub fn with_trap_non_finite(mut self, trap: bool) -> Self {
        self.trap_non_finite = trap;
        self
    }

    /// Half of the time increment.
    #[inline]
    pub fn half_time_increment(&self) -> f64 {
        0.5 * self.time_increment
    }

    /// Decentering parameter for a cell with the given CFL number.
    #[inline]
    pub fn tau(&self, cfl: f64) -> f64 {
        self.tau_min + cfl.abs() * self.tau_scale
    }

    /// Limiter ceiling for a cell with the given CFL number.
    ///
    /// A zero CFL number gives an infinite ceiling, i.e. no CFL clamp.
    #[inline]
    pub fn sigma_ceiling(&self, cfl: f64) -> f64 {
        self.sigma0 / cfl.abs()
    }

    /// Check that every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let fields = [
            ("tau_min", self.tau_min),
            ("tau_scale", self.tau_scale),
            ("cnbfac", self.cnbfac),
            ("sftfac", self.sftfac),
            ("taylor", self.taylor),
            ("sigma0", self.sigma0),
            ("alpha", self.alpha),
            ("time_increment", self.time_increment),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name, value });
            }
        }

        let check = |name, value: f64, ok: bool, reason| {
            if ok {
                Ok(())
            } else {
                Err(ParameterError::OutOfRange {
                    name,
                    value,
                    reason,
                })
            }
        };
        check("tau_min", self.tau_min, self.tau_min >= 0.0, "must be >= 0")?;
        check("tau_scale", self.tau_scale, self.tau_scale >= 0.0, "must be >= 0")?;
        check("sigma0", self.sigma0, self.sigma0 > 0.0, "must be > 0")?;
        check("alpha", self.alpha, self.alpha >= 0.0, "must be >= 0")?;
        check(
            "time_increment",
            self.time_increment,
            self.time_increment >= 0.0,
            "must be >= 0",
        )?;
        Ok(())
    }
}
