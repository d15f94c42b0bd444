//! CESE gradient solver.
//!
//! # Submodules
//!
//! - [`fields`]: Solution arrays and the read-only kernel view
//! - [`gge`]: Dual points and grouped geometry element centroids
//! - [`gradient`]: Per-sub-element gradient estimates
//! - [`limiter`]: W-3/4 nonlinear weighting
//! - [`kernel`]: Generic and simplex per-cell kernels
//! - [`many_core`]: Block/thread launch model
//!
//! # Drivers
//!
//! - [`compute_dsoln_range`]: serial
//! - [`compute_dsoln_parallel`]: rayon (`parallel` feature)
//! - [`compute_dsoln_many_core`]: many-core launch

mod dispatch;
mod error;
pub mod fields;
pub mod gge;
pub mod gradient;
pub mod kernel;
pub mod limiter;
pub mod many_core;

pub use dispatch::{compute_dsoln_many_core, compute_dsoln_range, GradientCost, KernelFlavor};
#[cfg(feature = "parallel")]
pub use dispatch::compute_dsoln_parallel;
pub use error::GradientError;
pub use fields::{FieldView, SolutionFields, MAX_EQUATIONS};
pub use kernel::{cell_gradient_generic, cell_gradient_simplex, CellGradient, GradientContext};
pub use many_core::{LaunchConfig, ThreadId};
