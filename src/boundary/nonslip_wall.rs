//! Non-slip wall for the Euler equations.
//!
//! Equation layout is `[ρ, ρu_1 .. ρu_ndim, E]`. The ghost state carries the
//! reversed momentum so the face-averaged velocity vanishes in every
//! direction, while density and energy are copied.
//!
//! Gradients are mirrored in the face frame: the normal derivative of ρ and
//! E flips sign, as do the tangential derivatives of every momentum
//! component.

use super::{BoundaryError, GhostContext, GhostResolver};
use crate::mesh::geometry::ZERO;

/// No-slip solid wall.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonSlipWall;

impl NonSlipWall {
    pub fn new() -> Self {
        Self
    }
}

impl GhostResolver for NonSlipWall {
    fn check_layout(&self, neq: usize, ndim: usize) -> Result<(), BoundaryError> {
        if neq != ndim + 2 {
            return Err(BoundaryError::EquationLayout {
                resolver: self.name(),
                neq,
                ndim,
                expected: ndim + 2,
            });
        }
        Ok(())
    }

    fn ghost_soln(&self, ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]) {
        let ndim = ctx.ndim;
        let mut mom = ZERO;
        mom[..ndim].copy_from_slice(&interior[1..=ndim]);
        let local = ctx.frame.to_local(mom);
        let reversed = ctx.frame.to_global([-local[0], -local[1], -local[2]]);

        ghost[0] = interior[0];
        ghost[1..=ndim].copy_from_slice(&reversed[..ndim]);
        ghost[ndim + 1] = interior[ndim + 1];
    }

    fn ghost_dsoln(&self, ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]) {
        let ndim = ctx.ndim;
        for ((ieq, src), dst) in interior
            .chunks_exact(ndim)
            .enumerate()
            .zip(ghost.chunks_exact_mut(ndim))
        {
            let mut g = ZERO;
            g[..ndim].copy_from_slice(src);
            let mut local = ctx.frame.to_local(g);
            if ieq == 0 || ieq == ndim + 1 {
                // Scalars: normal derivative
                local[0] = -local[0];
            } else {
                // Momentum: tangential derivatives
                for c in local.iter_mut().take(ndim).skip(1) {
                    *c = -*c;
                }
            }
            dst.copy_from_slice(&ctx.frame.to_global(local)[..ndim]);
        }
    }

    fn name(&self) -> &'static str {
        "non_slip_wall"
    }
}
