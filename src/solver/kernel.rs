//! Per-cell gradient kernels.
//!
//! Both kernels are pure functions of `(cell, read-only context)`:
//!
//! - [`cell_gradient_generic`] handles every cell shape through the GGE
//!   sub-element table of the cell type.
//! - [`cell_gradient_simplex`] handles triangles and tetrahedra with fixed
//!   loop bounds and no table lookup. It gives the same result as the
//!   generic kernel on simplices.

use super::fields::{FieldView, MAX_EQUATIONS};
use super::gge::{generic_centroid, simplex_centroid, DualPoints};
use super::gradient::SubElementGradients;
use super::limiter::{deviations, final_weight, limit_equation, raw_bound, smoothness_weights};
use crate::mesh::{MeshBlock, MAX_NDIM, MAX_SUB_ELEMENTS};
use crate::params::CeseParameters;

/// Sub-elements of a triangle as 0-based local faces.
const TRIANGLE_SUB_ELEMENTS: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

/// Sub-elements of a tetrahedron as 0-based local faces.
const TETRAHEDRON_SUB_ELEMENTS: [[usize; 3]; 4] = [[2, 0, 1], [1, 0, 3], [3, 0, 2], [1, 3, 2]];

/// Read-only state shared by every cell of one kernel invocation.
#[derive(Clone, Copy, Debug)]
pub struct GradientContext<'a> {
    pub block: &'a MeshBlock,
    pub fields: FieldView<'a>,
    pub params: &'a CeseParameters,
}

/// Limited gradient of one cell.
#[derive(Clone, Copy, Debug)]
pub struct CellGradient {
    /// Number of equations
    pub neq: usize,
    /// Spatial dimension
    pub ndim: usize,
    /// Number of GGE sub-elements
    pub n_sub: usize,
    /// Gradient per equation
    pub values: [[f64; MAX_NDIM]; MAX_EQUATIONS],
    /// Limiter bound per equation, after the CFL clamp
    pub bounds: [f64; MAX_EQUATIONS],
    /// Final weight per sub-element and equation
    pub weights: [[f64; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
}

impl CellGradient {
    fn new(neq: usize, ndim: usize, n_sub: usize) -> Self {
        Self {
            neq,
            ndim,
            n_sub,
            values: [[0.0; MAX_NDIM]; MAX_EQUATIONS],
            bounds: [0.0; MAX_EQUATIONS],
            weights: [[0.0; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
        }
    }

    /// Gradient of one equation.
    #[inline]
    pub fn value(&self, eq: usize) -> &[f64] {
        &self.values[eq][..self.ndim]
    }

    /// First equation with a NaN or infinite component, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.neq).find(|&eq| self.value(eq).iter().any(|v| !v.is_finite()))
    }

    /// Write into a `dsoln` slot of `neq * ndim` values, replacing its content.
    #[inline]
    pub fn write_into(&self, slot: &mut [f64]) {
        for (eq, out) in slot.chunks_exact_mut(self.ndim).enumerate() {
            out.copy_from_slice(self.value(eq));
        }
    }

    fn accumulate(&mut self, grads: &SubElementGradients, ifg: usize, eq: usize, weight: f64) {
        self.weights[ifg][eq] = weight;
        let g = grads.grads[ifg][eq];
        for idm in 0..self.ndim {
            self.values[eq][idm] += weight * g[idm];
        }
    }
}

/// Kernel signature shared by the generic and simplex kernels.
pub type CellKernel = fn(&GradientContext<'_>, usize) -> CellGradient;

/// Limited gradient of any interior cell.
pub fn cell_gradient_generic(ctx: &GradientContext<'_>, cell: usize) -> CellGradient {
    let block = ctx.block;
    let params = ctx.params;
    let ndim = block.ndim;
    let neq = ctx.fields.neq;

    let cfl = ctx.fields.cfl[cell];
    let ceiling = params.sigma_ceiling(cfl);
    let tau = params.tau(cfl);

    let rows = block.cell_types[cell].gge_sub_elements();
    let mut dual = DualPoints::build(block, cell, tau, params.cnbfac);
    let gge_centroid = generic_centroid(&dual, ndim, rows);
    dual.shift(block.ce_centroids[cell][0], gge_centroid, params.sftfac);

    let mut grads = SubElementGradients::new();
    let mut faces = [0usize; MAX_NDIM];
    for row in rows {
        for (ivx, face) in faces.iter_mut().enumerate().take(ndim) {
            *face = (row[ivx] - 1) as usize;
        }
        grads.push(&ctx.fields, params, cell, &dual, gge_centroid, &faces[..ndim]);
    }

    let n_sub = grads.n_sub;
    let mut out = CellGradient::new(neq, ndim, n_sub);
    let mut norms = [0.0; MAX_SUB_ELEMENTS];
    let mut weights = [0.0; MAX_SUB_ELEMENTS];
    for eq in 0..neq {
        for ifg in 0..n_sub {
            norms[ifg] = grads.norms[ifg][eq];
        }
        out.bounds[eq] = limit_equation(
            &norms[..n_sub],
            params.alpha,
            ceiling,
            &mut weights[..n_sub],
        );
        for (ifg, &w) in weights[..n_sub].iter().enumerate() {
            out.accumulate(&grads, ifg, eq, w);
        }
    }
    out
}

/// Limited gradient of a triangle or tetrahedron.
///
/// The cell must be a simplex of the block's dimension; the drivers check
/// this before dispatching.
pub fn cell_gradient_simplex(ctx: &GradientContext<'_>, cell: usize) -> CellGradient {
    debug_assert!(ctx.block.cell_types[cell].is_simplex());
    if ctx.block.ndim == 3 {
        simplex_kernel(ctx, cell, &TETRAHEDRON_SUB_ELEMENTS)
    } else {
        simplex_kernel(ctx, cell, &TRIANGLE_SUB_ELEMENTS)
    }
}

fn simplex_kernel<const NDIM: usize, const NFACE: usize>(
    ctx: &GradientContext<'_>,
    cell: usize,
    rows: &[[usize; NDIM]; NFACE],
) -> CellGradient {
    let block = ctx.block;
    let params = ctx.params;
    let neq = ctx.fields.neq;

    let cfl = ctx.fields.cfl[cell];
    let ceiling = params.sigma_ceiling(cfl);
    let tau = params.tau(cfl);

    let mut dual = DualPoints::build(block, cell, tau, params.cnbfac);
    let gge_centroid = simplex_centroid(&dual);
    dual.shift(block.ce_centroids[cell][0], gge_centroid, params.sftfac);

    let mut grads = SubElementGradients::new();
    for row in rows {
        grads.push(&ctx.fields, params, cell, &dual, gge_centroid, row);
    }

    let base = 1.0 / NFACE as f64;
    let mut out = CellGradient::new(neq, NDIM, NFACE);
    let mut norms = [0.0; NFACE];
    let mut deltas = [0.0; NFACE];
    for eq in 0..neq {
        for ifg in 0..NFACE {
            norms[ifg] = grads.norms[ifg][eq];
        }
        let sum = smoothness_weights(&norms, params.alpha, &mut deltas);
        let (dmax, dmin) = deviations(&mut deltas, sum, base);
        let bound = raw_bound(base, dmax, dmin);
        out.bounds[eq] = bound.min(ceiling);
        for (ifg, &delta) in deltas.iter().enumerate() {
            let w = final_weight(base, bound.min(ceiling), delta);
            out.accumulate(&grads, ifg, eq, w);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CellType, MeshBlockBuilder};
    use crate::solver::fields::SolutionFields;
    use approx::assert_relative_eq;

    #[test]
    fn test_simplex_tables_match_gge_rows() {
        let to_zero_based = |t: CellType, ndim: usize| -> Vec<Vec<usize>> {
            t.gge_sub_elements()
                .iter()
                .map(|r| r[..ndim].iter().map(|&f| (f - 1) as usize).collect())
                .collect()
        };
        let tri: Vec<Vec<usize>> = TRIANGLE_SUB_ELEMENTS.iter().map(|r| r.to_vec()).collect();
        assert_eq!(tri, to_zero_based(CellType::Triangle, 2));
        let tet: Vec<Vec<usize>> = TETRAHEDRON_SUB_ELEMENTS.iter().map(|r| r.to_vec()).collect();
        assert_eq!(tet, to_zero_based(CellType::Tetrahedron, 3));
    }

    #[test]
    fn test_uniform_field_gives_zero_gradient() {
        let block = MeshBlockBuilder::rectangle_mixed(0.0, 1.0, 0.0, 1.0, 3, 3).unwrap();
        let mut fields = SolutionFields::new(&block, 4).unwrap();
        fields.fill_uniform(&[1.0, 0.0, 0.0, 2.0]);
        fields.fill_cfl(0.5);
        let params = CeseParameters::default().with_alpha(2.0);
        let ctx = GradientContext {
            block: &block,
            fields: fields.view(),
            params: &params,
        };
        for icl in 0..block.n_cells {
            let g = cell_gradient_generic(&ctx, icl);
            for eq in 0..4 {
                assert_eq!(g.value(eq), &[0.0, 0.0]);
            }
        }
    }

    #[test]
    fn test_kernels_agree_on_triangle() {
        let block = MeshBlockBuilder::rectangle_triangles(0.0, 1.0, 0.0, 1.0, 3, 3).unwrap();
        let mut fields = SolutionFields::new(&block, 2).unwrap();
        fields.sample(
            &block,
            |x, out| {
                out[0] = (3.0 * x[0]).sin() + x[1] * x[1];
                out[1] = 1.0 + x[0] * x[1];
            },
            |_, out| out.fill(0.0),
        );
        fields.fill_cfl(0.3);
        let params = CeseParameters::default().with_alpha(2.0);
        let ctx = GradientContext {
            block: &block,
            fields: fields.view(),
            params: &params,
        };
        for icl in 0..block.n_cells {
            let a = cell_gradient_generic(&ctx, icl);
            let b = cell_gradient_simplex(&ctx, icl);
            assert_eq!(a.n_sub, 3);
            assert_eq!(b.n_sub, 3);
            for eq in 0..2 {
                for d in 0..2 {
                    assert_relative_eq!(a.value(eq)[d], b.value(eq)[d], epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_write_into_replaces_slot() {
        let mut g = CellGradient::new(2, 2, 3);
        g.values[0] = [1.0, 2.0, 0.0];
        g.values[1] = [3.0, 4.0, 0.0];
        let mut slot = [9.0; 4];
        g.write_into(&mut slot);
        assert_eq!(slot, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(g.first_non_finite(), None);
        g.values[1][1] = f64::NAN;
        assert_eq!(g.first_non_finite(), Some(1));
    }
}
