//! Per-sub-element gradient solver.
//!
//! Each sub-element contributes one gradient estimate per equation from the
//! `ndim` dual points it touches. With `dst_k = vertex_k - gge_centroid` and
//! the reconstructed solution difference `u_k` at that vertex, the estimate
//! solves `dst · g = u` through the closed-form adjugate of `dst`.

use super::fields::{FieldView, MAX_EQUATIONS};
use super::gge::DualPoints;
use crate::mesh::geometry::{sub, Vec3, ZERO};
use crate::mesh::{MAX_NDIM, MAX_SUB_ELEMENTS};
use crate::params::{CeseParameters, ALMOST_ZERO};

/// Square matrix up to [`MAX_NDIM`].
pub type Mat3 = [[f64; MAX_NDIM]; MAX_NDIM];

/// Adjugate and determinant of the leading `ndim × ndim` block of `rows`.
#[inline]
pub fn adjugate(rows: &Mat3, ndim: usize) -> (Mat3, f64) {
    let d = rows;
    let mut adj = [[0.0; MAX_NDIM]; MAX_NDIM];
    if ndim == 3 {
        adj[0][0] = d[1][1] * d[2][2] - d[1][2] * d[2][1];
        adj[0][1] = d[0][2] * d[2][1] - d[0][1] * d[2][2];
        adj[0][2] = d[0][1] * d[1][2] - d[0][2] * d[1][1];
        adj[1][0] = d[1][2] * d[2][0] - d[1][0] * d[2][2];
        adj[1][1] = d[0][0] * d[2][2] - d[0][2] * d[2][0];
        adj[1][2] = d[0][2] * d[1][0] - d[0][0] * d[1][2];
        adj[2][0] = d[1][0] * d[2][1] - d[1][1] * d[2][0];
        adj[2][1] = d[0][1] * d[2][0] - d[0][0] * d[2][1];
        adj[2][2] = d[0][0] * d[1][1] - d[0][1] * d[1][0];
        let det = adj[0][2] * d[2][0] + adj[1][2] * d[2][1] + adj[2][2] * d[2][2];
        (adj, det)
    } else {
        adj[0][0] = d[1][1];
        adj[0][1] = -d[0][1];
        adj[1][0] = -d[1][0];
        adj[1][1] = d[0][0];
        let det = d[0][0] * d[1][1] - d[0][1] * d[1][0];
        (adj, det)
    }
}

/// `adj · rhs / det`.
#[inline]
pub fn apply_adjugate(adj: &Mat3, det: f64, rhs: &[f64; MAX_NDIM], ndim: usize) -> Vec3 {
    let mut g = ZERO;
    for (i, gi) in g.iter_mut().enumerate().take(ndim) {
        let mut acc = 0.0;
        for j in 0..ndim {
            acc += adj[i][j] * rhs[j];
        }
        *gi = acc / det;
    }
    g
}

/// Gradient norm floored away from zero: `sqrt(|g|² + ε)`.
#[inline]
pub fn floored_norm(g: Vec3) -> f64 {
    (g[0] * g[0] + g[1] * g[1] + g[2] * g[2] + ALMOST_ZERO).sqrt()
}

/// Gradient estimates of every sub-element of one cell.
#[derive(Clone, Copy, Debug)]
pub struct SubElementGradients {
    /// Number of sub-elements
    pub n_sub: usize,
    /// Gradient per sub-element and equation
    pub grads: [[Vec3; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
    /// Floored gradient norm per sub-element and equation
    pub norms: [[f64; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
}

impl SubElementGradients {
    pub fn new() -> Self {
        Self {
            n_sub: 0,
            grads: [[ZERO; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
            norms: [[0.0; MAX_EQUATIONS]; MAX_SUB_ELEMENTS],
        }
    }

    /// Compute and append the estimate of the sub-element touching the
    /// given 0-based local faces (`faces.len() == ndim`).
    pub fn push(
        &mut self,
        fields: &FieldView<'_>,
        params: &CeseParameters,
        cell: usize,
        dual: &DualPoints,
        gge_centroid: Vec3,
        faces: &[usize],
    ) {
        let ndim = fields.ndim;
        debug_assert_eq!(faces.len(), ndim);
        let neq = fields.neq;
        let hdt = params.half_time_increment();
        let taylor = params.taylor;
        let own = fields.soln(cell);

        let mut dst: Mat3 = [[0.0; MAX_NDIM]; MAX_NDIM];
        let mut udf = [[0.0; MAX_NDIM]; MAX_EQUATIONS];
        for (ivx, &ifl) in faces.iter().enumerate() {
            let jcl = dual.neighbors[ifl];
            dst[ivx] = sub(dual.vertices[ifl], gge_centroid);
            let disp = dual.displacements[ifl];

            let jsol = fields.sol(jcl);
            let jsoln = fields.soln(jcl);
            let jsolt = fields.solt(jcl);
            let jdsol = fields.dsol(jcl);
            for ieq in 0..neq {
                let dt_term = taylor * (jsol[ieq] + hdt * jsolt[ieq] - jsoln[ieq]);
                let mut diff = jsoln[ieq] + dt_term - own[ieq];
                let grad = &jdsol[ieq * ndim..(ieq + 1) * ndim];
                for idm in 0..ndim {
                    diff += disp[idm] * grad[idm];
                }
                udf[ieq][ivx] = diff;
            }
        }

        let (adj, det) = adjugate(&dst, ndim);
        let ifg = self.n_sub;
        for ieq in 0..neq {
            let g = apply_adjugate(&adj, det, &udf[ieq], ndim);
            self.grads[ifg][ieq] = g;
            self.norms[ifg][ieq] = floored_norm(g);
        }
        self.n_sub += 1;
    }
}

impl Default for SubElementGradients {
    fn default() -> Self {
        Self::new()
    }
}
