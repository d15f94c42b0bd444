//! Grouped geometry element (GGE) construction.
//!
//! For one cell the GGE is spanned by one dual point per face. Each dual
//! point sits on the segment from the neighbor's solution point toward a
//! shift point near the face, at a CFL-dependent fraction `tau`:
//!
//! ```text
//! mid    = (c_own + c_nbr) / 2
//! shift  = mid + cnbfac * (ce_face - mid)
//! vertex = (c_nbr - shift) * tau + shift
//! disp   = vertex - c_nbr
//! ```
//!
//! The GGE centroid then recenters every displacement by
//! `sftfac * (c_own - gge_centroid)`.

use crate::mesh::geometry::{add, cross, dot, scale, sub, Vec3, ZERO};
use crate::mesh::{MeshBlock, MAX_CELL_FACES};

/// Dual points of one cell, in the cell's local face order.
#[derive(Clone, Copy, Debug)]
pub struct DualPoints {
    /// Number of faces
    pub count: usize,
    /// GGE vertex per face
    pub vertices: [Vec3; MAX_CELL_FACES],
    /// Displacement from the neighbor's solution point to the vertex
    pub displacements: [Vec3; MAX_CELL_FACES],
    /// Neighbor cell across each face
    pub neighbors: [usize; MAX_CELL_FACES],
}

impl DualPoints {
    /// Build the dual points of interior cell `cell`.
    pub fn build(block: &MeshBlock, cell: usize, tau: f64, cnbfac: f64) -> Self {
        let faces = block.cell_faces[cell].as_slice();
        let ce = &block.ce_centroids[cell];
        let own = ce[0];

        let mut out = Self {
            count: faces.len(),
            vertices: [ZERO; MAX_CELL_FACES],
            displacements: [ZERO; MAX_CELL_FACES],
            neighbors: [0; MAX_CELL_FACES],
        };
        for (ifl, &ifc) in faces.iter().enumerate() {
            let jcl = block.neighbor_raw(cell, ifc);
            let nbr = block.ce_centroids[jcl][0];
            let mid = scale(add(own, nbr), 0.5);
            let shift = add(mid, scale(sub(ce[ifl + 1], mid), cnbfac));
            let vertex = add(scale(sub(nbr, shift), tau), shift);
            out.vertices[ifl] = vertex;
            out.displacements[ifl] = sub(vertex, nbr);
            out.neighbors[ifl] = jcl;
        }
        out
    }

    /// Vertices in face order.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices[..self.count]
    }

    /// Add `sftfac * (own - gge_centroid)` to every displacement.
    pub fn shift(&mut self, own: Vec3, gge_centroid: Vec3, sftfac: f64) {
        let sft = scale(sub(own, gge_centroid), sftfac);
        for d in &mut self.displacements[..self.count] {
            *d = add(*d, sft);
        }
    }
}

/// Unsigned measure of the simplex spanned by `edges[..ndim]` from a common
/// apex: area in 2-D, volume in 3-D.
#[inline]
pub fn simplex_measure(edges: &[Vec3], ndim: usize) -> f64 {
    if ndim == 3 {
        dot(cross(edges[0], edges[1]), edges[2]).abs() / 6.0
    } else {
        (edges[0][0] * edges[1][1] - edges[0][1] * edges[1][0]).abs() / 2.0
    }
}

/// Volume-weighted GGE centroid over the given sub-elements.
///
/// Each row lists `ndim` 1-based local face numbers. Every sub-element is
/// the simplex spanned by those dual points and the average dual point.
pub fn generic_centroid(dual: &DualPoints, ndim: usize, rows: &[[i8; 3]]) -> Vec3 {
    let crd = scale(
        dual.vertices()
            .iter()
            .fold(ZERO, |acc, &v| add(acc, v)),
        1.0 / dual.count as f64,
    );

    let mut volume = 0.0;
    let mut centroid = ZERO;
    let mut edges = [ZERO; 3];
    for row in rows {
        let mut cnd = crd;
        for (ivx, edge) in edges.iter_mut().enumerate().take(ndim) {
            let v = dual.vertices[(row[ivx] - 1) as usize];
            cnd = add(cnd, v);
            *edge = sub(v, crd);
        }
        let cnd = scale(cnd, 1.0 / (ndim + 1) as f64);
        let vob = simplex_measure(&edges, ndim);
        volume += vob;
        centroid = add(centroid, scale(cnd, vob));
    }
    scale(centroid, 1.0 / volume)
}

/// GGE centroid of a simplex cell: the mean of its dual points.
#[inline]
pub fn simplex_centroid(dual: &DualPoints) -> Vec3 {
    let sum = dual.vertices().iter().fold(ZERO, |acc, &v| add(acc, v));
    scale(sum, 1.0 / dual.count as f64)
}
