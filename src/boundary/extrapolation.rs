//! Zeroth-order extrapolation for open boundaries.
//!
//! The ghost cell copies the interior state and gradient, which makes the
//! face transparent to outgoing waves to first order.

use super::{GhostContext, GhostResolver};

/// Copy the interior cell into the ghost cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Extrapolation;

impl GhostResolver for Extrapolation {
    fn ghost_soln(&self, _ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]) {
        ghost.copy_from_slice(interior);
    }

    fn ghost_dsoln(&self, _ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]) {
        ghost.copy_from_slice(interior);
    }

    fn name(&self) -> &'static str {
        "extrapolation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::resolve_face;
    use crate::mesh::MeshBlockBuilder;
    use crate::solver::SolutionFields;
    use crate::types::FaceIndex;

    #[test]
    fn test_copies_state_and_gradient() {
        let block = MeshBlockBuilder::rectangle_triangles(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
        let mut fields = SolutionFields::new(&block, 2).unwrap();
        for icl in 0..block.n_cells {
            let soln = fields.soln_mut(icl);
            soln[0] = icl as f64;
            soln[1] = -(icl as f64);
            fields.dsoln[icl * 4..(icl + 1) * 4].fill(icl as f64 + 0.5);
        }
        let bf = block.boundary_faces[3];
        resolve_face(&block, &mut fields, FaceIndex::new(bf.face), &Extrapolation).unwrap();

        let [inner, ghost] = block.face_cells[bf.face];
        assert_eq!(ghost, bf.ghost);
        assert_eq!(fields.soln(ghost), fields.soln(inner));
        assert_eq!(fields.dsoln(ghost), fields.dsoln(inner));
        // Other ghosts untouched
        let other = block.boundary_faces[0].ghost;
        assert_eq!(fields.soln(other), &[0.0, 0.0]);
    }
}
