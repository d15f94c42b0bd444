//! Integration tests for ghost-cell resolvers.
//!
//! These tests verify:
//! - Wall ghosts reverse momentum and mirror gradients
//! - Open-boundary ghosts copy the interior
//! - The full pipeline from a Gmsh file through the resolvers to `dsoln`

use std::io::Write;

use approx::assert_relative_eq;
use cese_rs::{
    compute_dsoln_range, read_gmsh_block, resolve_ghost_dsoln, resolve_ghost_soln, BoundaryError,
    BoundaryTag, CeseParameters, Extrapolation, KernelFlavor, MeshBlockBuilder, NonSlipWall,
    SolutionFields,
};
use tempfile::NamedTempFile;

const TOL: f64 = 1e-12;

#[test]
fn test_wall_ghost_momentum_reversed_2d() {
    let block = MeshBlockBuilder::rectangle_mixed(0.0, 2.0, 0.0, 1.0, 4, 2).unwrap();
    let mut fields = SolutionFields::new(&block, 4).unwrap();
    fields.fill_uniform(&[1.0, 0.3, -0.7, 2.5]);

    let n = resolve_ghost_soln(&block, &mut fields, BoundaryTag::Wall, &NonSlipWall).unwrap();
    assert_eq!(n, block.n_ghost_cells);

    for bf in &block.boundary_faces {
        let [inner, ghost] = block.face_cells[bf.face];
        let i = fields.soln(inner).to_vec();
        let g = fields.soln(ghost);
        assert_relative_eq!(g[0], i[0]);
        assert_relative_eq!(g[1], -i[1], epsilon = TOL);
        assert_relative_eq!(g[2], -i[2], epsilon = TOL);
        assert_relative_eq!(g[3], i[3]);
        // Face-averaged momentum vanishes
        assert_relative_eq!(g[1] + i[1], 0.0, epsilon = TOL);
    }
}

#[test]
fn test_wall_gradient_mirror_on_vertical_walls() {
    let block = MeshBlockBuilder::rectangle_quads(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
    let mut fields = SolutionFields::new(&block, 4).unwrap();
    for icl in 0..block.n_cells {
        fields.dsoln[icl * 8..(icl + 1) * 8].copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
    resolve_ghost_dsoln(&block, &mut fields, BoundaryTag::Wall, &NonSlipWall).unwrap();

    for bf in &block.boundary_faces {
        let normal = block.face_normals[bf.face];
        if normal[1].abs() > 0.5 {
            continue;
        }
        // x-normal walls: scalars flip d/dx, momentum flips d/dy
        let g = fields.dsoln(bf.ghost);
        let expected = [-1.0, 2.0, 3.0, -4.0, 5.0, -6.0, -7.0, 8.0];
        for (a, b) in g.iter().zip(&expected) {
            assert_relative_eq!(*a, *b, epsilon = TOL);
        }
    }
}

#[test]
fn test_wall_requires_euler_layout() {
    let block = MeshBlockBuilder::box_hexahedra([0.0; 3], [1.0; 3], 1, 1, 1).unwrap();
    let mut fields = SolutionFields::new(&block, 4).unwrap();
    let result = resolve_ghost_soln(&block, &mut fields, BoundaryTag::Wall, &NonSlipWall);
    assert_eq!(
        result,
        Err(BoundaryError::EquationLayout {
            resolver: "non_slip_wall",
            neq: 4,
            ndim: 3,
            expected: 5,
        })
    );
}

#[test]
fn test_extrapolation_copies_everything() {
    let block = MeshBlockBuilder::box_prisms([0.0; 3], [1.0; 3], 2, 1, 1).unwrap();
    let mut fields = SolutionFields::new(&block, 2).unwrap();
    fields.sample(
        &block,
        |x, out| {
            out[0] = x[0] + 2.0 * x[2];
            out[1] = 1.0;
        },
        |_, out| out.copy_from_slice(&[1.0, 0.0, 2.0, 0.0, 0.0, 0.0]),
    );
    fields.dsoln.copy_from_slice(&fields.dsol);
    resolve_ghost_soln(&block, &mut fields, BoundaryTag::Wall, &Extrapolation).unwrap();
    resolve_ghost_dsoln(&block, &mut fields, BoundaryTag::Wall, &Extrapolation).unwrap();

    for bf in &block.boundary_faces {
        let [inner, ghost] = block.face_cells[bf.face];
        assert_eq!(fields.soln(ghost), fields.soln(inner));
        assert_eq!(fields.view().sol(ghost), fields.view().sol(inner));
        assert_eq!(fields.dsoln(ghost), fields.dsoln(inner));
    }
}

#[test]
fn test_gmsh_channel_pipeline() {
    // Unit square of two triangles: bottom and top are walls, left and right open
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
$EndNodes
$Elements
6
1 1 2 1 1 1 2
2 1 2 2 2 2 3
3 1 2 1 1 3 4
4 1 2 2 2 4 1
5 2 2 0 0 1 2 3
6 2 2 0 0 1 3 4
$EndElements"#
    )
    .unwrap();

    let block = read_gmsh_block(file.path(), 2).unwrap();
    assert_eq!(block.boundary_faces_tagged(BoundaryTag::Wall).count(), 2);
    assert_eq!(block.boundary_faces_tagged(BoundaryTag::Open).count(), 2);

    let mut fields = SolutionFields::new(&block, 4).unwrap();
    fields.fill_uniform(&[1.0, 0.4, 0.0, 2.5]);
    fields.fill_cfl(0.6);

    let walls = resolve_ghost_soln(&block, &mut fields, BoundaryTag::Wall, &NonSlipWall).unwrap();
    let open = resolve_ghost_soln(&block, &mut fields, BoundaryTag::Open, &Extrapolation).unwrap();
    assert_eq!(walls + open, block.n_ghost_cells);
    resolve_ghost_dsoln(&block, &mut fields, BoundaryTag::Wall, &NonSlipWall).unwrap();
    resolve_ghost_dsoln(&block, &mut fields, BoundaryTag::Open, &Extrapolation).unwrap();

    let params = CeseParameters::default()
        .with_alpha(2.0)
        .with_time_increment(1e-3)
        .with_trap_non_finite(true);
    let flavor = KernelFlavor::for_block(&block);
    assert_eq!(flavor, KernelFlavor::Simplex);
    let cost = compute_dsoln_range(&block, &mut fields, &params, flavor, 0..block.n_cells).unwrap();
    assert_eq!(cost.cells, 2);

    // Density and energy are uniform, so their gradients stay zero
    for icl in 0..block.n_cells {
        for eq in [0, 3] {
            for &v in fields.dsoln_eq(icl, eq) {
                assert_relative_eq!(v, 0.0, epsilon = TOL);
            }
        }
        // Momentum gradients stay finite next to the reversed wall ghosts
        assert!(fields.dsoln_eq(icl, 1).iter().all(|v| v.is_finite()));
    }
}
