//! End-to-end scenarios on a small hand-built mesh.
//!
//! The mesh is an equilateral triangle with unit sides surrounded by its
//! three mirror images, so the center cell sees only interior neighbors.

use approx::assert_relative_eq;
use cese_rs::{
    compute_dsoln_many_core, compute_dsoln_range, CellType, CeseParameters, KernelFlavor,
    LaunchConfig, MeshBlock, MeshBlockBuilder, SolutionFields,
};

const CENTER: usize = 0;
/// Neighbor across the face (B, C)
const PERTURBED: usize = 2;

fn star_mesh() -> MeshBlock {
    let h = 3.0_f64.sqrt() / 2.0;
    let nodes = vec![
        [0.0, 0.0, 0.0], // A
        [1.0, 0.0, 0.0], // B
        [0.5, h, 0.0],   // C
        [0.5, -h, 0.0],  // C mirrored across AB
        [1.5, h, 0.0],   // A mirrored across BC
        [-0.5, h, 0.0],  // B mirrored across CA
    ];
    let mut builder = MeshBlockBuilder::new(2).with_nodes(nodes);
    builder
        .add_cell(CellType::Triangle, &[0, 1, 2])
        .add_cell(CellType::Triangle, &[0, 3, 1])
        .add_cell(CellType::Triangle, &[1, 4, 2])
        .add_cell(CellType::Triangle, &[2, 5, 0]);
    builder.build().unwrap()
}

/// Euler-like fields with density `1 + slope * x` at the solution points.
fn euler_fields(block: &MeshBlock, slope: f64, bump: f64) -> SolutionFields {
    let mut fields = SolutionFields::new(block, 4).unwrap();
    fields.sample(
        block,
        |x, out| out.copy_from_slice(&[1.0 + slope * x[0], 0.0, 0.0, 2.0]),
        |_, out| out.fill(0.0),
    );
    fields.soln[PERTURBED * 4] += bump;
    fields.sol[PERTURBED * 4] += bump;
    fields.fill_cfl(0.5);
    fields
}

fn center_gradient(block: &MeshBlock, fields: &mut SolutionFields, alpha: f64) -> [f64; 2] {
    let params = CeseParameters::default().with_alpha(alpha);
    compute_dsoln_range(block, fields, &params, KernelFlavor::Generic, 0..block.n_cells).unwrap();
    let g = fields.dsoln_eq(CENTER, 0);
    [g[0], g[1]]
}

#[test]
fn test_star_mesh_layout() {
    let block = star_mesh();
    assert_eq!(block.n_cells, 4);
    assert_eq!(block.n_ghost_cells, 6);
    let center = block.cell_centroids[CENTER];
    assert_relative_eq!(center[0], 0.5, epsilon = 1e-14);
    assert_relative_eq!(center[1], 3.0_f64.sqrt() / 6.0, epsilon = 1e-14);
    for &ifc in block.cell_faces[CENTER].as_slice() {
        assert!(block.face_cells[ifc].iter().all(|&c| c < block.n_cells));
    }
    let nbr = block.cell_centroids[PERTURBED];
    assert_relative_eq!(nbr[0], 1.0, epsilon = 1e-14);
    assert_relative_eq!(nbr[1], 1.0 / 3.0_f64.sqrt(), epsilon = 1e-14);
}

#[test]
fn test_uniform_state_has_zero_gradient() {
    let block = star_mesh();
    let mut fields = SolutionFields::new(&block, 4).unwrap();
    fields.fill_uniform(&[1.0, 0.0, 0.0, 2.0]);
    fields.fill_cfl(0.5);
    let params = CeseParameters::default().with_alpha(2.0);

    for flavor in [KernelFlavor::Generic, KernelFlavor::Simplex] {
        compute_dsoln_range(&block, &mut fields, &params, flavor, CENTER..CENTER + 1).unwrap();
        assert!(fields.dsoln(CENTER).iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_perturbed_neighbor_pulls_gradient() {
    let block = star_mesh();

    let mut smooth = euler_fields(&block, 0.05, 0.0);
    let base = center_gradient(&block, &mut smooth, 2.0);

    let mut bumped = euler_fields(&block, 0.05, 0.1);
    let g2 = center_gradient(&block, &mut bumped, 2.0);
    assert!(g2.iter().all(|v| v.is_finite()));
    assert!(g2[0].hypot(g2[1]) > 0.0);
    assert_relative_eq!(g2[0], 0.06771653543307057, epsilon = 1e-9);
    assert_relative_eq!(g2[1], 0.0018184260446917114, epsilon = 1e-9);

    // The change points toward the perturbed neighbor
    let c = block.cell_centroids[CENTER];
    let n = block.cell_centroids[PERTURBED];
    let shift = (g2[0] - base[0]) * (n[0] - c[0]) + (g2[1] - base[1]) * (n[1] - c[1]);
    assert!(shift > 0.0, "shift {}", shift);

    // A sharper limiter discounts the outlier further
    let g8 = center_gradient(&block, &mut bumped, 8.0);
    assert!(g8.iter().all(|v| v.is_finite()));
    assert!(g8[0].hypot(g8[1]) < g2[0].hypot(g2[1]));
    assert_relative_eq!(g8[0].hypot(g8[1]), 0.06666701092138765, epsilon = 1e-9);
}

#[test]
fn test_flavors_and_backends_agree_on_star() {
    let block = star_mesh();
    let base = euler_fields(&block, 0.05, 0.1);
    let params = CeseParameters::default().with_alpha(2.0);

    let mut generic = base.clone();
    compute_dsoln_range(&block, &mut generic, &params, KernelFlavor::Generic, 0..4).unwrap();
    let mut simplex = base.clone();
    compute_dsoln_range(&block, &mut simplex, &params, KernelFlavor::Simplex, 0..4).unwrap();
    let mut many = base.clone();
    compute_dsoln_many_core(
        &block,
        &mut many,
        &params,
        KernelFlavor::Simplex,
        LaunchConfig::new(3),
    )
    .unwrap();

    for ((a, b), c) in generic.dsoln.iter().zip(&simplex.dsoln).zip(&many.dsoln) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
        assert_eq!(b, c);
    }
}
