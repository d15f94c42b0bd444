//! # cese-rs
//!
//! Slope-limited gradient reconstruction for space-time CESE schemes on
//! unstructured meshes.
//!
//! This crate provides:
//! - Mesh blocks with ghost cells and CE centroids (triangles, quadrilaterals,
//!   tetrahedra, hexahedra, prisms, pyramids), a builder and a Gmsh reader
//! - Kernel parameters with validation
//! - Generic and simplex per-cell gradient kernels with the W-3/4 limiter
//! - Serial, multi-core (rayon) and many-core drivers
//! - Ghost-cell resolvers for walls and open boundaries

pub mod boundary;
pub mod mesh;
pub mod params;
pub mod solver;
pub mod types;

// Mesh
pub use mesh::{
    parse_gmsh_block, read_gmsh_block, write_gmsh_block, BoundaryTag, CellType, GmshError,
    MeshBlock, MeshBlockBuilder, MeshError,
};

// Parameters
pub use params::{CeseParameters, ParameterError};

// Solver
pub use solver::{
    compute_dsoln_many_core, compute_dsoln_range, CellGradient, GradientContext, GradientCost,
    GradientError, KernelFlavor, LaunchConfig, SolutionFields, MAX_EQUATIONS,
};
#[cfg(feature = "parallel")]
pub use solver::compute_dsoln_parallel;

// Boundary
pub use boundary::{
    resolve_face, resolve_ghost_dsoln, resolve_ghost_soln, BoundaryError, Extrapolation,
    GhostResolver, NonSlipWall,
};

// Types
pub use types::{CellIndex, FaceIndex};
