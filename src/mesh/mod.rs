//! Mesh representation.
//!
//! Provides the unstructured mesh block consumed by the gradient kernel:
//! - Cell shapes and GGE sub-element tables
//! - Mesh block with faces, ghost cells and CE centroids
//! - Builder with structured generators for every supported shape
//! - Gmsh mesh file I/O

mod block;
mod boundary_tags;
mod builder;
mod cell_type;
pub mod geometry;
pub mod gmsh;

pub use block::{BoundaryFace, CeCentroids, CellFaces, MeshBlock};
pub use boundary_tags::BoundaryTag;
pub use builder::{MeshBlockBuilder, MeshError};
pub use cell_type::{CellType, GGE_FACES, MAX_CELL_FACES, MAX_NDIM, MAX_SUB_ELEMENTS};
pub use geometry::Vec3;
pub use gmsh::{parse_gmsh_block, read_gmsh_block, write_gmsh_block, GmshError};
