//! Unstructured mesh block with ghost cells.
//!
//! The block stores:
//! - Node coordinates
//! - Face connectivity (`[belong, neighbor]` cells) and face metrics
//! - Cell shapes, cell-to-face lists and cell centroids
//! - CE centroids: one solution point plus one centroid per (cell, face)
//!
//! Interior cells occupy `[0, n_cells)`. Every boundary face owns exactly one
//! ghost cell, numbered from `n_cells` upward, so a face always references
//! two cells and the neighbor across face `f` of cell `c` is
//! `face_cells[f][0] + face_cells[f][1] - c`.

use super::boundary_tags::BoundaryTag;
use super::cell_type::{CellType, MAX_CELL_FACES};
use super::geometry::Vec3;
use crate::types::{CellIndex, FaceIndex};

/// Ordered list of the faces incident to one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellFaces {
    count: usize,
    faces: [usize; MAX_CELL_FACES],
}

impl CellFaces {
    /// Build from a slice of at most [`MAX_CELL_FACES`] face indices.
    pub fn from_slice(faces: &[usize]) -> Self {
        debug_assert!(faces.len() <= MAX_CELL_FACES);
        let mut out = [0usize; MAX_CELL_FACES];
        out[..faces.len()].copy_from_slice(faces);
        Self {
            count: faces.len(),
            faces: out,
        }
    }

    /// Number of faces.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Face indices in local order.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.faces[..self.count]
    }
}

/// CE centroids of one cell: slot 0 is the solution point, slot `1 + f`
/// belongs to local face `f`.
pub type CeCentroids = [Vec3; MAX_CELL_FACES + 1];

/// A boundary face and its tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryFace {
    /// Face index
    pub face: usize,
    /// Ghost cell across the face
    pub ghost: usize,
    /// Boundary tag
    pub tag: BoundaryTag,
}

/// Unstructured mesh block.
#[derive(Clone, Debug)]
pub struct MeshBlock {
    /// Spatial dimension (2 or 3)
    pub ndim: usize,

    /// Node coordinates (z = 0 in 2-D)
    pub nodes: Vec<Vec3>,

    /// Face node lists. Boundary faces are oriented outward from the interior.
    pub face_nodes: Vec<Vec<usize>>,

    /// Face cells: `[belong, neighbor]`. Neighbor is a ghost cell on the boundary.
    pub face_cells: Vec<[usize; 2]>,

    /// Unit face normals, pointing from `belong` to `neighbor`
    pub face_normals: Vec<Vec3>,

    /// Face centroids
    pub face_centroids: Vec<Vec3>,

    /// Face areas (edge lengths in 2-D)
    pub face_areas: Vec<f64>,

    /// Interior cell shapes
    pub cell_types: Vec<CellType>,

    /// Interior cell node lists
    pub cell_nodes: Vec<Vec<usize>>,

    /// Interior cell face lists, in the shape's local face order
    pub cell_faces: Vec<CellFaces>,

    /// Interior cell volumes (areas in 2-D)
    pub cell_volumes: Vec<f64>,

    /// Cell centroids, interior then ghost
    pub cell_centroids: Vec<Vec3>,

    /// CE centroids, interior then ghost
    pub ce_centroids: Vec<CeCentroids>,

    /// Boundary faces in ghost order
    pub boundary_faces: Vec<BoundaryFace>,

    /// Number of interior cells
    pub n_cells: usize,

    /// Number of ghost cells (equals the number of boundary faces)
    pub n_ghost_cells: usize,
}

impl MeshBlock {
    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_cells.len()
    }

    /// Number of interior plus ghost cells.
    #[inline]
    pub fn n_total_cells(&self) -> usize {
        self.n_cells + self.n_ghost_cells
    }

    /// Whether `cell` is a ghost cell.
    #[inline]
    pub fn is_ghost(&self, cell: CellIndex) -> bool {
        cell.get() >= self.n_cells
    }

    /// Cell on the other side of `face` as seen from `cell`.
    #[inline]
    pub fn neighbor(&self, cell: CellIndex, face: FaceIndex) -> CellIndex {
        CellIndex::new(self.neighbor_raw(cell.get(), face.get()))
    }

    #[inline(always)]
    pub(crate) fn neighbor_raw(&self, cell: usize, face: usize) -> usize {
        let [a, b] = self.face_cells[face];
        a + b - cell
    }

    /// Faces of an interior cell in local order.
    #[inline]
    pub fn faces_of(&self, cell: CellIndex) -> &[usize] {
        self.cell_faces[cell.get()].as_slice()
    }

    /// Whether every interior cell is a triangle (2-D) or tetrahedron (3-D).
    pub fn is_simplicial(&self) -> bool {
        self.cell_types.iter().all(|t| t.is_simplex())
    }

    /// Count interior cells of each shape present in the block.
    pub fn cell_type_histogram(&self) -> Vec<(CellType, usize)> {
        CellType::ALL
            .iter()
            .map(|&t| (t, self.cell_types.iter().filter(|&&c| c == t).count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// Boundary faces carrying `tag`.
    pub fn boundary_faces_tagged(&self, tag: BoundaryTag) -> impl Iterator<Item = &BoundaryFace> {
        self.boundary_faces.iter().filter(move |b| b.tag == tag)
    }

    /// Re-tag boundary faces using a classifier on the face centroid.
    ///
    /// # Example
    ///
    /// ```
    /// use cese_rs::{BoundaryTag, MeshBlockBuilder};
    ///
    /// let mut block = MeshBlockBuilder::rectangle_quads(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
    /// block.retag_boundary(|c| if c[0] > 0.999 { BoundaryTag::Open } else { BoundaryTag::Wall });
    /// assert_eq!(block.boundary_faces_tagged(BoundaryTag::Open).count(), 2);
    /// ```
    pub fn retag_boundary<F>(&mut self, classify: F)
    where
        F: Fn(Vec3) -> BoundaryTag,
    {
        for bf in &mut self.boundary_faces {
            bf.tag = classify(self.face_centroids[bf.face]);
        }
    }

    /// Smallest and largest interior cell volume.
    pub fn volume_range(&self) -> (f64, f64) {
        self.cell_volumes
            .iter()
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}
