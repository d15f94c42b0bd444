//! Builder for unstructured mesh blocks.
//!
//! Derives faces, ghost cells and every metric the gradient kernel reads from
//! node coordinates plus cell connectivity.
//!
//! # Example
//!
//! ```
//! use cese_rs::mesh::{CellType, MeshBlockBuilder};
//!
//! // Two triangles sharing the diagonal of the unit square
//! let mut builder = MeshBlockBuilder::new(2).with_nodes(vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [1.0, 1.0, 0.0],
//!     [0.0, 1.0, 0.0],
//! ]);
//! builder.add_cell(CellType::Triangle, &[0, 1, 2]);
//! builder.add_cell(CellType::Triangle, &[0, 2, 3]);
//! let block = builder.build().unwrap();
//!
//! assert_eq!(block.n_cells, 2);
//! assert_eq!(block.n_faces(), 5);
//! assert_eq!(block.n_ghost_cells, 4);
//!
//! // Structured generators
//! let block = MeshBlockBuilder::rectangle_quads(0.0, 2.0, 0.0, 1.0, 4, 2).unwrap();
//! assert_eq!(block.n_cells, 8);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use super::block::{BoundaryFace, CeCentroids, CellFaces, MeshBlock};
use super::boundary_tags::BoundaryTag;
use super::cell_type::{CellType, MAX_CELL_FACES};
use super::geometry::{
    add, dot, mean, norm, polygon_metrics, scale, sub, CentroidAccumulator, Vec3, ZERO,
};

/// Error type for mesh construction.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Only 2-D and 3-D meshes are supported.
    #[error("Unsupported mesh dimension: {0}")]
    UnsupportedDimension(usize),

    /// No cells were added.
    #[error("Mesh has no cells")]
    Empty,

    /// Cell shape does not match the mesh dimension.
    #[error("Cell {cell}: {shape} does not belong in a {ndim}-D mesh")]
    ShapeDimension {
        cell: usize,
        shape: CellType,
        ndim: usize,
    },

    /// Wrong number of nodes for the shape.
    #[error("Cell {cell}: {shape} needs {expected} nodes, got {got}")]
    NodeCount {
        cell: usize,
        shape: CellType,
        expected: usize,
        got: usize,
    },

    /// Node index beyond the node list.
    #[error("Cell {cell}: node {node} out of range ({n_nodes} nodes)")]
    NodeOutOfRange {
        cell: usize,
        node: usize,
        n_nodes: usize,
    },

    /// A face is shared by more than two cells.
    #[error("Face with nodes {nodes:?} is shared by more than two cells")]
    NonManifoldFace { nodes: Vec<usize> },

    /// Cell with zero or negative measure.
    #[error("Cell {cell} is degenerate (measure {measure:e})")]
    DegenerateCell { cell: usize, measure: f64 },

    /// Face with zero area.
    #[error("Face {face} is degenerate")]
    DegenerateFace { face: usize },
}

/// Builder for [`MeshBlock`].
#[derive(Clone, Debug)]
pub struct MeshBlockBuilder {
    ndim: usize,
    nodes: Vec<Vec3>,
    cells: Vec<(CellType, Vec<usize>)>,
    boundary_tags: HashMap<Vec<usize>, BoundaryTag>,
    default_tag: BoundaryTag,
}

/// Face under construction.
struct RawFace {
    nodes: Vec<usize>,
    belong: usize,
    neighbor: Option<usize>,
}

impl MeshBlockBuilder {
    /// Create an empty builder for a mesh of dimension `ndim`.
    pub fn new(ndim: usize) -> Self {
        Self {
            ndim,
            nodes: Vec::new(),
            cells: Vec::new(),
            boundary_tags: HashMap::new(),
            default_tag: BoundaryTag::Wall,
        }
    }

    /// Set node coordinates.
    pub fn with_nodes(mut self, nodes: Vec<Vec3>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Tag given to boundary faces that were never tagged explicitly.
    pub fn with_default_tag(mut self, tag: BoundaryTag) -> Self {
        self.default_tag = tag;
        self
    }

    /// Append a node and return its index.
    pub fn add_node(&mut self, point: Vec3) -> usize {
        self.nodes.push(point);
        self.nodes.len() - 1
    }

    /// Append a cell. Connectivity is checked in [`build`](Self::build).
    pub fn add_cell(&mut self, shape: CellType, nodes: &[usize]) -> &mut Self {
        self.cells.push((shape, nodes.to_vec()));
        self
    }

    /// Tag the boundary face with the given nodes (any order).
    pub fn tag_boundary(&mut self, nodes: &[usize], tag: BoundaryTag) -> &mut Self {
        self.boundary_tags.insert(face_key(nodes), tag);
        self
    }

    /// Number of cells added so far.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Build the mesh block.
    pub fn build(self) -> Result<MeshBlock, MeshError> {
        let ndim = self.ndim;
        if ndim != 2 && ndim != 3 {
            return Err(MeshError::UnsupportedDimension(ndim));
        }
        if self.cells.is_empty() {
            return Err(MeshError::Empty);
        }
        self.validate_cells()?;

        let n_cells = self.cells.len();
        let nodes = &self.nodes;

        // Cell centroids and volumes
        let mut cell_centroids = Vec::with_capacity(n_cells);
        let mut cell_volumes = Vec::with_capacity(n_cells);
        for (icl, (shape, cn)) in self.cells.iter().enumerate() {
            let (volume, centroid) = cell_metrics(nodes, *shape, cn);
            if !(volume > 0.0) {
                return Err(MeshError::DegenerateCell {
                    cell: icl,
                    measure: volume,
                });
            }
            cell_centroids.push(centroid);
            cell_volumes.push(volume);
        }

        // Faces in order of first appearance
        let mut raw_faces: Vec<RawFace> = Vec::new();
        let mut lookup: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut cell_faces = Vec::with_capacity(n_cells);
        for (icl, (shape, cn)) in self.cells.iter().enumerate() {
            let mut local = [0usize; MAX_CELL_FACES];
            for (ifl, template) in shape.face_nodes().iter().enumerate() {
                let fnodes: Vec<usize> = template.iter().map(|&i| cn[i]).collect();
                let key = face_key(&fnodes);
                let ifc = match lookup.get(&key) {
                    Some(&ifc) => {
                        let face = &mut raw_faces[ifc];
                        if face.neighbor.is_some() {
                            return Err(MeshError::NonManifoldFace { nodes: key });
                        }
                        face.neighbor = Some(icl);
                        ifc
                    }
                    None => {
                        raw_faces.push(RawFace {
                            nodes: fnodes,
                            belong: icl,
                            neighbor: None,
                        });
                        lookup.insert(key, raw_faces.len() - 1);
                        raw_faces.len() - 1
                    }
                };
                local[ifl] = ifc;
            }
            cell_faces.push(CellFaces::from_slice(&local[..shape.n_faces()]));
        }

        // Face metrics, oriented outward from the belonging cell
        let n_faces = raw_faces.len();
        let mut face_nodes = Vec::with_capacity(n_faces);
        let mut face_normals = Vec::with_capacity(n_faces);
        let mut face_centroids = Vec::with_capacity(n_faces);
        let mut face_areas = Vec::with_capacity(n_faces);
        for (ifc, face) in raw_faces.iter().enumerate() {
            let points: Vec<Vec3> = face.nodes.iter().map(|&n| nodes[n]).collect();
            let (area, centroid, raw_normal) = face_metrics(ndim, &points);
            let length = norm(raw_normal);
            if !(area > 0.0) || !(length > 0.0) {
                return Err(MeshError::DegenerateFace { face: ifc });
            }
            let mut normal = scale(raw_normal, 1.0 / length);
            let mut fnodes = face.nodes.clone();
            if dot(normal, sub(centroid, cell_centroids[face.belong])) < 0.0 {
                normal = scale(normal, -1.0);
                fnodes.reverse();
            }
            face_nodes.push(fnodes);
            face_normals.push(normal);
            face_centroids.push(centroid);
            face_areas.push(area);
        }

        // Ghost cells, one per boundary face, mirrored across the face plane
        let mut face_cells = Vec::with_capacity(n_faces);
        let mut boundary_faces = Vec::new();
        for (ifc, face) in raw_faces.iter().enumerate() {
            let neighbor = match face.neighbor {
                Some(jcl) => jcl,
                None => {
                    let ghost = n_cells + boundary_faces.len();
                    let inner = cell_centroids[face.belong];
                    let n = face_normals[ifc];
                    let dist = dot(sub(inner, face_centroids[ifc]), n);
                    cell_centroids.push(sub(inner, scale(n, 2.0 * dist)));
                    let tag = self
                        .boundary_tags
                        .get(&face_key(&face.nodes))
                        .copied()
                        .unwrap_or(self.default_tag);
                    boundary_faces.push(BoundaryFace {
                        face: ifc,
                        ghost,
                        tag,
                    });
                    ghost
                }
            };
            face_cells.push([face.belong, neighbor]);
        }
        let n_ghost_cells = boundary_faces.len();

        // CE centroid of every face: the two simplices (2-D) or fanned
        // pyramids (3-D) joining the face to the solution points on both sides
        let face_ce: Vec<Vec3> = (0..n_faces)
            .map(|ifc| {
                let [a, b] = face_cells[ifc];
                let points: Vec<Vec3> = face_nodes[ifc].iter().map(|&n| nodes[n]).collect();
                ce_centroid(
                    ndim,
                    &points,
                    cell_centroids[a],
                    cell_centroids[b],
                    face_centroids[ifc],
                )
            })
            .collect();

        let mut ce_centroids: Vec<CeCentroids> = Vec::with_capacity(n_cells + n_ghost_cells);
        for (icl, faces) in cell_faces.iter().enumerate() {
            let mut ce = [cell_centroids[icl]; MAX_CELL_FACES + 1];
            for (ifl, &ifc) in faces.as_slice().iter().enumerate() {
                ce[ifl + 1] = face_ce[ifc];
            }
            ce_centroids.push(ce);
        }
        for bf in &boundary_faces {
            let mut ce = [cell_centroids[bf.ghost]; MAX_CELL_FACES + 1];
            ce[1] = face_ce[bf.face];
            ce_centroids.push(ce);
        }

        let (cell_types, cell_nodes): (Vec<_>, Vec<_>) = self.cells.into_iter().unzip();

        let block = MeshBlock {
            ndim,
            nodes: self.nodes,
            face_nodes,
            face_cells,
            face_normals,
            face_centroids,
            face_areas,
            cell_types,
            cell_nodes,
            cell_faces,
            cell_volumes,
            cell_centroids,
            ce_centroids,
            boundary_faces,
            n_cells,
            n_ghost_cells,
        };

        let (vmin, vmax) = block.volume_range();
        log::debug!(
            "built {}-D mesh block: {} cells {:?}, {} faces, {} ghost cells, volumes [{:e}, {:e}]",
            ndim,
            n_cells,
            block.cell_type_histogram(),
            n_faces,
            n_ghost_cells,
            vmin,
            vmax
        );
        Ok(block)
    }

    fn validate_cells(&self) -> Result<(), MeshError> {
        let n_nodes = self.nodes.len();
        for (icl, (shape, cn)) in self.cells.iter().enumerate() {
            if shape.ndim() != self.ndim {
                return Err(MeshError::ShapeDimension {
                    cell: icl,
                    shape: *shape,
                    ndim: self.ndim,
                });
            }
            if cn.len() != shape.n_nodes() {
                return Err(MeshError::NodeCount {
                    cell: icl,
                    shape: *shape,
                    expected: shape.n_nodes(),
                    got: cn.len(),
                });
            }
            if let Some(&node) = cn.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshError::NodeOutOfRange {
                    cell: icl,
                    node,
                    n_nodes,
                });
            }
        }
        Ok(())
    }

    /// Rectangle of `nx × ny` squares, each split into two triangles.
    pub fn rectangle_triangles(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::rectangle_nodes(x0, x1, y0, y1, nx, ny);
        for j in 0..ny {
            for i in 0..nx {
                let [a, b, c, d] = grid_quad(nx, i, j);
                builder.add_cell(CellType::Triangle, &[a, b, c]);
                builder.add_cell(CellType::Triangle, &[a, c, d]);
            }
        }
        builder.build()
    }

    /// Rectangle of `nx × ny` quadrilaterals.
    pub fn rectangle_quads(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::rectangle_nodes(x0, x1, y0, y1, nx, ny);
        for j in 0..ny {
            for i in 0..nx {
                builder.add_cell(CellType::Quadrilateral, &grid_quad(nx, i, j));
            }
        }
        builder.build()
    }

    /// Rectangle mixing quadrilaterals and triangle pairs in a checkerboard.
    pub fn rectangle_mixed(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::rectangle_nodes(x0, x1, y0, y1, nx, ny);
        for j in 0..ny {
            for i in 0..nx {
                let [a, b, c, d] = grid_quad(nx, i, j);
                if (i + j) % 2 == 0 {
                    builder.add_cell(CellType::Quadrilateral, &[a, b, c, d]);
                } else {
                    builder.add_cell(CellType::Triangle, &[a, b, d]);
                    builder.add_cell(CellType::Triangle, &[b, c, d]);
                }
            }
        }
        builder.build()
    }

    /// Box of `nx × ny × nz` cubes, each split into six tetrahedra sharing
    /// the main diagonal.
    pub fn box_tetrahedra(
        lower: Vec3,
        upper: Vec3,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::box_nodes(lower, upper, nx, ny, nz);
        // Paths from corner 0 to corner 7 along the cube edges
        const PATHS: [[usize; 4]; 6] = [
            [0, 1, 3, 7],
            [0, 1, 5, 7],
            [0, 2, 3, 7],
            [0, 2, 6, 7],
            [0, 4, 5, 7],
            [0, 4, 6, 7],
        ];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let corner = grid_cube_corners(nx, ny, i, j, k);
                    for path in PATHS {
                        let tet: Vec<usize> = path.iter().map(|&c| corner[c]).collect();
                        builder.add_cell(CellType::Tetrahedron, &tet);
                    }
                }
            }
        }
        builder.build()
    }

    /// Box of `nx × ny × nz` hexahedra.
    pub fn box_hexahedra(
        lower: Vec3,
        upper: Vec3,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::box_nodes(lower, upper, nx, ny, nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = grid_cube_corners(nx, ny, i, j, k);
                    builder.add_cell(
                        CellType::Hexahedron,
                        &[c[0], c[1], c[3], c[2], c[4], c[5], c[7], c[6]],
                    );
                }
            }
        }
        builder.build()
    }

    /// Box of `nx × ny × nz` cubes, each split into two triangular prisms.
    pub fn box_prisms(
        lower: Vec3,
        upper: Vec3,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::box_nodes(lower, upper, nx, ny, nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = grid_cube_corners(nx, ny, i, j, k);
                    builder.add_cell(CellType::Prism, &[c[0], c[1], c[3], c[4], c[5], c[7]]);
                    builder.add_cell(CellType::Prism, &[c[0], c[3], c[2], c[4], c[7], c[6]]);
                }
            }
        }
        builder.build()
    }

    /// Box of `nx × ny × nz` cubes, each split into six pyramids meeting at
    /// the cube center.
    pub fn box_pyramids(
        lower: Vec3,
        upper: Vec3,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<MeshBlock, MeshError> {
        let mut builder = Self::box_nodes(lower, upper, nx, ny, nz);
        // Cube faces as rings of corners
        const SIDES: [[usize; 4]; 6] = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = grid_cube_corners(nx, ny, i, j, k);
                    let center = mean(c.iter().map(|&n| builder.nodes[n]));
                    let apex = builder.add_node(center);
                    for side in SIDES {
                        builder.add_cell(
                            CellType::Pyramid,
                            &[c[side[0]], c[side[1]], c[side[2]], c[side[3]], apex],
                        );
                    }
                }
            }
        }
        builder.build()
    }

    fn rectangle_nodes(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push([x0 + i as f64 * dx, y0 + j as f64 * dy, 0.0]);
            }
        }
        Self::new(2).with_nodes(nodes)
    }

    fn box_nodes(lower: Vec3, upper: Vec3, nx: usize, ny: usize, nz: usize) -> Self {
        let d = [
            (upper[0] - lower[0]) / nx as f64,
            (upper[1] - lower[1]) / ny as f64,
            (upper[2] - lower[2]) / nz as f64,
        ];
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    nodes.push([
                        lower[0] + i as f64 * d[0],
                        lower[1] + j as f64 * d[1],
                        lower[2] + k as f64 * d[2],
                    ]);
                }
            }
        }
        Self::new(3).with_nodes(nodes)
    }
}

/// Sorted node list identifying a face regardless of orientation.
fn face_key(nodes: &[usize]) -> Vec<usize> {
    let mut key = nodes.to_vec();
    key.sort_unstable();
    key
}

/// Counter-clockwise corners of grid square (i, j).
fn grid_quad(nx: usize, i: usize, j: usize) -> [usize; 4] {
    let row = nx + 1;
    let a = j * row + i;
    [a, a + 1, a + 1 + row, a + row]
}

/// Corners of grid cube (i, j, k); bit 0 of the corner number is x, bit 1 is
/// y, bit 2 is z.
fn grid_cube_corners(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> [usize; 8] {
    let row = nx + 1;
    let layer = row * (ny + 1);
    let mut out = [0usize; 8];
    for (c, slot) in out.iter_mut().enumerate() {
        let (di, dj, dk) = (c & 1, (c >> 1) & 1, (c >> 2) & 1);
        *slot = (k + dk) * layer + (j + dj) * row + (i + di);
    }
    out
}

/// Measure and centroid of a cell.
fn cell_metrics(nodes: &[Vec3], shape: CellType, cn: &[usize]) -> (f64, Vec3) {
    let points: Vec<Vec3> = cn.iter().map(|&n| nodes[n]).collect();
    if shape.ndim() == 2 {
        let (area, centroid, _) = polygon_metrics(&points);
        return (area, centroid);
    }
    let center = mean(points.iter().copied());
    let mut acc = CentroidAccumulator::new();
    for template in shape.face_nodes() {
        let face: Vec<Vec3> = template.iter().map(|&i| points[i]).collect();
        let fmid = mean(face.iter().copied());
        for (i, &a) in face.iter().enumerate() {
            let b = face[(i + 1) % face.len()];
            acc.push_tetrahedron(center, fmid, a, b);
        }
    }
    (acc.measure(), acc.centroid().unwrap_or(center))
}

/// Area, centroid and raw (unnormalized) normal of a face.
fn face_metrics(ndim: usize, points: &[Vec3]) -> (f64, Vec3, Vec3) {
    if ndim == 2 {
        let d = sub(points[1], points[0]);
        let centroid = scale(add(points[0], points[1]), 0.5);
        (norm(d), centroid, [d[1], -d[0], 0.0])
    } else {
        polygon_metrics(points)
    }
}

/// Centroid of the conservation element joining a face to two solution points.
fn ce_centroid(ndim: usize, points: &[Vec3], own: Vec3, other: Vec3, fcnd: Vec3) -> Vec3 {
    let mut acc = CentroidAccumulator::new();
    if ndim == 2 {
        acc.push_triangle(own, points[0], points[1]);
        acc.push_triangle(other, points[0], points[1]);
    } else {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            acc.push_tetrahedron(own, fcnd, a, b);
            acc.push_tetrahedron(other, fcnd, a, b);
        }
    }
    acc.centroid().unwrap_or(if ndim == 2 { ZERO } else { fcnd })
}
