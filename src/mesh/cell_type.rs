//! Cell shapes and the grouped geometry element (GGE) tables.
//!
//! The GGE of a cell is the dual polygon/polyhedron spanned by one shifted
//! point per face. It is partitioned into sub-elements, each formed by NDIM
//! mutually adjacent faces of the cell plus the GGE interior. The tables
//! below list those face triples (1-based local face numbers, `-1` unused in
//! 2-D) grouped contiguously per cell shape.
//!
//! Local face numbering per shape (node lists in [`CellType::face_nodes`]):
//!
//! | shape | faces |
//! |---|---|
//! | quadrilateral | edges 0-1, 1-2, 2-3, 3-0 |
//! | triangle | edges 0-1, 1-2, 2-0 |
//! | hexahedron | bottom, +side 1-2, top, side 3-0, side 0-1, side 2-3 |
//! | tetrahedron | the four triangles |
//! | prism | bottom, top, three quadrilateral sides |
//! | pyramid | four triangular sides in ring order, base |

use std::ops::Range;

/// Largest number of faces of any supported cell.
pub const MAX_CELL_FACES: usize = 6;

/// Largest number of GGE sub-elements of any supported cell.
pub const MAX_SUB_ELEMENTS: usize = 8;

/// Largest spatial dimension.
pub const MAX_NDIM: usize = 3;

/// GGE sub-element face triples for every supported shape.
pub const GGE_FACES: [[i8; 3]; 31] = [
    // quadrilaterals
    [1, 2, -1],
    [2, 3, -1],
    [3, 4, -1],
    [4, 1, -1],
    // triangles
    [1, 2, -1],
    [2, 3, -1],
    [3, 1, -1],
    // hexahedra
    [2, 3, 5],
    [6, 3, 2],
    [4, 3, 6],
    [5, 3, 4],
    [5, 1, 2],
    [2, 1, 6],
    [6, 1, 4],
    [4, 1, 5],
    // tetrahedra
    [3, 1, 2],
    [2, 1, 4],
    [4, 1, 3],
    [2, 4, 3],
    // prisms
    [5, 2, 4],
    [3, 2, 5],
    [4, 2, 3],
    [4, 1, 5],
    [5, 1, 3],
    [3, 1, 4],
    // pyramids
    [1, 5, 2],
    [2, 5, 3],
    [3, 5, 4],
    [4, 5, 1],
    [1, 3, 4],
    [3, 1, 2],
];

/// Supported cell shapes.
///
/// Discriminants follow the usual unstructured-mesh type tags (0 and 1 are
/// reserved for points and lines, which never carry a GGE).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellType {
    Quadrilateral = 2,
    Triangle = 3,
    Hexahedron = 4,
    Tetrahedron = 5,
    Prism = 6,
    Pyramid = 7,
}

impl CellType {
    /// All supported shapes.
    pub const ALL: [CellType; 6] = [
        CellType::Quadrilateral,
        CellType::Triangle,
        CellType::Hexahedron,
        CellType::Tetrahedron,
        CellType::Prism,
        CellType::Pyramid,
    ];

    /// Look up a shape by its type tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    /// Numeric type tag.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Spatial dimension of the shape.
    #[inline]
    pub const fn ndim(self) -> usize {
        match self {
            CellType::Quadrilateral | CellType::Triangle => 2,
            _ => 3,
        }
    }

    /// Number of nodes.
    pub const fn n_nodes(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Number of faces.
    pub const fn n_faces(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Prism | CellType::Pyramid => 5,
            CellType::Hexahedron => 6,
        }
    }

    /// Whether the shape is a simplex (triangle or tetrahedron).
    #[inline]
    pub const fn is_simplex(self) -> bool {
        matches!(self, CellType::Triangle | CellType::Tetrahedron)
    }

    /// Index range of this shape's sub-elements in [`GGE_FACES`].
    pub const fn gge_range(self) -> Range<usize> {
        match self {
            CellType::Quadrilateral => 0..4,
            CellType::Triangle => 4..7,
            CellType::Hexahedron => 7..15,
            CellType::Tetrahedron => 15..19,
            CellType::Prism => 19..25,
            CellType::Pyramid => 25..31,
        }
    }

    /// Sub-element face triples of this shape.
    #[inline]
    pub fn gge_sub_elements(self) -> &'static [[i8; 3]] {
        &GGE_FACES[self.gge_range()]
    }

    /// Local node lists of each face, in local face order.
    pub fn face_nodes(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Quadrilateral => &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]],
            CellType::Triangle => &[&[0, 1], &[1, 2], &[2, 0]],
            CellType::Hexahedron => &[
                &[0, 3, 2, 1],
                &[1, 2, 6, 5],
                &[4, 5, 6, 7],
                &[0, 4, 7, 3],
                &[0, 1, 5, 4],
                &[2, 3, 7, 6],
            ],
            CellType::Tetrahedron => &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]],
            CellType::Prism => &[
                &[0, 2, 1],
                &[3, 4, 5],
                &[0, 1, 4, 3],
                &[0, 3, 5, 2],
                &[1, 2, 5, 4],
            ],
            CellType::Pyramid => &[
                &[0, 1, 4],
                &[1, 2, 4],
                &[2, 3, 4],
                &[3, 0, 4],
                &[0, 3, 2, 1],
            ],
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CellType::Quadrilateral => "quadrilateral",
            CellType::Triangle => "triangle",
            CellType::Hexahedron => "hexahedron",
            CellType::Tetrahedron => "tetrahedron",
            CellType::Prism => "prism",
            CellType::Pyramid => "pyramid",
        };
        f.write_str(name)
    }
}
