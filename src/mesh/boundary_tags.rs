//! Tags carried by boundary faces. Ghost-cell resolvers are run per tag.

/// Kind of boundary a face belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BoundaryTag {
    /// Solid wall (ghost state mirrored across the face)
    #[default]
    Wall,

    /// Open boundary (ghost state extrapolated from the interior)
    Open,

    /// Custom tag for user-defined resolvers
    Custom(u32),
}

impl BoundaryTag {
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryTag::Wall)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, BoundaryTag::Open)
    }

    /// Map a Gmsh physical group number to a tag.
    ///
    /// 1 is a wall, 2 is open; anything else is kept as a custom tag.
    pub fn from_physical(tag: u32) -> Self {
        match tag {
            1 => BoundaryTag::Wall,
            2 => BoundaryTag::Open,
            _ => BoundaryTag::Custom(tag),
        }
    }

    /// Gmsh physical group number for this tag.
    pub fn to_physical(self) -> u32 {
        match self {
            BoundaryTag::Wall => 1,
            BoundaryTag::Open => 2,
            BoundaryTag::Custom(t) => t,
        }
    }
}
