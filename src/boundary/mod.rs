//! Ghost-cell boundary resolvers.
//!
//! The gradient kernel reads `soln`, `sol`, `solt` and `dsol` of ghost cells
//! like any other neighbor, so ghost values must be populated before it runs.
//! A resolver computes the ghost state of one boundary face from the interior
//! cell on the other side.
//!
//! # Available Resolvers
//!
//! | Resolver | Ghost `soln` | Ghost `dsoln` |
//! |----------|--------------|---------------|
//! | [`NonSlipWall`] | momentum negated, ρ and E copied | mirrored in the face frame |
//! | [`Extrapolation`] | copied | copied |
//!
//! Resolvers are applied per [`BoundaryTag`] with [`resolve_ghost_soln`] and
//! [`resolve_ghost_dsoln`].

mod extrapolation;
mod nonslip_wall;

pub use extrapolation::Extrapolation;
pub use nonslip_wall::NonSlipWall;

use thiserror::Error;

use crate::mesh::geometry::{cross, dot, norm, scale, sub, Vec3, ZERO};
use crate::mesh::{BoundaryTag, MeshBlock, MAX_NDIM};
use crate::solver::SolutionFields;
use crate::types::FaceIndex;

/// Errors from applying a resolver.
#[derive(Error, Debug, PartialEq)]
pub enum BoundaryError {
    /// The resolver cannot handle this equation layout.
    #[error("{resolver} resolver needs {expected} equations in {ndim}-D, got {neq}")]
    EquationLayout {
        resolver: &'static str,
        neq: usize,
        ndim: usize,
        expected: usize,
    },

    /// The face has no ghost cell.
    #[error("Face {0} is not a boundary face")]
    NotBoundaryFace(usize),

    /// Fields were allocated for another mesh.
    #[error("Fields do not match the mesh block: {0}")]
    FieldShape(String),
}

/// Orthonormal frame attached to a boundary face.
///
/// Row 0 is the outward unit normal. In 2-D row 1 is `(n_y, -n_x)`. In 3-D
/// row 1 points from the face centroid to the face's first node and row 2
/// completes the right-handed triad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceFrame {
    pub ndim: usize,
    pub rows: [Vec3; MAX_NDIM],
}

impl FaceFrame {
    /// Frame of `face` in `block`.
    pub fn new(block: &MeshBlock, face: usize) -> Self {
        let normal = block.face_normals[face];
        let mut rows = [ZERO; MAX_NDIM];
        rows[0] = normal;
        if block.ndim == 3 {
            let first = block.nodes[block.face_nodes[face][0]];
            let t = sub(first, block.face_centroids[face]);
            rows[1] = scale(t, 1.0 / norm(t));
            rows[2] = cross(rows[0], rows[1]);
        } else {
            rows[1] = [normal[1], -normal[0], 0.0];
        }
        Self {
            ndim: block.ndim,
            rows,
        }
    }

    /// Components of `v` in the frame.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        let mut out = ZERO;
        for (o, row) in out.iter_mut().zip(&self.rows).take(self.ndim) {
            *o = dot(*row, v);
        }
        out
    }

    /// Global vector with components `l` in the frame.
    #[inline]
    pub fn to_global(&self, l: Vec3) -> Vec3 {
        let mut out = ZERO;
        for (row, &c) in self.rows.iter().zip(&l).take(self.ndim) {
            for d in 0..3 {
                out[d] += row[d] * c;
            }
        }
        out
    }
}

/// Everything a resolver knows about one boundary face.
#[derive(Clone, Copy, Debug)]
pub struct GhostContext {
    /// Boundary face
    pub face: usize,
    /// Interior cell owning the face
    pub interior: usize,
    /// Ghost cell across the face
    pub ghost: usize,
    /// Spatial dimension
    pub ndim: usize,
    /// Number of equations
    pub neq: usize,
    /// Face frame
    pub frame: FaceFrame,
    /// Boundary tag
    pub tag: BoundaryTag,
}

/// Computes ghost-cell values from the interior cell of a boundary face.
pub trait GhostResolver: Send + Sync {
    /// Reject equation layouts the resolver does not understand.
    fn check_layout(&self, _neq: usize, _ndim: usize) -> Result<(), BoundaryError> {
        Ok(())
    }

    /// Ghost solution (`neq` values) from the interior solution.
    fn ghost_soln(&self, ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]);

    /// Ghost gradient (`neq * ndim` values, equation-major) from the interior
    /// gradient.
    fn ghost_dsoln(&self, ctx: &GhostContext, interior: &[f64], ghost: &mut [f64]);

    /// Name for logging.
    fn name(&self) -> &'static str;
}

fn check(
    block: &MeshBlock,
    fields: &SolutionFields,
    resolver: &dyn GhostResolver,
) -> Result<(), BoundaryError> {
    fields
        .check_shape(block)
        .map_err(|e| BoundaryError::FieldShape(e.to_string()))?;
    resolver.check_layout(fields.neq(), fields.ndim())
}

fn context(block: &MeshBlock, fields: &SolutionFields, face: usize) -> Result<GhostContext, BoundaryError> {
    let [interior, ghost] = block.face_cells[face];
    if ghost < block.n_cells {
        return Err(BoundaryError::NotBoundaryFace(face));
    }
    let tag = block
        .boundary_faces
        .get(ghost - block.n_cells)
        .map(|b| b.tag)
        .unwrap_or_default();
    Ok(GhostContext {
        face,
        interior,
        ghost,
        ndim: block.ndim,
        neq: fields.neq(),
        frame: FaceFrame::new(block, face),
        tag,
    })
}

/// Split `data` into the interior and ghost slots of `ctx`.
///
/// Ghost cells are numbered after every interior cell, so the ghost slot
/// always lies in the upper half of the split.
fn slots<'a>(data: &'a mut [f64], ctx: &GhostContext, stride: usize) -> (&'a [f64], &'a mut [f64]) {
    let (lower, upper) = data.split_at_mut(ctx.ghost * stride);
    (
        &lower[ctx.interior * stride..(ctx.interior + 1) * stride],
        &mut upper[..stride],
    )
}

fn apply_soln(fields: &mut SolutionFields, ctx: &GhostContext, resolver: &dyn GhostResolver) {
    let neq = fields.neq();
    let (interior, ghost) = slots(&mut fields.soln, ctx, neq);
    resolver.ghost_soln(ctx, interior, ghost);
    // The kernel also reads sol and solt of ghost cells
    let (interior, ghost) = slots(&mut fields.sol, ctx, neq);
    resolver.ghost_soln(ctx, interior, ghost);
    let (interior, ghost) = slots(&mut fields.solt, ctx, neq);
    resolver.ghost_soln(ctx, interior, ghost);
}

fn apply_dsoln(fields: &mut SolutionFields, ctx: &GhostContext, resolver: &dyn GhostResolver) {
    let stride = fields.gradient_stride();
    let (interior, ghost) = slots(&mut fields.dsoln, ctx, stride);
    resolver.ghost_dsoln(ctx, interior, ghost);
    let (interior, ghost) = slots(&mut fields.dsol, ctx, stride);
    resolver.ghost_dsoln(ctx, interior, ghost);
}

/// Populate ghost `sol`, `soln` and `solt` of every boundary face tagged `tag`.
pub fn resolve_ghost_soln<R: GhostResolver>(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    tag: BoundaryTag,
    resolver: &R,
) -> Result<usize, BoundaryError> {
    check(block, fields, resolver)?;
    let mut count = 0;
    for bf in block.boundary_faces_tagged(tag) {
        let ctx = context(block, fields, bf.face)?;
        apply_soln(fields, &ctx, resolver);
        count += 1;
    }
    log::debug!("{} resolver set soln on {} {:?} faces", resolver.name(), count, tag);
    Ok(count)
}

/// Populate ghost `dsol` and `dsoln` of every boundary face tagged `tag`.
pub fn resolve_ghost_dsoln<R: GhostResolver>(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    tag: BoundaryTag,
    resolver: &R,
) -> Result<usize, BoundaryError> {
    check(block, fields, resolver)?;
    let mut count = 0;
    for bf in block.boundary_faces_tagged(tag) {
        let ctx = context(block, fields, bf.face)?;
        apply_dsoln(fields, &ctx, resolver);
        count += 1;
    }
    log::debug!("{} resolver set dsoln on {} {:?} faces", resolver.name(), count, tag);
    Ok(count)
}

/// Populate the ghost solution and gradient of a single face.
pub fn resolve_face<R: GhostResolver>(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    face: FaceIndex,
    resolver: &R,
) -> Result<(), BoundaryError> {
    check(block, fields, resolver)?;
    let ctx = context(block, fields, face.get())?;
    apply_soln(fields, &ctx, resolver);
    apply_dsoln(fields, &ctx, resolver);
    Ok(())
}
