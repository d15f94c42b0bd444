//! Per-cell solution storage.
//!
//! Layout follows the mesh block: interior cells first, then ghost cells.
//!
//! | array | values per cell |
//! |---|---|
//! | `sol`, `soln`, `solt` | `neq` |
//! | `dsol`, `dsoln` | `neq * ndim`, equation-major |
//! | `cfl` | 1 (interior cells only) |

use super::error::GradientError;
use crate::mesh::{MeshBlock, Vec3};

/// Largest number of equations the kernels carry on the stack.
pub const MAX_EQUATIONS: usize = 10;

/// Solution arrays of one mesh block.
#[derive(Clone, Debug)]
pub struct SolutionFields {
    neq: usize,
    ndim: usize,
    n_cells: usize,
    n_ghost_cells: usize,

    /// Solution at the start of the sub-step
    pub sol: Vec<f64>,
    /// Solution at the current sub-step
    pub soln: Vec<f64>,
    /// Time derivative of the solution
    pub solt: Vec<f64>,
    /// Gradient from the previous sub-step
    pub dsol: Vec<f64>,
    /// Gradient computed by the kernel
    pub dsoln: Vec<f64>,
    /// Signed local CFL number of every interior cell
    pub cfl: Vec<f64>,
}

impl SolutionFields {
    /// Allocate zeroed fields for `neq` equations on `block`.
    pub fn new(block: &MeshBlock, neq: usize) -> Result<Self, GradientError> {
        if neq == 0 || neq > MAX_EQUATIONS {
            return Err(GradientError::EquationCount {
                neq,
                max: MAX_EQUATIONS,
            });
        }
        let ndim = block.ndim;
        let n_total = block.n_total_cells();
        Ok(Self {
            neq,
            ndim,
            n_cells: block.n_cells,
            n_ghost_cells: block.n_ghost_cells,
            sol: vec![0.0; n_total * neq],
            soln: vec![0.0; n_total * neq],
            solt: vec![0.0; n_total * neq],
            dsol: vec![0.0; n_total * neq * ndim],
            dsoln: vec![0.0; n_total * neq * ndim],
            cfl: vec![0.0; block.n_cells],
        })
    }

    /// Number of equations.
    #[inline]
    pub fn neq(&self) -> usize {
        self.neq
    }

    /// Spatial dimension.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Number of interior cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Number of interior plus ghost cells.
    #[inline]
    pub fn n_total_cells(&self) -> usize {
        self.n_cells + self.n_ghost_cells
    }

    /// Values per cell in `dsol`/`dsoln`.
    #[inline]
    pub fn gradient_stride(&self) -> usize {
        self.neq * self.ndim
    }

    /// Set `sol` and `soln` of every cell (ghosts included) to `values`,
    /// and zero `solt`, `dsol` and `dsoln`.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != neq`.
    pub fn fill_uniform(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.neq, "expected {} values", self.neq);
        for (sol, soln) in self
            .sol
            .chunks_exact_mut(self.neq)
            .zip(self.soln.chunks_exact_mut(self.neq))
        {
            sol.copy_from_slice(values);
            soln.copy_from_slice(values);
        }
        self.solt.fill(0.0);
        self.dsol.fill(0.0);
        self.dsoln.fill(0.0);
    }

    /// Set the same CFL number on every interior cell.
    pub fn fill_cfl(&mut self, cfl: f64) {
        self.cfl.fill(cfl);
    }

    /// Sample `sol`/`soln` from a function of the cell centroid (ghosts
    /// included), with the matching analytic gradient in `dsol`.
    ///
    /// `value(x, out)` writes `neq` values; `gradient(x, out)` writes
    /// `neq * ndim` values, equation-major.
    pub fn sample<V, G>(&mut self, block: &MeshBlock, value: V, gradient: G)
    where
        V: Fn(Vec3, &mut [f64]),
        G: Fn(Vec3, &mut [f64]),
    {
        let neq = self.neq;
        let stride = self.gradient_stride();
        for (icl, &x) in block.cell_centroids.iter().enumerate() {
            value(x, &mut self.soln[icl * neq..(icl + 1) * neq]);
            gradient(x, &mut self.dsol[icl * stride..(icl + 1) * stride]);
        }
        self.sol.copy_from_slice(&self.soln);
        self.solt.fill(0.0);
    }

    /// Current solution of one cell.
    #[inline]
    pub fn soln(&self, cell: usize) -> &[f64] {
        &self.soln[cell * self.neq..(cell + 1) * self.neq]
    }

    /// Mutable current solution of one cell.
    #[inline]
    pub fn soln_mut(&mut self, cell: usize) -> &mut [f64] {
        &mut self.soln[cell * self.neq..(cell + 1) * self.neq]
    }

    /// Computed gradient of one cell, equation-major.
    #[inline]
    pub fn dsoln(&self, cell: usize) -> &[f64] {
        let stride = self.gradient_stride();
        &self.dsoln[cell * stride..(cell + 1) * stride]
    }

    /// Computed gradient of one equation of one cell.
    #[inline]
    pub fn dsoln_eq(&self, cell: usize, eq: usize) -> &[f64] {
        let base = cell * self.gradient_stride() + eq * self.ndim;
        &self.dsoln[base..base + self.ndim]
    }

    /// Mutable previous gradient of one cell.
    #[inline]
    pub fn dsol_mut(&mut self, cell: usize) -> &mut [f64] {
        let stride = self.gradient_stride();
        &mut self.dsol[cell * stride..(cell + 1) * stride]
    }

    /// Check that every array still matches `block`.
    pub fn check_shape(&self, block: &MeshBlock) -> Result<(), GradientError> {
        if self.ndim != block.ndim {
            return Err(GradientError::DimensionMismatch {
                fields: self.ndim,
                mesh: block.ndim,
            });
        }
        let n_total = block.n_total_cells();
        let stride = self.gradient_stride();
        let expect = [
            ("sol", self.sol.len(), n_total * self.neq),
            ("soln", self.soln.len(), n_total * self.neq),
            ("solt", self.solt.len(), n_total * self.neq),
            ("dsol", self.dsol.len(), n_total * stride),
            ("dsoln", self.dsoln.len(), n_total * stride),
            ("cfl", self.cfl.len(), block.n_cells),
        ];
        for (field, actual, expected) in expect {
            if actual != expected {
                return Err(GradientError::FieldShape {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Split into the read-only kernel inputs and the writable `dsoln`.
    pub(crate) fn split_for_kernel(&mut self) -> (FieldView<'_>, &mut [f64]) {
        let view = FieldView {
            neq: self.neq,
            ndim: self.ndim,
            sol: &self.sol,
            soln: &self.soln,
            solt: &self.solt,
            dsol: &self.dsol,
            cfl: &self.cfl,
        };
        (view, &mut self.dsoln)
    }

    /// Read-only view of the kernel inputs.
    pub fn view(&self) -> FieldView<'_> {
        FieldView {
            neq: self.neq,
            ndim: self.ndim,
            sol: &self.sol,
            soln: &self.soln,
            solt: &self.solt,
            dsol: &self.dsol,
            cfl: &self.cfl,
        }
    }
}

/// Read-only borrow of the arrays the gradient kernel consumes.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    pub neq: usize,
    pub ndim: usize,
    pub sol: &'a [f64],
    pub soln: &'a [f64],
    pub solt: &'a [f64],
    pub dsol: &'a [f64],
    pub cfl: &'a [f64],
}

impl<'a> FieldView<'a> {
    #[inline(always)]
    pub fn sol(&self, cell: usize) -> &'a [f64] {
        &self.sol[cell * self.neq..(cell + 1) * self.neq]
    }

    #[inline(always)]
    pub fn soln(&self, cell: usize) -> &'a [f64] {
        &self.soln[cell * self.neq..(cell + 1) * self.neq]
    }

    #[inline(always)]
    pub fn solt(&self, cell: usize) -> &'a [f64] {
        &self.solt[cell * self.neq..(cell + 1) * self.neq]
    }

    /// Previous gradient of one cell, equation-major.
    #[inline(always)]
    pub fn dsol(&self, cell: usize) -> &'a [f64] {
        let stride = self.neq * self.ndim;
        &self.dsol[cell * stride..(cell + 1) * stride]
    }
}
