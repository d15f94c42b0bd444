//! Gradient drivers.
//!
//! Every driver writes `dsoln` for a set of interior cells and reads only
//! `sol`, `soln`, `solt`, `dsol`, `cfl` and the mesh. Ghost-cell values must
//! be resolved before a driver runs.
//!
//! | driver | scheduling |
//! |---|---|
//! | [`compute_dsoln_range`] | serial over `[start, end)` |
//! | [`compute_dsoln_parallel`] | rayon task per cell over `[start, end)` |
//! | [`compute_dsoln_many_core`] | block/thread launch over all cells |
//!
//! When an error is returned the content of `dsoln` in the requested range
//! is unspecified.

use std::ops::Range;
use std::time::{Duration, Instant};

use super::error::GradientError;
use super::fields::SolutionFields;
use super::kernel::{
    cell_gradient_generic, cell_gradient_simplex, CellGradient, CellKernel, GradientContext,
};
use super::many_core::{launch, LaunchConfig};
use crate::mesh::MeshBlock;
use crate::params::CeseParameters;

/// Which per-cell kernel a driver runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KernelFlavor {
    /// Table-driven kernel for any mix of cell shapes
    #[default]
    Generic,
    /// Fixed-size kernel for triangles or tetrahedra only
    Simplex,
}

impl KernelFlavor {
    /// Simplex when every interior cell is a simplex, generic otherwise.
    pub fn for_block(block: &MeshBlock) -> Self {
        if block.is_simplicial() {
            KernelFlavor::Simplex
        } else {
            KernelFlavor::Generic
        }
    }

    fn kernel(self) -> CellKernel {
        match self {
            KernelFlavor::Generic => cell_gradient_generic,
            KernelFlavor::Simplex => cell_gradient_simplex,
        }
    }
}

/// Work done by one driver call, for load balancing by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientCost {
    /// Number of cells processed
    pub cells: usize,
    /// Wall time spent
    pub elapsed: Duration,
}

impl GradientCost {
    /// Processing rate, or zero when nothing was timed.
    pub fn cells_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.cells as f64 / secs
        } else {
            0.0
        }
    }
}

/// Validate the inputs shared by every driver.
fn check_inputs(
    block: &MeshBlock,
    fields: &SolutionFields,
    params: &CeseParameters,
    flavor: KernelFlavor,
    range: &Range<usize>,
) -> Result<(), GradientError> {
    params.validate()?;
    fields.check_shape(block)?;
    if range.start > range.end || range.end > block.n_cells {
        return Err(GradientError::InvalidRange {
            start: range.start,
            end: range.end,
            n_cells: block.n_cells,
        });
    }
    if flavor == KernelFlavor::Simplex {
        if let Some(cell) = range
            .clone()
            .find(|&c| !block.cell_types[c].is_simplex())
        {
            return Err(GradientError::NonSimplexCell {
                cell,
                shape: block.cell_types[cell],
            });
        }
    }
    Ok(())
}

/// Store one cell's result, honoring the non-finite trap.
#[inline]
fn store(
    gradient: &CellGradient,
    cell: usize,
    trap: bool,
    slot: &mut [f64],
) -> Result<(), GradientError> {
    if trap {
        if let Some(equation) = gradient.first_non_finite() {
            log::warn!("non-finite gradient in cell {}, equation {}", cell, equation);
            return Err(GradientError::NonFinite { cell, equation });
        }
    }
    gradient.write_into(slot);
    Ok(())
}

/// Compute `dsoln` for interior cells `range`, one cell after another.
///
/// An empty range is a no-op. Cells outside the range are not touched.
///
/// # Example
///
/// ```
/// use cese_rs::{compute_dsoln_range, CeseParameters, KernelFlavor, MeshBlockBuilder, SolutionFields};
///
/// let block = MeshBlockBuilder::rectangle_quads(0.0, 1.0, 0.0, 1.0, 4, 4).unwrap();
/// let mut fields = SolutionFields::new(&block, 1).unwrap();
/// fields.fill_uniform(&[1.0]);
/// fields.fill_cfl(0.5);
///
/// let params = CeseParameters::default();
/// let cost = compute_dsoln_range(&block, &mut fields, &params, KernelFlavor::Generic, 2..6).unwrap();
/// assert_eq!(cost.cells, 4);
/// ```
pub fn compute_dsoln_range(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    params: &CeseParameters,
    flavor: KernelFlavor,
    range: Range<usize>,
) -> Result<GradientCost, GradientError> {
    let timer = Instant::now();
    check_inputs(block, fields, params, flavor, &range)?;

    let stride = fields.gradient_stride();
    let (view, dsoln) = fields.split_for_kernel();
    let ctx = GradientContext {
        block,
        fields: view,
        params,
    };
    let kernel = flavor.kernel();
    let out = &mut dsoln[range.start * stride..range.end * stride];
    for (offset, slot) in out.chunks_exact_mut(stride).enumerate() {
        let cell = range.start + offset;
        store(&kernel(&ctx, cell), cell, params.trap_non_finite, slot)?;
    }

    let cost = GradientCost {
        cells: range.len(),
        elapsed: timer.elapsed(),
    };
    log::debug!(
        "dsoln {:?} over cells {:?}: {} cells in {:?}",
        flavor,
        range,
        cost.cells,
        cost.elapsed
    );
    Ok(cost)
}

/// Compute `dsoln` for interior cells `range` on the rayon thread pool.
///
/// Each cell is an independent task writing only its own slot.
#[cfg(feature = "parallel")]
pub fn compute_dsoln_parallel(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    params: &CeseParameters,
    flavor: KernelFlavor,
    range: Range<usize>,
) -> Result<GradientCost, GradientError> {
    use rayon::prelude::*;

    let timer = Instant::now();
    check_inputs(block, fields, params, flavor, &range)?;

    let stride = fields.gradient_stride();
    let (view, dsoln) = fields.split_for_kernel();
    let ctx = GradientContext {
        block,
        fields: view,
        params,
    };
    let kernel = flavor.kernel();
    let trap = params.trap_non_finite;
    let start = range.start;
    dsoln[range.start * stride..range.end * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .try_for_each(|(offset, slot)| {
            let cell = start + offset;
            store(&kernel(&ctx, cell), cell, trap, slot)
        })?;

    let cost = GradientCost {
        cells: range.len(),
        elapsed: timer.elapsed(),
    };
    log::debug!(
        "dsoln {:?} (parallel) over cells {:?}: {} cells in {:?}",
        flavor,
        range,
        cost.cells,
        cost.elapsed
    );
    Ok(cost)
}

/// Compute `dsoln` for every interior cell with the many-core launch model.
pub fn compute_dsoln_many_core(
    block: &MeshBlock,
    fields: &mut SolutionFields,
    params: &CeseParameters,
    flavor: KernelFlavor,
    config: LaunchConfig,
) -> Result<GradientCost, GradientError> {
    let timer = Instant::now();
    let n = block.n_cells;
    check_inputs(block, fields, params, flavor, &(0..n))?;

    let stride = fields.gradient_stride();
    let (view, dsoln) = fields.split_for_kernel();
    let ctx = GradientContext {
        block,
        fields: view,
        params,
    };
    let kernel = flavor.kernel();
    let trap = params.trap_non_finite;
    launch(&config, n, &mut dsoln[..n * stride], stride, |tid, slot| {
        let cell = tid.global();
        store(&kernel(&ctx, cell), cell, trap, slot)
    })?;

    let cost = GradientCost {
        cells: n,
        elapsed: timer.elapsed(),
    };
    log::debug!(
        "dsoln {:?} (many-core, {} threads/block) over {} cells in {:?}",
        flavor,
        config.threads_per_block,
        cost.cells,
        cost.elapsed
    );
    Ok(cost)
}
