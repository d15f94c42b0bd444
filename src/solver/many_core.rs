//! Many-core launch model: one logical thread per cell, grouped in blocks.
//!
//! A launch covers `n` cells with `ceil(n / threads_per_block)` blocks. Each
//! block owns the output slots of its threads; threads whose global id is
//! past the last cell return before touching memory. Blocks are scheduled on
//! rayon when the `parallel` feature is enabled and sequentially otherwise.

use super::error::GradientError;

/// Launch geometry of the many-core backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Threads per block
    pub threads_per_block: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            threads_per_block: 256,
        }
    }
}

/// Position of a logical thread in the launch grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadId {
    pub block: usize,
    pub thread: usize,
    pub block_dim: usize,
}

impl ThreadId {
    /// Global thread id, i.e. the cell it handles.
    #[inline(always)]
    pub fn global(&self) -> usize {
        self.block_dim * self.block + self.thread
    }
}

impl LaunchConfig {
    pub fn new(threads_per_block: usize) -> Self {
        Self { threads_per_block }
    }

    /// Number of blocks needed to cover `n` cells.
    #[inline]
    pub fn grid_size(&self, n: usize) -> usize {
        n.div_ceil(self.threads_per_block)
    }

    /// Reject a zero block size.
    pub fn validate(&self) -> Result<(), GradientError> {
        if self.threads_per_block == 0 {
            return Err(GradientError::InvalidLaunch(
                "threads_per_block must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Launch `body` once per cell in `0..n`.
///
/// `out` holds `n * stride` values; `body` receives the thread id and the
/// `stride` values owned by that cell.
pub(crate) fn launch<F>(
    config: &LaunchConfig,
    n: usize,
    out: &mut [f64],
    stride: usize,
    body: F,
) -> Result<(), GradientError>
where
    F: Fn(ThreadId, &mut [f64]) -> Result<(), GradientError> + Sync + Send,
{
    config.validate()?;
    debug_assert_eq!(out.len(), n * stride);
    let block_dim = config.threads_per_block;
    log::trace!(
        "many-core launch: {} blocks x {} threads for {} cells",
        config.grid_size(n),
        block_dim,
        n
    );

    let run_block = |(block, chunk): (usize, &mut [f64])| -> Result<(), GradientError> {
        for thread in 0..block_dim {
            let tid = ThreadId {
                block,
                thread,
                block_dim,
            };
            if tid.global() >= n {
                return Ok(());
            }
            body(tid, &mut chunk[thread * stride..(thread + 1) * stride])?;
        }
        Ok(())
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(block_dim * stride)
            .enumerate()
            .try_for_each(run_block)
    }
    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(block_dim * stride)
            .enumerate()
            .try_for_each(run_block)
    }
}
