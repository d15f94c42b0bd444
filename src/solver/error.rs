//! Error types for the gradient drivers.

use thiserror::Error;

use crate::mesh::CellType;
use crate::params::ParameterError;

/// Errors reported by the gradient drivers before or while processing cells.
#[derive(Error, Debug, PartialEq)]
pub enum GradientError {
    /// Requested cell range is reversed or extends past the interior cells.
    #[error("Invalid cell range {start}..{end} for {n_cells} interior cells")]
    InvalidRange {
        start: usize,
        end: usize,
        n_cells: usize,
    },

    /// A field array does not match the mesh block.
    #[error("Field {field} has length {actual}, expected {expected}")]
    FieldShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Field dimension differs from the mesh dimension.
    #[error("Dimension mismatch: fields are {fields}-D, mesh is {mesh}-D")]
    DimensionMismatch { fields: usize, mesh: usize },

    /// Equation count outside `1..=MAX_EQUATIONS`.
    #[error("Unsupported number of equations: {neq} (max {max})")]
    EquationCount { neq: usize, max: usize },

    /// The simplex kernel was asked to process a non-simplex cell.
    #[error("Cell {cell} is a {shape}; the simplex kernel needs triangles or tetrahedra")]
    NonSimplexCell { cell: usize, shape: CellType },

    /// Invalid many-core launch configuration.
    #[error("Invalid launch configuration: {0}")]
    InvalidLaunch(String),

    /// A computed gradient is NaN or infinite (only with `trap_non_finite`).
    #[error("Non-finite gradient in cell {cell}, equation {equation}")]
    NonFinite { cell: usize, equation: usize },

    /// Kernel parameters failed validation.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
