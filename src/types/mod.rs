//! Strongly-typed domain types for safer APIs.
//!
//! Index newtypes keep cell and face indices apart when they cross the
//! public API; internally the mesh block stores raw `usize` arrays.
//!
//! # Example
//!
//! ```
//! use cese_rs::types::{CellIndex, FaceIndex};
//!
//! let cell = CellIndex::new(3);
//! let face = FaceIndex::new(3);
//! assert_eq!(cell.get(), face.get());
//! ```

mod indices;

pub use indices::{CellIndex, FaceIndex};
