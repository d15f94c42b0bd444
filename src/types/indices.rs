//! Index newtypes for cells and faces.
//!
//! The mesh block stores connectivity as raw `usize`; these wrappers keep a
//! cell number from being passed where a face number is expected.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw position in the mesh block arrays.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Indices `0..n` in order.
            pub fn all(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(index: $name) -> usize {
                index.0
            }
        }
    };
}

define_index!(
    /// Cell in a mesh block. Ghost cells follow the `n_cells` interior ones.
    ///
    /// ```
    /// use cese_rs::CellIndex;
    ///
    /// assert_eq!(CellIndex::new(12).to_string(), "cell#12");
    /// ```
    CellIndex,
    "cell#"
);

define_index!(
    /// Face in a mesh block.
    FaceIndex,
    "face#"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let cell = CellIndex::new(42);
        assert_eq!(usize::from(cell), 42);
        assert_eq!(CellIndex::from(42), cell);
        assert_eq!(FaceIndex::from(5).get(), 5);
    }

    #[test]
    fn test_all_is_dense() {
        let cells: Vec<_> = CellIndex::all(4).collect();
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().enumerate().all(|(i, c)| c.get() == i));
        assert_eq!(FaceIndex::all(0).len(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(FaceIndex::new(10).to_string(), "face#10");
    }
}
