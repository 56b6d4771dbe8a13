//! Dense graph indices.
//!
//! `NodeId` and `EdgeId` are positions in the road graph's column vectors,
//! assigned by the builder.  They are not the caller's external ids (OSM
//! ids and the like), which the graph keeps alongside.

use std::fmt;

macro_rules! dense_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

dense_id! {
    /// Road-graph node, in insertion order.
    NodeId, "node"
}

dense_id! {
    /// Directed road-graph edge, in CSR order.
    EdgeId, "edge"
}
