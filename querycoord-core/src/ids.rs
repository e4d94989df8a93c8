//! Identifier newtypes
//!
//! Nodes, replicas and collections are all keyed by 64-bit integers. Each gets
//! its own type so a replica ID can never be passed where a node ID belongs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! unique_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw identifier
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

unique_id!(
    /// Worker node identifier
    NodeId
);

unique_id!(
    /// Replica group identifier
    ReplicaId
);

unique_id!(
    /// Collection identifier
    CollectionId
);
