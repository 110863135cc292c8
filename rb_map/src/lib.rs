//! An ordered map backed by a red-black tree.
//!
//! [`RbMap`] keeps its entries sorted by key and stays balanced through insertions
//! and removals, so lookups, inserts and erases are O(log n). Nodes are stored in a
//! [`slab::Slab`] owned by the map and link to each other by slab key.
//!
//! ```
//! use rb_map::{Error, RbMap};
//!
//! let mut map = RbMap::new();
//! for key in [10, 20, 30, 15, 5, 1] {
//!     map.insert(key, key * 100);
//! }
//! assert_eq!(map.min(), Ok((&1, &100)));
//! assert_eq!(map.max(), Ok((&30, &3000)));
//! assert_eq!(map.successor(&10), Ok((&15, &1500)));
//!
//! // insert never overwrites
//! assert_eq!(map.insert(10, 0), Some((10, 0)));
//! *map.at_mut(&10)? += 1;
//! assert_eq!(map[&10], 1001);
//!
//! assert_eq!(map.erase(&20), Some((20, 2000)));
//! assert_eq!(map.lookup(&20), Err(Error::KeyNotFound));
//! assert!(map.keys().copied().eq([1, 5, 10, 15, 30]));
//! assert_eq!(map.check_invariants(), Ok(()));
//! # Ok::<(), Error>(())
//! ```
//!
//! Maps can be written to and read back from a simple line based text format, see
//! [`RbMap::export_with`] and [`RbMap::import_with`].

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod balance;
mod check;
mod error;
mod export;
mod iter;
mod map;
mod node;

pub use error::{Error, Result, Violation};
pub use export::{Format, ImportReport, Order};
pub use iter::{IntoIter, Iter, Keys, Preorder, Values};
pub use map::RbMap;
