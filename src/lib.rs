//! Rendezvous (highest random weight) hashing for spreading keys over a set of
//! nodes, such as cache servers or load balancer backends.
//!
//! ```
//! use rendezvous_hash::Rendezvous;
//!
//! let mut nodes = Rendezvous::new();
//! nodes.add(["a", "b", "c", "d", "e"]);
//!
//! assert_eq!(nodes.get("foo"), Some(&"e"));
//! assert_eq!(nodes.get_n(3, "baz"), vec![&"d", &"a", &"b"]);
//! ```
pub mod config;
pub mod hashable;
pub mod logging;
pub mod rendezvous;
pub mod report;
pub mod scorer;
pub mod shared;

pub use hashable::Hashable;
pub use rendezvous::Rendezvous;
pub use scorer::{Algorithm, Castagnoli, Scorer, Xxh3};
pub use shared::SharedRendezvous;
