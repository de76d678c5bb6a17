//! Target structural controllability for directed networks.
//!
//! Finds the smallest subset of candidate *source* (driver) nodes that can
//! structurally control a set of *target* nodes through paths of bounded
//! length, using a randomized Kalman rank test:
//!
//! 1. Encode the network as an adjacency matrix `A` whose edge weights are
//!    `1 + U[0, 1)`, drawn afresh for each of several trials.
//! 2. For each trial compute `[C, C·A, ..., C·A^L]` with `C` selecting the
//!    targets.
//! 3. The structural rank of a source set `B` is the stabilized maximum over
//!    trials of `rank [C·B | C·A·B | ... | C·A^L·B]`.
//! 4. Search source subsets for the smallest one reaching the rank of the
//!    full source set.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`index`] | label ↔ matrix index |
//! | [`matrix`] | `A`, `B` and `C` builders |
//! | [`power`] | power series and target projection |
//! | [`rank`] | numerical and structural rank |
//! | [`search`] | pruned subset search, sequential or on a rayon pool |
//! | [`algorithm`] | the whole pipeline behind one call |
//!
//! # Example
//!
//! ```rust
//! use ruvector_control::algorithm::{run, ControlProblem};
//! use ruvector_control::cancel::CancellationToken;
//! use ruvector_control::traits::NoopObserver;
//! use ruvector_control::types::Parameters;
//!
//! let problem = ControlProblem {
//!     nodes: vec!["A".into(), "B".into(), "C".into()],
//!     edges: vec![("A".into(), "B".into()), ("B".into(), "C".into())],
//!     targets: vec!["C".into()],
//!     sources: vec!["A".into()],
//!     parameters: Parameters { maximum_path_length: 2, ..Parameters::default() },
//! };
//!
//! let result = run(&problem, &NoopObserver, &CancellationToken::new()).unwrap();
//! assert_eq!(result.maximum_rank, 1);
//! assert_eq!(result.solution_nodes, vec!["A".to_string()]);
//! ```
//!
//! # Scalability
//!
//! The search is exhaustive over `2^k` subsets of `k` sources, pruned by a
//! size window and by the best solution found so far. `k` is limited to
//! [`subset::MAX_SOURCE_NODES`].

pub mod algorithm;
pub mod cancel;
pub mod error;
pub mod events;
pub mod index;
pub mod matrix;
pub mod power;
pub mod progress;
pub mod rank;
pub mod result;
pub mod search;
pub mod subset;
pub mod traits;
pub mod types;
pub mod validation;

pub use algorithm::{run, ControlAlgorithm, ControlProblem};
pub use cancel::CancellationToken;
pub use error::{ControlError, ValidationError};
pub use result::ControlResult;
pub use types::Parameters;
