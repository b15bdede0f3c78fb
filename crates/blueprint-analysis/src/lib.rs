//! Derived status and blocking analysis for the Blueprint LSP.
//!
//! Two orthogonal statuses exist per requirement:
//!
//! - the **derived status** ([`DerivedStatus`]) computed from the tickets
//!   referencing it and the constraints it declares, and
//! - the **blocking status** ([`BlockingStatus`]) computed from the
//!   dependency graph (`not-blocked` / `blocked` / `in-cycle`).
//!
//! Both propagate to features and modules. [`StatusAnalysis`] is a pure
//! snapshot of the whole workspace; [`AnalysisCache`] recomputes it lazily
//! whenever the index or ticket store version moves.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod blocking;
mod status;

pub use analysis::{AnalysisCache, StatusAnalysis};
pub use blocking::{Blocker, BlockingInfo, BlockingStatus};
pub use status::{DerivedStatus, derive_status};
