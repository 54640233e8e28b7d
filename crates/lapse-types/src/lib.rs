//! Lapse Types
//!
//! This crate defines the snapshot types shared across the Lapse ecosystem
//! (currently `lapse-core`). The serialized shape they produce — field
//! names, the conditional `children` key — is a compatibility contract for
//! tooling that embeds timer snapshots into logs or trace payloads, so the
//! types live in a leaf crate with no dependency on the timer itself.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_docs)]

mod snapshot;
pub use snapshot::{ChildMeasures, Measure, NestedMeasures};
