//! Library-level test suite for calclineage
//!
//! Exercises the engine through the public API, without the binary.
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! - **worked_example**: classification and closure of a three-field chain
//! - **closure**: memoized closures against plain graph traversal
//! - **determinism**: identical seeds give identical tables
//! - **properties**: proptest properties of the normalizer, ids and closures

#[path = "../common/mod.rs"]
mod common;

mod closure;
mod determinism;
mod properties;
mod worked_example;
