//! Immutable reference-data bundle: range tables, per-code-point records and
//! the fixed control/noncharacter sets.
//!
//! Acquisition and normalization of raw Unicode data is an external concern;
//! this module only loads already-built tables and serves lock-free reads.

/// Bundle assembly and accessors.
pub mod bundle;
/// Fixed control/format tables and noncharacter helpers.
pub mod controls;
/// Per-code-point character records.
pub mod records;
/// Code-point bitset.
pub mod set;
/// Block/plane/version/common-name range tables.
pub mod tables;
