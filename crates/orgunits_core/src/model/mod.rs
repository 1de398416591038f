//! Domain model for organizational units.
//!
//! # Responsibility
//! - Define the canonical record shape shared by store, engine and facade.
//! - Keep field-level invariants next to the data they protect.
//!
//! # Invariants
//! - Every organization is identified by a stable `OrgId`.
//! - The parent pointer forms a forest: at most one parent, no cycles.

pub mod organization;
