//! Store layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entity-store contract the tree engine traverses against.
//! - Isolate SQLite query details from engine/facade orchestration.
//!
//! # Invariants
//! - Store writes must enforce `Organization::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`, `CodeConflict`,
//!   `DeleteProtected`) in addition to DB transport errors.

pub mod org_repo;
