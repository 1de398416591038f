//! Core domain logic for the organization hierarchy service.
//! This crate is the single source of truth for closure-query semantics.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::organization::{OrgId, Organization, OrganizationValidationError};
pub use repo::org_repo::{
    OrganizationStore, SqliteOrganizationStore, StoreError, StoreResult,
};
pub use service::org_service::OrganizationService;
pub use service::tree_query::{TreeError, TreeQueryEngine, TreeResult, TreeStrategy};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
