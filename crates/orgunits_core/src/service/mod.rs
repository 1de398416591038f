//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into closure queries and facade APIs.
//! - Keep callers decoupled from storage details.

pub mod org_service;
pub mod tree_query;
