//! Organization facade service.
//!
//! # Responsibility
//! - Expose `parents`/`children` projections on a single record, delegating
//!   closure computation to the tree engine and excluding the record itself.
//! - Provide thin CRUD entry points for administrative callers.
//!
//! # Invariants
//! - Projections are pure reads: no caching, results always reflect the
//!   store state at call time.
//! - Returned listings are name-ordered by the store, never by this layer.

use crate::model::organization::{OrgId, Organization};
use crate::repo::org_repo::{OrganizationStore, StoreResult};
use crate::service::tree_query::{TreeQueryEngine, TreeResult};

/// Use-case facade over one organization store.
pub struct OrganizationService<S: OrganizationStore> {
    store: S,
}

impl<S: OrganizationStore> OrganizationService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns all ancestors of `org` at any depth, excluding `org` itself,
    /// ordered by name.
    ///
    /// # Errors
    /// `TreeError::NotFound` when `org` was never persisted or has been
    /// deleted since it was loaded.
    pub fn parents(&self, org: &Organization) -> TreeResult<Vec<Organization>> {
        let engine = self.engine();
        let mut closure = engine.ancestors_of(org.id)?;
        closure.remove(&org.id);
        Ok(self.store.list_by_ids(&closure)?)
    }

    /// Returns all descendants of `org` at any depth, excluding `org`
    /// itself, ordered by name. Empty for never-persisted records.
    pub fn children(&self, org: &Organization) -> TreeResult<Vec<Organization>> {
        let engine = self.engine();
        let mut closure = engine.descendants_of(org.id)?;
        closure.remove(&org.id);
        Ok(self.store.list_by_ids(&closure)?)
    }

    /// Creates one organization through store persistence.
    pub fn create_org(&self, org: &Organization) -> StoreResult<OrgId> {
        self.store.create_org(org)
    }

    /// Updates one organization by stable ID.
    pub fn update_org(&self, org: &Organization) -> StoreResult<()> {
        self.store.update_org(org)
    }

    /// Deletes one organization; fails while it is referenced as a parent.
    pub fn delete_org(&self, id: OrgId) -> StoreResult<()> {
        self.store.delete_org(id)
    }

    /// Gets one organization by ID.
    pub fn get_org(&self, id: OrgId) -> StoreResult<Option<Organization>> {
        self.store.get_org(id)
    }

    /// Lists forest roots, ordered by name.
    pub fn list_roots(&self) -> StoreResult<Vec<Organization>> {
        self.store.list_by_parent(None)
    }

    /// Lists direct children of one organization, ordered by name.
    pub fn list_direct_children(&self, parent_id: OrgId) -> StoreResult<Vec<Organization>> {
        self.store.list_by_parent(Some(parent_id))
    }

    fn engine(&self) -> TreeQueryEngine<'_, S> {
        TreeQueryEngine::new(&self.store)
    }
}
