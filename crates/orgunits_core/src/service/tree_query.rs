//! Transitive-closure queries over the organization forest.
//!
//! # Responsibility
//! - Compute downward (self + descendants) and upward (self + ancestors)
//!   closures over the parent-pointer relation.
//! - Select between orchestrated breadth-first expansion and store-native
//!   recursive queries behind one interface.
//!
//! # Invariants
//! - Both strategies are set-equal on any acyclic forest.
//! - The engine only reads; it never mutates the store and issues no
//!   transactions of its own.
//! - A missing downward root yields `{root_id}`; a missing upward leaf is
//!   `TreeError::NotFound` (the upward seed must be loaded to read its
//!   parent pointer).

use crate::model::organization::OrgId;
use crate::repo::org_repo::{OrganizationStore, StoreError};
use std::collections::{HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from tree closure queries.
#[derive(Debug)]
pub enum TreeError {
    /// Upward traversal was asked to start from a nonexistent record.
    NotFound(OrgId),
    /// Store-level failure, propagated unchanged.
    Store(StoreError),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "organization not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for TreeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Closure evaluation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStrategy {
    /// Breadth-first expansion in the engine, one store query per visited
    /// node. Works against any store offering point/filter lookups.
    Iterative,
    /// One recursive set-union query evaluated by the store.
    Recursive,
}

/// Read-only closure query engine over an organization store.
pub struct TreeQueryEngine<'store, S: OrganizationStore> {
    store: &'store S,
    strategy: TreeStrategy,
}

impl<'store, S: OrganizationStore> TreeQueryEngine<'store, S> {
    /// Creates an engine, preferring the store-native recursive strategy
    /// when the backend supports it.
    pub fn new(store: &'store S) -> Self {
        let strategy = if store.supports_recursive_closure() {
            TreeStrategy::Recursive
        } else {
            TreeStrategy::Iterative
        };
        Self { store, strategy }
    }

    /// Creates an engine with a forced strategy.
    pub fn with_strategy(store: &'store S, strategy: TreeStrategy) -> Self {
        Self { store, strategy }
    }

    /// Returns the active strategy.
    pub fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    /// Computes `root_id` plus every organization reachable downward.
    ///
    /// A `root_id` with no record yields `{root_id}`: the downward walk
    /// never loads the root itself, only asks who points at it.
    pub fn descendants_of(&self, root_id: OrgId) -> TreeResult<HashSet<OrgId>> {
        match self.strategy {
            TreeStrategy::Recursive => Ok(self.store.closure_downward(root_id)?),
            TreeStrategy::Iterative => self.descendants_iterative(root_id),
        }
    }

    /// Computes `leaf_id` plus every organization reachable upward.
    ///
    /// # Errors
    /// `TreeError::NotFound` when `leaf_id` has no record.
    pub fn ancestors_of(&self, leaf_id: OrgId) -> TreeResult<HashSet<OrgId>> {
        match self.strategy {
            TreeStrategy::Recursive => {
                if self.store.get_org(leaf_id)?.is_none() {
                    return Err(TreeError::NotFound(leaf_id));
                }
                Ok(self.store.closure_upward(leaf_id)?)
            }
            TreeStrategy::Iterative => self.ancestors_iterative(leaf_id),
        }
    }

    fn descendants_iterative(&self, root_id: OrgId) -> TreeResult<HashSet<OrgId>> {
        let mut visited = HashSet::from([root_id]);
        let mut queue = VecDeque::from([root_id]);

        while let Some(current) = queue.pop_front() {
            for child in self.store.list_by_parent(Some(current))? {
                if visited.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }

        Ok(visited)
    }

    fn ancestors_iterative(&self, leaf_id: OrgId) -> TreeResult<HashSet<OrgId>> {
        let mut visited = HashSet::from([leaf_id]);
        // Each node has at most one parent, so the queue never holds more
        // than one pending id; kept symmetric with the downward walk.
        let mut queue = VecDeque::from([leaf_id]);

        while let Some(current) = queue.pop_front() {
            let record = match self.store.get_org(current)? {
                Some(record) => record,
                None if current == leaf_id => return Err(TreeError::NotFound(leaf_id)),
                // A node observed through a child pointer but gone by the
                // time we load it: accepted weak-consistency window.
                None => continue,
            };

            // "No parent" is an expected terminal state, checked explicitly.
            if let Some(parent_id) = record.parent_id {
                if visited.insert(parent_id) {
                    queue.push_back(parent_id);
                }
            }
        }

        Ok(visited)
    }
}
