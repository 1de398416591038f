//! Organization store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the query surface the tree engine depends on: point lookup,
//!   filter-by-parent, filter-by-id-set, and optional native recursive
//!   closures.
//! - Own storage-level constraints: code uniqueness and parent
//!   delete-protection.
//! - Keep SQL details and presentation ordering inside the store boundary.
//!
//! # Invariants
//! - Write paths must call `Organization::validate()` before SQL mutations.
//! - Multi-row listings are deterministic: `name ASC, id ASC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::organization::{OrgId, Organization, OrganizationValidationError};
use rusqlite::{ffi, params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ORG_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    parent_id
FROM organizations";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from organization store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Record failed model validation before persistence.
    Validation(OrganizationValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target organization does not exist.
    NotFound(OrgId),
    /// Another organization already owns this code.
    CodeConflict(String),
    /// Referenced parent organization does not exist.
    ParentNotFound(OrgId),
    /// Organization is still referenced as a parent and cannot be deleted.
    DeleteProtected(OrgId),
    /// Store backend cannot evaluate recursive closure queries.
    RecursiveUnsupported,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "organization not found: {id}"),
            Self::CodeConflict(code) => {
                write!(f, "organization code `{code}` is already in use")
            }
            Self::ParentNotFound(id) => write!(f, "parent organization not found: {id}"),
            Self::DeleteProtected(id) => write!(
                f,
                "organization {id} is referenced as a parent and cannot be deleted"
            ),
            Self::RecursiveUnsupported => {
                write!(f, "store backend does not support recursive closure queries")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "organization store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "organization store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "organization store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid organization data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OrganizationValidationError> for StoreError {
    fn from(value: OrganizationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Entity store interface the tree engine and facade depend on.
///
/// `closure_downward`/`closure_upward` are optional capabilities: backends
/// without recursive query support keep the defaults and the engine falls
/// back to orchestrated breadth-first expansion.
pub trait OrganizationStore {
    /// Persists one new organization.
    fn create_org(&self, org: &Organization) -> StoreResult<OrgId>;
    /// Updates one existing organization by stable ID.
    fn update_org(&self, org: &Organization) -> StoreResult<()>;
    /// Hard-deletes one organization; protected while referenced as a parent.
    fn delete_org(&self, id: OrgId) -> StoreResult<()>;
    /// Loads one organization by ID.
    fn get_org(&self, id: OrgId) -> StoreResult<Option<Organization>>;
    /// Lists organizations whose parent equals the argument.
    /// `None` lists forest roots. Ordered by `name ASC, id ASC`.
    fn list_by_parent(&self, parent_id: Option<OrgId>) -> StoreResult<Vec<Organization>>;
    /// Lists organizations whose ID is in the given set, ordered by
    /// `name ASC, id ASC` for presentation.
    fn list_by_ids(&self, ids: &HashSet<OrgId>) -> StoreResult<Vec<Organization>>;
    /// Reports whether this backend evaluates recursive closure queries.
    fn supports_recursive_closure(&self) -> bool {
        false
    }
    /// Computes `root_id` plus all transitive children in one query.
    fn closure_downward(&self, _root_id: OrgId) -> StoreResult<HashSet<OrgId>> {
        Err(StoreError::RecursiveUnsupported)
    }
    /// Computes `leaf_id` plus all transitive parents in one query.
    /// Returns the empty set when `leaf_id` has no row.
    fn closure_upward(&self, _leaf_id: OrgId) -> StoreResult<HashSet<OrgId>> {
        Err(StoreError::RecursiveUnsupported)
    }
}

/// SQLite-backed organization store.
#[derive(Debug)]
pub struct SqliteOrganizationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_org_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OrganizationStore for SqliteOrganizationStore<'_> {
    fn create_org(&self, org: &Organization) -> StoreResult<OrgId> {
        org.validate()?;

        self.conn
            .execute(
                "INSERT INTO organizations (id, name, code, parent_id)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    org.id.to_string(),
                    org.name.as_str(),
                    org.code.as_str(),
                    org.parent_id.map(|value| value.to_string()),
                ],
            )
            .map_err(|err| map_write_constraint(err, org))?;

        Ok(org.id)
    }

    fn update_org(&self, org: &Organization) -> StoreResult<()> {
        org.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE organizations
                 SET name = ?2,
                     code = ?3,
                     parent_id = ?4,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    org.id.to_string(),
                    org.name.as_str(),
                    org.code.as_str(),
                    org.parent_id.map(|value| value.to_string()),
                ],
            )
            .map_err(|err| map_write_constraint(err, org))?;

        if changed == 0 {
            return Err(StoreError::NotFound(org.id));
        }

        Ok(())
    }

    fn delete_org(&self, id: OrgId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM organizations WHERE id = ?1;",
                [id.to_string()],
            )
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    StoreError::DeleteProtected(id)
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    fn get_org(&self, id: OrgId) -> StoreResult<Option<Organization>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORG_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_org_row(row)?));
        }

        Ok(None)
    }

    fn list_by_parent(&self, parent_id: Option<OrgId>) -> StoreResult<Vec<Organization>> {
        let sql = match parent_id {
            Some(_) => format!(
                "{ORG_SELECT_SQL}
                 WHERE parent_id = ?1
                 ORDER BY name ASC, id ASC;"
            ),
            None => format!(
                "{ORG_SELECT_SQL}
                 WHERE parent_id IS NULL
                 ORDER BY name ASC, id ASC;"
            ),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match parent_id {
            Some(parent_id) => stmt.query([parent_id.to_string()])?,
            None => stmt.query([])?,
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_org_row(row)?);
        }
        Ok(items)
    }

    fn list_by_ids(&self, ids: &HashSet<OrgId>) -> StoreResult<Vec<Organization>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "{ORG_SELECT_SQL}
             WHERE id IN ({placeholders})
             ORDER BY name ASC, id ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(|id| id.to_string())))?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_org_row(row)?);
        }
        Ok(items)
    }

    fn supports_recursive_closure(&self) -> bool {
        true
    }

    fn closure_downward(&self, root_id: OrgId) -> StoreResult<HashSet<OrgId>> {
        // Seeded with the literal id rather than a row select, so a missing
        // root still yields `{root_id}` and matches the iterative walk.
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE closure(id) AS (
                VALUES(?1)
                UNION
                SELECT child.id
                FROM organizations child
                INNER JOIN closure ON child.parent_id = closure.id
            )
            SELECT id FROM closure;",
        )?;

        let mut rows = stmt.query([root_id.to_string()])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.insert(parse_org_id(&value, "closure.id")?);
        }
        Ok(ids)
    }

    fn closure_upward(&self, leaf_id: OrgId) -> StoreResult<HashSet<OrgId>> {
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE lineage(id, parent_id) AS (
                SELECT id, parent_id
                FROM organizations
                WHERE id = ?1
                UNION
                SELECT parent.id, parent.parent_id
                FROM organizations parent
                INNER JOIN lineage ON parent.id = lineage.parent_id
            )
            SELECT id FROM lineage;",
        )?;

        let mut rows = stmt.query([leaf_id.to_string()])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.insert(parse_org_id(&value, "lineage.id")?);
        }
        Ok(ids)
    }
}

fn map_write_constraint(err: rusqlite::Error, org: &Organization) -> StoreError {
    if is_unique_violation(&err, "organizations.code") {
        return StoreError::CodeConflict(org.code.clone());
    }
    if is_foreign_key_violation(&err) {
        if let Some(parent_id) = org.parent_id {
            return StoreError::ParentNotFound(parent_id);
        }
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error, constraint: &str) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, Some(message))
            if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                && message.contains(constraint)
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn parse_org_row(row: &Row<'_>) -> StoreResult<Organization> {
    let id_text: String = row.get("id")?;
    let id = parse_org_id(&id_text, "organizations.id")?;

    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_org_id(&value, "organizations.parent_id"))
        .transpose()?;

    Ok(Organization {
        id,
        name: row.get("name")?,
        code: row.get("code")?,
        parent_id,
    })
}

fn parse_org_id(value: &str, column: &'static str) -> StoreResult<OrgId> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_org_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "organizations")? {
        return Err(StoreError::MissingRequiredTable("organizations"));
    }

    for column in ["id", "name", "code", "parent_id"] {
        if !table_has_column(conn, "organizations", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "organizations",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
