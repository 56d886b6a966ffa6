//! Freelancer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Translate between the flat profile and its relational shape (one
//!   `freelancers` row plus `skills`/`hobbies` rows).
//! - Run every operation inside exactly one SQLite transaction.
//!
//! # Invariants
//! - List and search only return rows with `is_archived = 0`; get ignores
//!   the flag.
//! - Update replaces both tag collections wholesale (delete-all, insert-all).
//! - Archive only flips `is_archived`; no operation physically deletes rows.
//! - Tag names are stored exactly as supplied, in caller order.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::freelancer::{Freelancer, FreelancerId, TagKind};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FREELANCER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    phone_number,
    is_archived
FROM freelancers";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "freelancers",
        &["id", "username", "email", "phone_number", "is_archived"],
    ),
    ("skills", &["id", "name", "freelancer_id"]),
    ("hobbies", &["id", "name", "freelancer_id"]),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for profile persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite failure. Always fatal for the current operation.
    Db(DbError),
    /// No profile with this id exists.
    NotFound(FreelancerId),
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
    /// Persisted row cannot be converted into a valid profile.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this is the expected not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "freelancer not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "freelancer repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "freelancer repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "freelancer repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted freelancer data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for freelancer profile operations.
pub trait FreelancerRepository {
    /// Lists every non-archived profile with its tags, in insertion order.
    fn list_active(&self) -> RepoResult<Vec<Freelancer>>;
    /// Gets one profile by id regardless of archive state.
    fn get(&self, id: FreelancerId) -> RepoResult<Option<Freelancer>>;
    /// Persists a new active profile under a freshly generated id.
    fn create(&mut self, freelancer: &Freelancer) -> RepoResult<Freelancer>;
    /// Overwrites scalar fields and replaces both tag collections.
    fn update(&mut self, freelancer: &Freelancer) -> RepoResult<()>;
    /// Sets the archive flag, leaving everything else untouched.
    fn archive(&mut self, id: FreelancerId) -> RepoResult<()>;
    /// Lists non-archived profiles whose username or email contains `query`.
    fn search(&self, query: &str) -> RepoResult<Vec<Freelancer>>;
}

/// SQLite-backed freelancer repository.
pub struct SqliteFreelancerRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteFreelancerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema drifted.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FreelancerRepository for SqliteFreelancerRepository<'_> {
    fn list_active(&self) -> RepoResult<Vec<Freelancer>> {
        let tx = self.conn.unchecked_transaction()?;
        let freelancers = query_hydrated(
            &tx,
            &format!("{FREELANCER_SELECT_SQL} WHERE is_archived = 0 ORDER BY rowid ASC;"),
            [],
        )?;
        tx.commit()?;
        Ok(freelancers)
    }

    fn get(&self, id: FreelancerId) -> RepoResult<Option<Freelancer>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut found = query_hydrated(
            &tx,
            &format!("{FREELANCER_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )?;
        tx.commit()?;
        Ok(found.pop())
    }

    fn create(&mut self, freelancer: &Freelancer) -> RepoResult<Freelancer> {
        let mut created = freelancer.clone();
        created.id = Uuid::new_v4();
        created.is_archived = false;
        let id_text = created.id.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO freelancers (
                id,
                username,
                email,
                phone_number,
                is_archived
            ) VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                id_text.as_str(),
                created.username.as_str(),
                created.email.as_str(),
                created.phone_number.as_str(),
            ],
        )?;
        for kind in TagKind::ALL {
            insert_tags(&tx, kind, &id_text, created.tags(kind))?;
        }
        tx.commit()?;

        Ok(created)
    }

    fn update(&mut self, freelancer: &Freelancer) -> RepoResult<()> {
        let id_text = freelancer.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE freelancers
             SET
                username = ?2,
                email = ?3,
                phone_number = ?4,
                is_archived = ?5
             WHERE id = ?1;",
            params![
                id_text.as_str(),
                freelancer.username.as_str(),
                freelancer.email.as_str(),
                freelancer.phone_number.as_str(),
                bool_to_int(freelancer.is_archived),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(freelancer.id));
        }

        for kind in TagKind::ALL {
            tx.execute(
                &format!("DELETE FROM {} WHERE freelancer_id = ?1;", kind.table()),
                [id_text.as_str()],
            )?;
            insert_tags(&tx, kind, &id_text, freelancer.tags(kind))?;
        }

        tx.commit()?;
        Ok(())
    }

    fn archive(&mut self, id: FreelancerId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Matched rows count even when the flag is already set.
        let changed = tx.execute(
            "UPDATE freelancers SET is_archived = 1 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn search(&self, query: &str) -> RepoResult<Vec<Freelancer>> {
        // instr() keeps SQLite's BINARY comparison and treats `%`/`_` literally.
        let tx = self.conn.unchecked_transaction()?;
        let freelancers = query_hydrated(
            &tx,
            &format!(
                "{FREELANCER_SELECT_SQL}
                 WHERE is_archived = 0
                   AND (instr(username, ?1) > 0 OR instr(email, ?1) > 0)
                 ORDER BY rowid ASC;"
            ),
            [query],
        )?;
        tx.commit()?;
        Ok(freelancers)
    }
}

fn query_hydrated<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<Freelancer>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut freelancers = Vec::new();
    while let Some(row) = rows.next()? {
        freelancers.push(parse_freelancer_row(row)?);
    }

    for freelancer in &mut freelancers {
        let id_text = freelancer.id.to_string();
        for kind in TagKind::ALL {
            *freelancer.tags_mut(kind) = load_tags(conn, kind, &id_text)?;
        }
    }

    Ok(freelancers)
}

fn parse_freelancer_row(row: &Row<'_>) -> RepoResult<Freelancer> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in freelancers.id"))
    })?;

    let is_archived = match row.get::<_, i64>("is_archived")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_archived value `{other}` in freelancers.is_archived"
            )));
        }
    };

    Ok(Freelancer {
        id,
        username: row.get("username")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
        is_archived,
        skills: Vec::new(),
        hobbies: Vec::new(),
    })
}

fn load_tags(conn: &Connection, kind: TagKind, freelancer_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT name FROM {} WHERE freelancer_id = ?1 ORDER BY id ASC;",
        kind.table()
    ))?;
    let mut rows = stmt.query([freelancer_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn insert_tags(
    conn: &Connection,
    kind: TagKind,
    freelancer_id: &str,
    names: &[String],
) -> RepoResult<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {} (name, freelancer_id) VALUES (?1, ?2);",
        kind.table()
    ))?;
    for name in names {
        stmt.execute(params![name.as_str(), freelancer_id])?;
    }
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
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

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
