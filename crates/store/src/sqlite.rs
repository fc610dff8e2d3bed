//! SQLite Store
//!
//! File-backed implementation of every repository trait. The schema is
//! created on open; primary keys mirror the record keys so uniqueness is
//! enforced by SQLite itself.

use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use shared::{Class, FinalReview, Okr, OkrStatus, Period, PeriodStatus, Relationship, Role, User};

use crate::error::RepositoryError;
use crate::repository::{
    CascadeReport, ClassRepository, OkrRepository, PeriodRepository, RelationshipRepository,
    ReviewRepository, SchoolStore, UserRepository,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    email         TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    name          TEXT NOT NULL,
    role          TEXT NOT NULL,
    class_name    TEXT
);
CREATE TABLE IF NOT EXISTS classes (
    name          TEXT PRIMARY KEY,
    teacher_email TEXT,
    size          INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS periods (
    id     TEXT PRIMARY KEY,
    name   TEXT NOT NULL,
    status TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS relationships (
    student_email TEXT NOT NULL,
    parent_email  TEXT NOT NULL,
    PRIMARY KEY (student_email, parent_email)
);
CREATE TABLE IF NOT EXISTS okrs (
    id               TEXT PRIMARY KEY,
    student_email    TEXT NOT NULL,
    period_id        TEXT NOT NULL,
    objective        TEXT NOT NULL,
    key_result       TEXT NOT NULL,
    status           TEXT NOT NULL,
    target_value     REAL NOT NULL,
    actual_value     REAL NOT NULL,
    unit             TEXT NOT NULL DEFAULT '',
    delete_requested INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS okrs_student_period ON okrs (student_email, period_id);
CREATE TABLE IF NOT EXISTS final_reviews (
    student_email   TEXT NOT NULL,
    period_id       TEXT NOT NULL,
    teacher_comment TEXT NOT NULL DEFAULT '',
    parent_comment  TEXT NOT NULL DEFAULT '',
    sent            INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (student_email, period_id)
);
"#;

const USER_COLUMNS: &str = "email, password_hash, name, role, class_name";
const OKR_COLUMNS: &str = "id, student_email, period_id, objective, key_result, status, \
                           target_value, actual_value, unit, delete_requested";
const REVIEW_COLUMNS: &str = "student_email, period_id, teacher_comment, parent_comment, sent";

/// SQLite School Store
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    /// Throwaway database, used by tests and `:memory:` configs
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

/// Map a UNIQUE / PRIMARY KEY violation to `Duplicate`
fn insert_error(err: rusqlite::Error, entity: &'static str, key: &str) -> RepositoryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            RepositoryError::duplicate(entity, key)
        }
        _ => err.into(),
    }
}

fn parse_column<T, E>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        email: row.get(0)?,
        password_hash: row.get(1)?,
        name: row.get(2)?,
        role: parse_column::<Role, _>(row, 3)?,
        class_name: row.get(4)?,
    })
}

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<Class> {
    Ok(Class {
        name: row.get(0)?,
        teacher_email: row.get(1)?,
        size: row.get(2)?,
    })
}

fn period_from_row(row: &Row<'_>) -> rusqlite::Result<Period> {
    Ok(Period {
        id: row.get(0)?,
        name: row.get(1)?,
        status: parse_column::<PeriodStatus, _>(row, 2)?,
    })
}

fn okr_from_row(row: &Row<'_>) -> rusqlite::Result<Okr> {
    Ok(Okr {
        id: row.get(0)?,
        student_email: row.get(1)?,
        period_id: row.get(2)?,
        objective: row.get(3)?,
        key_result: row.get(4)?,
        status: parse_column::<OkrStatus, _>(row, 5)?,
        target_value: row.get(6)?,
        actual_value: row.get(7)?,
        unit: row.get(8)?,
        delete_requested: row.get(9)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<FinalReview> {
    Ok(FinalReview {
        student_email: row.get(0)?,
        period_id: row.get(1)?,
        teacher_comment: row.get(2)?,
        parent_comment: row.get(3)?,
        sent: row.get(4)?,
    })
}

impl SqliteStore {
    fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, RepositoryError>
    where
        P: rusqlite::Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }
}

impl UserRepository for SqliteStore {
    fn insert_user(&mut self, user: &User) -> Result<(), RepositoryError> {
        self.conn
            .execute(
                &format!("INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5)", USER_COLUMNS),
                params![
                    user.email,
                    user.password_hash,
                    user.name,
                    user.role.as_str(),
                    user.class_name
                ],
            )
            .map_err(|e| insert_error(e, "User", &user.email))?;
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> Result<(), RepositoryError> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?2, name = ?3, role = ?4, class_name = ?5 \
             WHERE email = ?1",
            params![
                user.email,
                user.password_hash,
                user.name,
                user.role.as_str(),
                user.class_name
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("User", &user.email));
        }
        Ok(())
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                [email],
                user_from_row,
            )
            .optional()?)
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.query_all(
            &format!("SELECT {} FROM users ORDER BY email", USER_COLUMNS),
            [],
            user_from_row,
        )
    }

    fn list_users_by_class(&self, class_name: &str) -> Result<Vec<User>, RepositoryError> {
        self.query_all(
            &format!(
                "SELECT {} FROM users WHERE class_name = ?1 ORDER BY email",
                USER_COLUMNS
            ),
            [class_name],
            user_from_row,
        )
    }

    fn delete_user(&mut self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute("DELETE FROM users WHERE email = ?1", [email])? > 0)
    }
}

impl ClassRepository for SqliteStore {
    fn insert_class(&mut self, class: &Class) -> Result<(), RepositoryError> {
        self.conn
            .execute(
                "INSERT INTO classes (name, teacher_email, size) VALUES (?1, ?2, ?3)",
                params![class.name, class.teacher_email, class.size],
            )
            .map_err(|e| insert_error(e, "Class", &class.name))?;
        Ok(())
    }

    fn update_class(&mut self, class: &Class) -> Result<(), RepositoryError> {
        let changed = self.conn.execute(
            "UPDATE classes SET teacher_email = ?2, size = ?3 WHERE name = ?1",
            params![class.name, class.teacher_email, class.size],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Class", &class.name));
        }
        Ok(())
    }

    fn find_class(&self, name: &str) -> Result<Option<Class>, RepositoryError> {
        Ok(self
            .conn
            .query_row(
                "SELECT name, teacher_email, size FROM classes WHERE name = ?1",
                [name],
                class_from_row,
            )
            .optional()?)
    }

    fn list_classes(&self) -> Result<Vec<Class>, RepositoryError> {
        self.query_all(
            "SELECT name, teacher_email, size FROM classes ORDER BY name",
            [],
            class_from_row,
        )
    }

    fn delete_class(&mut self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute("DELETE FROM classes WHERE name = ?1", [name])? > 0)
    }
}

impl PeriodRepository for SqliteStore {
    fn insert_period(&mut self, period: &Period) -> Result<(), RepositoryError> {
        self.conn
            .execute(
                "INSERT INTO periods (id, name, status) VALUES (?1, ?2, ?3)",
                params![period.id, period.name, period.status.as_str()],
            )
            .map_err(|e| insert_error(e, "Period", &period.id))?;
        Ok(())
    }

    fn find_period(&self, id: &str) -> Result<Option<Period>, RepositoryError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, status FROM periods WHERE id = ?1",
                [id],
                period_from_row,
            )
            .optional()?)
    }

    fn list_periods(&self) -> Result<Vec<Period>, RepositoryError> {
        self.query_all(
            "SELECT id, name, status FROM periods ORDER BY id",
            [],
            period_from_row,
        )
    }

    fn set_period_status(&mut self, id: &str, status: PeriodStatus) -> Result<(), RepositoryError> {
        let changed = self.conn.execute(
            "UPDATE periods SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Period", id));
        }
        Ok(())
    }

    fn delete_period(&mut self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute("DELETE FROM periods WHERE id = ?1", [id])? > 0)
    }
}

impl RelationshipRepository for SqliteStore {
    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), RepositoryError> {
        self.conn
            .execute(
                "INSERT INTO relationships (student_email, parent_email) VALUES (?1, ?2)",
                params![relationship.student_email, relationship.parent_email],
            )
            .map_err(|e| {
                insert_error(
                    e,
                    "Relationship",
                    &format!("{} / {}", relationship.student_email, relationship.parent_email),
                )
            })?;
        Ok(())
    }

    fn list_relationships(&self) -> Result<Vec<Relationship>, RepositoryError> {
        self.query_all(
            "SELECT student_email, parent_email FROM relationships \
             ORDER BY student_email, parent_email",
            [],
            |row| {
                Ok(Relationship {
                    student_email: row.get(0)?,
                    parent_email: row.get(1)?,
                })
            },
        )
    }

    fn delete_relationship(
        &mut self,
        student_email: &str,
        parent_email: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute(
            "DELETE FROM relationships WHERE student_email = ?1 AND parent_email = ?2",
            [student_email, parent_email],
        )? > 0)
    }
}

impl OkrRepository for SqliteStore {
    fn insert_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO okrs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    OKR_COLUMNS
                ),
                params![
                    okr.id,
                    okr.student_email,
                    okr.period_id,
                    okr.objective,
                    okr.key_result,
                    okr.status.as_str(),
                    okr.target_value,
                    okr.actual_value,
                    okr.unit,
                    okr.delete_requested
                ],
            )
            .map_err(|e| insert_error(e, "Okr", &okr.id))?;
        Ok(())
    }

    fn update_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError> {
        let changed = self.conn.execute(
            "UPDATE okrs SET student_email = ?2, period_id = ?3, objective = ?4, \
             key_result = ?5, status = ?6, target_value = ?7, actual_value = ?8, unit = ?9, \
             delete_requested = ?10 WHERE id = ?1",
            params![
                okr.id,
                okr.student_email,
                okr.period_id,
                okr.objective,
                okr.key_result,
                okr.status.as_str(),
                okr.target_value,
                okr.actual_value,
                okr.unit,
                okr.delete_requested
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Okr", &okr.id));
        }
        Ok(())
    }

    fn find_okr(&self, id: &str) -> Result<Option<Okr>, RepositoryError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM okrs WHERE id = ?1", OKR_COLUMNS),
                [id],
                okr_from_row,
            )
            .optional()?)
    }

    fn list_okrs_for_student(
        &self,
        student_email: &str,
        period_id: Option<&str>,
    ) -> Result<Vec<Okr>, RepositoryError> {
        match period_id {
            Some(period_id) => self.query_all(
                &format!(
                    "SELECT {} FROM okrs WHERE student_email = ?1 AND period_id = ?2 ORDER BY rowid",
                    OKR_COLUMNS
                ),
                [student_email, period_id],
                okr_from_row,
            ),
            None => self.query_all(
                &format!(
                    "SELECT {} FROM okrs WHERE student_email = ?1 ORDER BY rowid",
                    OKR_COLUMNS
                ),
                [student_email],
                okr_from_row,
            ),
        }
    }

    fn delete_okr(&mut self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute("DELETE FROM okrs WHERE id = ?1", [id])? > 0)
    }
}

impl ReviewRepository for SqliteStore {
    fn upsert_review(&mut self, review: &FinalReview) -> Result<(), RepositoryError> {
        self.conn.execute(
            &format!(
                "INSERT INTO final_reviews ({}) VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT (student_email, period_id) DO UPDATE SET \
                 teacher_comment = excluded.teacher_comment, \
                 parent_comment = excluded.parent_comment, \
                 sent = excluded.sent",
                REVIEW_COLUMNS
            ),
            params![
                review.student_email,
                review.period_id,
                review.teacher_comment,
                review.parent_comment,
                review.sent
            ],
        )?;
        Ok(())
    }

    fn find_review(
        &self,
        student_email: &str,
        period_id: &str,
    ) -> Result<Option<FinalReview>, RepositoryError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM final_reviews WHERE student_email = ?1 AND period_id = ?2",
                    REVIEW_COLUMNS
                ),
                [student_email, period_id],
                review_from_row,
            )
            .optional()?)
    }

    fn list_reviews_for_student(&self, student_email: &str) -> Result<Vec<FinalReview>, RepositoryError> {
        self.query_all(
            &format!(
                "SELECT {} FROM final_reviews WHERE student_email = ?1 ORDER BY period_id",
                REVIEW_COLUMNS
            ),
            [student_email],
            review_from_row,
        )
    }

    fn list_reviews_for_period(&self, period_id: &str) -> Result<Vec<FinalReview>, RepositoryError> {
        self.query_all(
            &format!(
                "SELECT {} FROM final_reviews WHERE period_id = ?1 ORDER BY student_email",
                REVIEW_COLUMNS
            ),
            [period_id],
            review_from_row,
        )
    }

    fn delete_review(&mut self, student_email: &str, period_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.conn.execute(
            "DELETE FROM final_reviews WHERE student_email = ?1 AND period_id = ?2",
            [student_email, period_id],
        )? > 0)
    }
}

impl SchoolStore for SqliteStore {
    /// Same semantics as the default, in a single transaction
    fn rename_email(&mut self, old: &str, new: &str) -> Result<(), RepositoryError> {
        if !self.user_exists(old)? {
            return Err(RepositoryError::not_found("User", old));
        }
        if old == new {
            return Ok(());
        }
        if self.user_exists(new)? {
            return Err(RepositoryError::duplicate("User", new));
        }

        let tx = self.conn.transaction()?;
        tx.execute("UPDATE users SET email = ?2 WHERE email = ?1", [old, new])?;
        tx.execute(
            "UPDATE classes SET teacher_email = ?2 WHERE teacher_email = ?1",
            [old, new],
        )?;
        tx.execute(
            "UPDATE OR REPLACE relationships SET student_email = ?2 WHERE student_email = ?1",
            [old, new],
        )?;
        tx.execute(
            "UPDATE OR REPLACE relationships SET parent_email = ?2 WHERE parent_email = ?1",
            [old, new],
        )?;
        tx.execute(
            "UPDATE okrs SET student_email = ?2 WHERE student_email = ?1",
            [old, new],
        )?;
        tx.execute(
            "UPDATE OR REPLACE final_reviews SET student_email = ?2 WHERE student_email = ?1",
            [old, new],
        )?;
        tx.commit()?;

        tracing::debug!(old, new, "email renamed across tables");
        Ok(())
    }

    fn delete_user_cascade(&mut self, email: &str) -> Result<CascadeReport, RepositoryError> {
        let tx = self.conn.transaction()?;
        if tx.execute("DELETE FROM users WHERE email = ?1", [email])? == 0 {
            return Err(RepositoryError::not_found("User", email));
        }

        let report = CascadeReport {
            relationships: tx.execute(
                "DELETE FROM relationships WHERE student_email = ?1 OR parent_email = ?1",
                [email],
            )?,
            okrs: tx.execute("DELETE FROM okrs WHERE student_email = ?1", [email])?,
            reviews: tx.execute("DELETE FROM final_reviews WHERE student_email = ?1", [email])?,
            classes_unassigned: tx.execute(
                "UPDATE classes SET teacher_email = NULL WHERE teacher_email = ?1",
                [email],
            )?,
        };
        tx.commit()?;

        Ok(report)
    }
}
