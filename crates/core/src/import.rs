//! Batch import of accounts and parent links
//!
//! A row is skipped when its key already exists in the store or appeared
//! earlier in the same batch, so running the same import twice creates
//! nothing the second time.

use rbac::Permission;
use roster::{BatchDedup, ImportReport, ParentRow, UserRow};
use shared::{OkrError, Result, Role};
use store::{RepositoryError, SchoolStore};

use crate::admin::relationship_key;
use crate::okr_core::OkrCore;

impl<S: SchoolStore> OkrCore<S> {
    pub fn import_users(&mut self, token: &str, rows: &[UserRow]) -> Result<ImportReport> {
        self.import_users_with(token, rows, |_| {})
    }

    /// Import accounts, calling `on_row` after each row is handled
    pub fn import_users_with<F>(
        &mut self,
        token: &str,
        rows: &[UserRow],
        mut on_row: F,
    ) -> Result<ImportReport>
    where
        F: FnMut(usize),
    {
        let admin = self.authorize(token, Permission::ImportRoster)?;
        let mut report = ImportReport::default();
        let mut dedup = BatchDedup::new();

        for (index, row) in rows.iter().enumerate() {
            let key = row.key();
            match row.to_user() {
                Err(e) => report.record_invalid(index + 1, key, e),
                Ok(_) if !dedup.first_time(&key) => report.skipped_duplicates.push(key),
                Ok(user) => match self.store.insert_user(&user) {
                    Ok(()) => report.created.push(key),
                    Err(RepositoryError::Duplicate { .. }) => report.skipped_duplicates.push(key),
                    Err(e) => return Err(e.into()),
                },
            }
            on_row(index + 1);
        }

        tracing::info!(summary = %report.summary(), "users imported");
        self.record(&admin, "import-users", Some(&report.summary()));
        Ok(report)
    }

    pub fn import_relationships(&mut self, token: &str, rows: &[ParentRow]) -> Result<ImportReport> {
        self.import_relationships_with(token, rows, |_| {})
    }

    /// Import student / parent links, creating missing parent accounts
    pub fn import_relationships_with<F>(
        &mut self,
        token: &str,
        rows: &[ParentRow],
        mut on_row: F,
    ) -> Result<ImportReport>
    where
        F: FnMut(usize),
    {
        let admin = self.authorize(token, Permission::ImportRoster)?;
        let mut report = ImportReport::default();
        let mut dedup = BatchDedup::new();

        for (index, row) in rows.iter().enumerate() {
            let key = row.key();
            match self.import_link(row, &mut dedup, &mut report) {
                Ok(()) => {}
                Err(OkrError::Storage(message)) => return Err(OkrError::Storage(message)),
                Err(e) => report.record_invalid(index + 1, key, e),
            }
            on_row(index + 1);
        }

        tracing::info!(summary = %report.summary(), "parent links imported");
        self.record(&admin, "import-relationships", Some(&report.summary()));
        Ok(report)
    }

    fn import_link(
        &mut self,
        row: &ParentRow,
        dedup: &mut BatchDedup,
        report: &mut ImportReport,
    ) -> Result<()> {
        let relationship = row.to_relationship()?;
        let key = relationship_key(&relationship);
        if !dedup.first_time(&key) {
            report.skipped_duplicates.push(key);
            return Ok(());
        }

        self.require_role(&relationship.student_email, Role::Student)?;
        match self.store.find_user(&relationship.parent_email)? {
            Some(parent) if parent.is(Role::Parent) => {}
            Some(_) => {
                return Err(OkrError::validation(format!(
                    "'{}' is not a parent account",
                    relationship.parent_email
                )))
            }
            None => {
                let parent = row.to_parent_user()?;
                self.store.insert_user(&parent)?;
                report.accounts_created.push(parent.email);
            }
        }

        match self.store.insert_relationship(&relationship) {
            Ok(()) => report.created.push(key),
            Err(RepositoryError::Duplicate { .. }) => report.skipped_duplicates.push(key),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{core, login};
    use roster::{ParentRow, UserRow};
    use shared::OkrError;

    fn user_row(email: &str, role: &str) -> UserRow {
        UserRow {
            email: email.to_string(),
            password: "pw".to_string(),
            name: "Học sinh".to_string(),
            role: role.to_string(),
            class_name: Some("10A1".to_string()),
        }
    }

    fn parent_row(student: &str, parent: &str) -> ParentRow {
        ParentRow {
            student_email: student.to_string(),
            parent_email: parent.to_string(),
            parent_name: Some("Mẹ An".to_string()),
            password: Some("pw".to_string()),
        }
    }

    // ============== User Import Tests ==============

    #[test]
    fn test_import_users_dedup_and_invalid() {
        let mut core = core();
        let token = login(&mut core, "admin@school.vn");

        let rows = vec![
            user_row("a@school.vn", "student"),
            user_row("A@School.vn", "student"),
            user_row("hs@school.vn", "student"),
            user_row("broken", "student"),
            user_row("b@school.vn", "principal"),
            user_row("c@school.vn", "phụ huynh"),
        ];

        let mut seen = 0;
        let report = core
            .import_users_with(&token, &rows, |n| seen = n)
            .unwrap();
        assert_eq!(seen, 6);

        assert_eq!(report.created, vec!["a@school.vn", "c@school.vn"]);
        assert_eq!(report.skipped_duplicates, vec!["a@school.vn", "hs@school.vn"]);
        assert_eq!(report.invalid.len(), 2);
        assert_eq!(report.invalid[0].row, 4);
        assert!(core.authenticate("c@school.vn", "pw").is_ok());
    }

    #[test]
    fn test_import_users_twice_creates_nothing_new() {
        let mut core = core();
        let token = login(&mut core, "admin@school.vn");
        let rows = vec![user_row("a@school.vn", "student"), user_row("b@school.vn", "hs")];

        assert_eq!(core.import_users(&token, &rows).unwrap().created.len(), 2);

        let again = core.import_users(&token, &rows).unwrap();
        assert!(again.created.is_empty());
        assert_eq!(again.skipped_duplicates.len(), 2);
    }

    #[test]
    fn test_import_requires_admin() {
        let mut core = core();
        let token = login(&mut core, "gv@school.vn");

        assert!(matches!(
            core.import_users(&token, &[user_row("a@school.vn", "student")]),
            Err(OkrError::PermissionDenied(_))
        ));
    }

    // ============== Relationship Import Tests ==============

    #[test]
    fn test_import_relationships() {
        let mut core = core();
        let token = login(&mut core, "admin@school.vn");

        let rows = vec![
            parent_row("hs2@school.vn", "me.an@school.vn"),
            parent_row("HS2@school.vn", "me.an@school.vn"),
            parent_row("hs@school.vn", "ph@school.vn"),
            parent_row("ghost@school.vn", "ph@school.vn"),
            parent_row("hs2@school.vn", "gv@school.vn"),
        ];

        let report = core.import_relationships(&token, &rows).unwrap();
        assert_eq!(report.created, vec!["hs2@school.vn / me.an@school.vn"]);
        assert_eq!(report.accounts_created, vec!["me.an@school.vn"]);
        assert_eq!(report.skipped_duplicates.len(), 2);
        assert_eq!(report.invalid.len(), 2);

        // The new parent can sign in and sees the child
        let parent = login_with(&mut core, "me.an@school.vn", "pw");
        assert_eq!(core.children(&parent).unwrap()[0].email, "hs2@school.vn");

        let again = core.import_relationships(&token, &rows[..1]).unwrap();
        assert!(again.created.is_empty());
        assert!(again.accounts_created.is_empty());
    }

    #[test]
    fn test_import_relationship_missing_parent_without_password() {
        let mut core = core();
        let token = login(&mut core, "admin@school.vn");

        let mut row = parent_row("hs2@school.vn", "new@school.vn");
        row.password = None;

        let report = core.import_relationships(&token, &[row]).unwrap();
        assert_eq!(report.invalid.len(), 1);
        assert!(report.invalid[0].reason.contains("no password"));
    }

    fn login_with(core: &mut crate::OkrCore<store::InMemoryStore>, email: &str, password: &str) -> String {
        core.login(email, password).unwrap().token
    }
}
