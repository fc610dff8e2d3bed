//! Repository Traits - The "Ports" of the store
//!
//! These traits define HOW the application wants to persist rows,
//! but NOT how it's actually done. That's the adapter's job.
//!
//! ```text
//! Core                  │  Adapter
//! ──────────────────────┼────────────────────────
//! trait OkrRepository   │  SqliteStore
//!   fn insert_okr()     │  InMemoryStore
//!   fn find_okr()       │
//! ```

pub mod class_repository;
pub mod okr_repository;
pub mod period_repository;
pub mod relationship_repository;
pub mod review_repository;
pub mod user_repository;

pub use class_repository::ClassRepository;
pub use okr_repository::OkrRepository;
pub use period_repository::PeriodRepository;
pub use relationship_repository::RelationshipRepository;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;

use crate::error::RepositoryError;
use serde::Serialize;
use shared::Relationship;

/// Rows touched by a cascading user delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub relationships: usize,
    pub okrs: usize,
    pub reviews: usize,
    pub classes_unassigned: usize,
}

/// The whole school: every table plus the cross-table cascades.
///
/// The default cascade implementations are written against the per-table
/// ports; adapters with transactions override them to run atomically.
pub trait SchoolStore:
    UserRepository
    + ClassRepository
    + PeriodRepository
    + RelationshipRepository
    + OkrRepository
    + ReviewRepository
{
    /// Rewrite `old` to `new` in Users, Classes, Relationships, OKRs and
    /// FinalReviews.
    ///
    /// Fails with `NotFound` if no user has `old` and with `Duplicate` if a
    /// user already has `new`.
    fn rename_email(&mut self, old: &str, new: &str) -> Result<(), RepositoryError> {
        let mut user = self
            .find_user(old)?
            .ok_or_else(|| RepositoryError::not_found("User", old))?;
        if old == new {
            return Ok(());
        }
        if self.user_exists(new)? {
            return Err(RepositoryError::duplicate("User", new));
        }

        user.email = new.to_string();
        self.insert_user(&user)?;

        for mut class in self.list_classes_by_teacher(old)? {
            class.teacher_email = Some(new.to_string());
            self.update_class(&class)?;
        }

        for relationship in self.list_relationships()? {
            if !relationship.involves(old) {
                continue;
            }
            self.delete_relationship(&relationship.student_email, &relationship.parent_email)?;
            let renamed = Relationship {
                student_email: swap(&relationship.student_email, old, new),
                parent_email: swap(&relationship.parent_email, old, new),
            };
            match self.insert_relationship(&renamed) {
                Ok(()) | Err(RepositoryError::Duplicate { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        for mut okr in self.list_okrs_for_student(old, None)? {
            okr.student_email = new.to_string();
            self.update_okr(&okr)?;
        }

        for mut review in self.list_reviews_for_student(old)? {
            self.delete_review(old, &review.period_id)?;
            review.student_email = new.to_string();
            self.upsert_review(&review)?;
        }

        self.delete_user(old)?;
        tracing::debug!(old, new, "email renamed across tables");
        Ok(())
    }

    /// Remove a user and every row that names them.
    ///
    /// Classes they taught are kept with no teacher.
    fn delete_user_cascade(&mut self, email: &str) -> Result<CascadeReport, RepositoryError> {
        if !self.delete_user(email)? {
            return Err(RepositoryError::not_found("User", email));
        }

        let mut report = CascadeReport::default();

        for relationship in self.list_relationships()? {
            if relationship.involves(email)
                && self.delete_relationship(&relationship.student_email, &relationship.parent_email)?
            {
                report.relationships += 1;
            }
        }

        for okr in self.list_okrs_for_student(email, None)? {
            if self.delete_okr(&okr.id)? {
                report.okrs += 1;
            }
        }

        for review in self.list_reviews_for_student(email)? {
            if self.delete_review(email, &review.period_id)? {
                report.reviews += 1;
            }
        }

        for mut class in self.list_classes_by_teacher(email)? {
            class.teacher_email = None;
            self.update_class(&class)?;
            report.classes_unassigned += 1;
        }

        Ok(report)
    }
}

fn swap(value: &str, old: &str, new: &str) -> String {
    if value == old {
        new.to_string()
    } else {
        value.to_string()
    }
}

/// Behaviour every adapter must share; run from each adapter's tests.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use shared::{Class, FinalReview, Okr, OkrDraft, OkrStatus, Period, PeriodStatus, Role, User};

    fn okr(id: &str, student: &str, period: &str, actual: f64) -> Okr {
        Okr::from_draft(
            id,
            student,
            OkrDraft {
                period_id: period.to_string(),
                objective: format!("Objective {}", id),
                key_result: format!("Key result {}", id),
                target_value: 10.0,
                actual_value: actual,
                unit: "điểm".to_string(),
            },
        )
    }

    fn seed<S: SchoolStore>(store: &mut S) {
        store
            .insert_user(&User::new("gv@school.vn", "Cô Lan", Role::Teacher).with_password_hash("s$h"))
            .unwrap();
        store
            .insert_user(&User::new("hs@school.vn", "Minh", Role::Student).with_class("10A1"))
            .unwrap();
        store
            .insert_user(&User::new("ph@school.vn", "Bố Minh", Role::Parent))
            .unwrap();
        store
            .insert_class(&Class::new("10A1").with_teacher("gv@school.vn").with_size(40))
            .unwrap();
        store.insert_period(&Period::new("HK1", "Học kỳ 1")).unwrap();
        store
            .insert_relationship(&Relationship::new("hs@school.vn", "ph@school.vn"))
            .unwrap();
        store.insert_okr(&okr("o1", "hs@school.vn", "HK1", 5.0)).unwrap();
        store.insert_okr(&okr("o2", "hs@school.vn", "HK1", 9.0)).unwrap();
        let mut review = FinalReview::new("hs@school.vn", "HK1");
        review.teacher_comment = "Tiến bộ tốt".to_string();
        store.upsert_review(&review).unwrap();
    }

    pub fn users_are_unique<S: SchoolStore>(store: &mut S) {
        let user = User::new("a@school.vn", "A", Role::Student);
        store.insert_user(&user).unwrap();

        let again = store.insert_user(&user);
        assert!(matches!(again, Err(RepositoryError::Duplicate { .. })));
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    pub fn user_round_trip<S: SchoolStore>(store: &mut S) {
        let user = User::new("b@school.vn", "B", Role::Student)
            .with_class("10A2")
            .with_password_hash("salt$digest");
        store.insert_user(&user).unwrap();

        let found = store.find_user("b@school.vn").unwrap().unwrap();
        assert_eq!(found, user);
        assert!(store.find_user("nobody@school.vn").unwrap().is_none());

        let mut changed = found.clone();
        changed.name = "B2".to_string();
        changed.class_name = None;
        store.update_user(&changed).unwrap();
        assert_eq!(store.find_user("b@school.vn").unwrap().unwrap(), changed);

        let missing = store.update_user(&User::new("ghost@school.vn", "G", Role::Parent));
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }

    pub fn listings_filter_and_order<S: SchoolStore>(store: &mut S) {
        seed(store);
        store
            .insert_user(&User::new("an@school.vn", "An", Role::Student).with_class("10A1"))
            .unwrap();

        let emails: Vec<_> = store.list_users().unwrap().into_iter().map(|u| u.email).collect();
        assert_eq!(
            emails,
            vec!["an@school.vn", "gv@school.vn", "hs@school.vn", "ph@school.vn"]
        );
        assert_eq!(store.list_users_by_role(Role::Student).unwrap().len(), 2);
        assert_eq!(store.list_users_by_class("10A1").unwrap().len(), 2);
        assert_eq!(store.list_classes_by_teacher("gv@school.vn").unwrap().len(), 1);
        assert_eq!(store.list_children_of("ph@school.vn").unwrap().len(), 1);
        assert_eq!(store.list_parents_of("hs@school.vn").unwrap().len(), 1);

        let ids: Vec<_> = store
            .list_okrs_for_student("hs@school.vn", Some("HK1"))
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["o1", "o2"]);
        assert!(store
            .list_okrs_for_student("hs@school.vn", Some("HK2"))
            .unwrap()
            .is_empty());
    }

    pub fn deleted_rows_disappear<S: SchoolStore>(store: &mut S) {
        seed(store);

        assert!(store.delete_okr("o1").unwrap());
        assert!(!store.delete_okr("o1").unwrap());
        assert!(store.find_okr("o1").unwrap().is_none());
        assert_eq!(store.list_okrs_for_student("hs@school.vn", None).unwrap().len(), 1);

        assert!(store.delete_relationship("hs@school.vn", "ph@school.vn").unwrap());
        assert!(store.list_relationships().unwrap().is_empty());

        assert!(store.delete_period("HK1").unwrap());
        assert!(store.list_periods().unwrap().is_empty());

        assert!(store.delete_class("10A1").unwrap());
        assert!(store.find_class("10A1").unwrap().is_none());
    }

    pub fn period_status_and_okr_update<S: SchoolStore>(store: &mut S) {
        seed(store);

        store.set_period_status("HK1", PeriodStatus::Closed).unwrap();
        assert!(!store.find_period("HK1").unwrap().unwrap().is_open());
        assert!(matches!(
            store.set_period_status("HK9", PeriodStatus::Open),
            Err(RepositoryError::NotFound { .. })
        ));

        let mut o = store.find_okr("o2").unwrap().unwrap();
        o.status = OkrStatus::Approved;
        o.delete_requested = true;
        o.actual_value = 10.0;
        store.update_okr(&o).unwrap();

        let found = store.find_okr("o2").unwrap().unwrap();
        assert_eq!(found, o);
        assert_eq!(store.list_delete_requests("hs@school.vn").unwrap().len(), 1);
    }

    pub fn review_upsert_keeps_one_row<S: SchoolStore>(store: &mut S) {
        seed(store);

        let mut review = store.find_review("hs@school.vn", "HK1").unwrap().unwrap();
        review.parent_comment = "Cảm ơn cô".to_string();
        store.upsert_review(&review).unwrap();
        store.upsert_review(&review).unwrap();

        let reviews = store.list_reviews_for_period("HK1").unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].teacher_comment, "Tiến bộ tốt");
        assert_eq!(reviews[0].parent_comment, "Cảm ơn cô");
    }

    pub fn rename_email_cascades<S: SchoolStore>(store: &mut S) {
        seed(store);

        store.rename_email("hs@school.vn", "minh@school.vn").unwrap();
        store.rename_email("gv@school.vn", "lan@school.vn").unwrap();

        assert!(store.find_user("hs@school.vn").unwrap().is_none());
        let student = store.find_user("minh@school.vn").unwrap().unwrap();
        assert_eq!(student.class_name.as_deref(), Some("10A1"));

        assert!(store.find_class("10A1").unwrap().unwrap().is_taught_by("lan@school.vn"));
        assert_eq!(
            store.list_relationships().unwrap(),
            vec![Relationship::new("minh@school.vn", "ph@school.vn")]
        );
        assert_eq!(store.list_okrs_for_student("minh@school.vn", None).unwrap().len(), 2);
        assert!(store.list_okrs_for_student("hs@school.vn", None).unwrap().is_empty());
        assert!(store.find_review("minh@school.vn", "HK1").unwrap().is_some());
        assert!(store.find_review("hs@school.vn", "HK1").unwrap().is_none());
    }

    pub fn rename_email_rejects_taken_or_missing<S: SchoolStore>(store: &mut S) {
        seed(store);

        let taken = store.rename_email("hs@school.vn", "ph@school.vn");
        assert!(matches!(taken, Err(RepositoryError::Duplicate { .. })));
        // Nothing moved
        assert_eq!(store.list_okrs_for_student("hs@school.vn", None).unwrap().len(), 2);

        let missing = store.rename_email("ghost@school.vn", "new@school.vn");
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }

    pub fn delete_user_cascades<S: SchoolStore>(store: &mut S) {
        seed(store);

        let report = store.delete_user_cascade("hs@school.vn").unwrap();
        assert_eq!(
            report,
            CascadeReport {
                relationships: 1,
                okrs: 2,
                reviews: 1,
                classes_unassigned: 0,
            }
        );
        assert!(store.list_relationships().unwrap().is_empty());
        assert!(store.find_okr("o1").unwrap().is_none());

        let report = store.delete_user_cascade("gv@school.vn").unwrap();
        assert_eq!(report.classes_unassigned, 1);
        assert!(store.find_class("10A1").unwrap().unwrap().teacher_email.is_none());

        assert!(matches!(
            store.delete_user_cascade("gv@school.vn"),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
