//! In-Memory Store
//!
//! Simple in-memory implementation of every repository trait.
//! Useful for testing and development.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shared::{Class, FinalReview, Okr, Period, PeriodStatus, Relationship, User};

use crate::error::RepositoryError;
use crate::repository::{
    ClassRepository, OkrRepository, PeriodRepository, RelationshipRepository, ReviewRepository,
    SchoolStore, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, User>,
    classes: BTreeMap<String, Class>,
    periods: BTreeMap<String, Period>,
    relationships: BTreeSet<(String, String)>,
    /// Kept in insertion order
    okrs: Vec<Okr>,
    reviews: BTreeMap<(String, String), FinalReview>,
}

/// In-memory School Store
///
/// Thread-safe implementation using RwLock. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::persistence("Failed to acquire read lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::persistence("Failed to acquire write lock"))
    }
}

impl UserRepository for InMemoryStore {
    fn insert_user(&mut self, user: &User) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.email) {
            return Err(RepositoryError::duplicate("User", &user.email));
        }
        tables.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        match tables.users.get_mut(&user.email) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("User", &user.email)),
        }
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(email).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn delete_user(&mut self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.write()?.users.remove(email).is_some())
    }
}

impl ClassRepository for InMemoryStore {
    fn insert_class(&mut self, class: &Class) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.classes.contains_key(&class.name) {
            return Err(RepositoryError::duplicate("Class", &class.name));
        }
        tables.classes.insert(class.name.clone(), class.clone());
        Ok(())
    }

    fn update_class(&mut self, class: &Class) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        match tables.classes.get_mut(&class.name) {
            Some(existing) => {
                *existing = class.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Class", &class.name)),
        }
    }

    fn find_class(&self, name: &str) -> Result<Option<Class>, RepositoryError> {
        Ok(self.read()?.classes.get(name).cloned())
    }

    fn list_classes(&self) -> Result<Vec<Class>, RepositoryError> {
        Ok(self.read()?.classes.values().cloned().collect())
    }

    fn delete_class(&mut self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.write()?.classes.remove(name).is_some())
    }
}

impl PeriodRepository for InMemoryStore {
    fn insert_period(&mut self, period: &Period) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.periods.contains_key(&period.id) {
            return Err(RepositoryError::duplicate("Period", &period.id));
        }
        tables.periods.insert(period.id.clone(), period.clone());
        Ok(())
    }

    fn find_period(&self, id: &str) -> Result<Option<Period>, RepositoryError> {
        Ok(self.read()?.periods.get(id).cloned())
    }

    fn list_periods(&self) -> Result<Vec<Period>, RepositoryError> {
        Ok(self.read()?.periods.values().cloned().collect())
    }

    fn set_period_status(&mut self, id: &str, status: PeriodStatus) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        let period = tables
            .periods
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found("Period", id))?;
        period.status = status;
        Ok(())
    }

    fn delete_period(&mut self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.write()?.periods.remove(id).is_some())
    }
}

impl RelationshipRepository for InMemoryStore {
    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), RepositoryError> {
        let key = (
            relationship.student_email.clone(),
            relationship.parent_email.clone(),
        );
        if !self.write()?.relationships.insert(key) {
            return Err(RepositoryError::duplicate(
                "Relationship",
                format!("{} / {}", relationship.student_email, relationship.parent_email),
            ));
        }
        Ok(())
    }

    fn list_relationships(&self) -> Result<Vec<Relationship>, RepositoryError> {
        Ok(self
            .read()?
            .relationships
            .iter()
            .map(|(student, parent)| Relationship {
                student_email: student.clone(),
                parent_email: parent.clone(),
            })
            .collect())
    }

    fn delete_relationship(
        &mut self,
        student_email: &str,
        parent_email: &str,
    ) -> Result<bool, RepositoryError> {
        let key = (student_email.to_string(), parent_email.to_string());
        Ok(self.write()?.relationships.remove(&key))
    }
}

impl OkrRepository for InMemoryStore {
    fn insert_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.okrs.iter().any(|o| o.id == okr.id) {
            return Err(RepositoryError::duplicate("Okr", &okr.id));
        }
        tables.okrs.push(okr.clone());
        Ok(())
    }

    fn update_okr(&mut self, okr: &Okr) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        match tables.okrs.iter_mut().find(|o| o.id == okr.id) {
            Some(existing) => {
                *existing = okr.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Okr", &okr.id)),
        }
    }

    fn find_okr(&self, id: &str) -> Result<Option<Okr>, RepositoryError> {
        Ok(self.read()?.okrs.iter().find(|o| o.id == id).cloned())
    }

    fn list_okrs_for_student(
        &self,
        student_email: &str,
        period_id: Option<&str>,
    ) -> Result<Vec<Okr>, RepositoryError> {
        Ok(self
            .read()?
            .okrs
            .iter()
            .filter(|o| o.student_email == student_email)
            .filter(|o| period_id.map_or(true, |p| o.period_id == p))
            .cloned()
            .collect())
    }

    fn delete_okr(&mut self, id: &str) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        let before = tables.okrs.len();
        tables.okrs.retain(|o| o.id != id);
        Ok(tables.okrs.len() != before)
    }
}

impl ReviewRepository for InMemoryStore {
    fn upsert_review(&mut self, review: &FinalReview) -> Result<(), RepositoryError> {
        let key = (review.student_email.clone(), review.period_id.clone());
        self.write()?.reviews.insert(key, review.clone());
        Ok(())
    }

    fn find_review(
        &self,
        student_email: &str,
        period_id: &str,
    ) -> Result<Option<FinalReview>, RepositoryError> {
        let key = (student_email.to_string(), period_id.to_string());
        Ok(self.read()?.reviews.get(&key).cloned())
    }

    fn list_reviews_for_student(&self, student_email: &str) -> Result<Vec<FinalReview>, RepositoryError> {
        Ok(self
            .read()?
            .reviews
            .values()
            .filter(|r| r.student_email == student_email)
            .cloned()
            .collect())
    }

    fn list_reviews_for_period(&self, period_id: &str) -> Result<Vec<FinalReview>, RepositoryError> {
        Ok(self
            .read()?
            .reviews
            .values()
            .filter(|r| r.period_id == period_id)
            .cloned()
            .collect())
    }

    fn delete_review(&mut self, student_email: &str, period_id: &str) -> Result<bool, RepositoryError> {
        let key = (student_email.to_string(), period_id.to_string());
        Ok(self.write()?.reviews.remove(&key).is_some())
    }
}

// Cascades use the default per-table implementations.
impl SchoolStore for InMemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::contract;

    #[test]
    fn test_users_are_unique() {
        contract::users_are_unique(&mut InMemoryStore::new());
    }

    #[test]
    fn test_user_round_trip() {
        contract::user_round_trip(&mut InMemoryStore::new());
    }

    #[test]
    fn test_listings_filter_and_order() {
        contract::listings_filter_and_order(&mut InMemoryStore::new());
    }

    #[test]
    fn test_deleted_rows_disappear() {
        contract::deleted_rows_disappear(&mut InMemoryStore::new());
    }

    #[test]
    fn test_period_status_and_okr_update() {
        contract::period_status_and_okr_update(&mut InMemoryStore::new());
    }

    #[test]
    fn test_review_upsert_keeps_one_row() {
        contract::review_upsert_keeps_one_row(&mut InMemoryStore::new());
    }

    #[test]
    fn test_rename_email_cascades() {
        contract::rename_email_cascades(&mut InMemoryStore::new());
    }

    #[test]
    fn test_rename_email_rejects_taken_or_missing() {
        contract::rename_email_rejects_taken_or_missing(&mut InMemoryStore::new());
    }

    #[test]
    fn test_delete_user_cascades() {
        contract::delete_user_cascades(&mut InMemoryStore::new());
    }

    #[test]
    fn test_clones_share_tables() {
        let mut store = InMemoryStore::new();
        let view = store.clone();

        store
            .insert_period(&Period::new("HK2", "Học kỳ 2"))
            .unwrap();

        assert!(view.find_period("HK2").unwrap().is_some());
    }
}
