//! Relationship Repository - Student / parent links

use crate::error::RepositoryError;
use shared::Relationship;

pub trait RelationshipRepository {
    /// Link a student and a parent; fails with `Duplicate` if already linked
    fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), RepositoryError>;

    /// All links, ordered by (student, parent)
    fn list_relationships(&self) -> Result<Vec<Relationship>, RepositoryError>;

    /// Links naming `student_email` as the student
    fn list_parents_of(&self, student_email: &str) -> Result<Vec<Relationship>, RepositoryError> {
        Ok(self
            .list_relationships()?
            .into_iter()
            .filter(|r| r.student_email == student_email)
            .collect())
    }

    /// Links naming `parent_email` as the parent
    fn list_children_of(&self, parent_email: &str) -> Result<Vec<Relationship>, RepositoryError> {
        Ok(self
            .list_relationships()?
            .into_iter()
            .filter(|r| r.parent_email == parent_email)
            .collect())
    }

    fn delete_relationship(
        &mut self,
        student_email: &str,
        parent_email: &str,
    ) -> Result<bool, RepositoryError>;
}
