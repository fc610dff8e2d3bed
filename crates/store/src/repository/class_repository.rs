//! Class Repository - Homeroom classes keyed by name

use crate::error::RepositoryError;
use shared::Class;

pub trait ClassRepository {
    /// Insert a new class; fails with `Duplicate` if the name is taken
    fn insert_class(&mut self, class: &Class) -> Result<(), RepositoryError>;

    /// Overwrite an existing class (matched by name)
    fn update_class(&mut self, class: &Class) -> Result<(), RepositoryError>;

    fn find_class(&self, name: &str) -> Result<Option<Class>, RepositoryError>;

    /// All classes, ordered by name
    fn list_classes(&self) -> Result<Vec<Class>, RepositoryError>;

    /// Classes whose homeroom teacher is `teacher_email`
    fn list_classes_by_teacher(&self, teacher_email: &str) -> Result<Vec<Class>, RepositoryError> {
        Ok(self
            .list_classes()?
            .into_iter()
            .filter(|c| c.is_taught_by(teacher_email))
            .collect())
    }

    fn delete_class(&mut self, name: &str) -> Result<bool, RepositoryError>;
}
