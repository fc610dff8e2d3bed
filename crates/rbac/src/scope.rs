//! Scope - Which students and classes a user can reach
//!
//! Permissions say what a role may do; scope says to whom. A teacher
//! reaches the students of the classes they teach, a parent reaches linked
//! children, a student reaches only themselves and an admin reaches everyone.

use shared::{Class, PermissionDeniedError, Relationship, Role, User};
use std::collections::BTreeSet;

/// The rows that define what one user can reach
#[derive(Debug, Clone)]
pub struct Scope {
    email: String,
    role: Role,
    classes: BTreeSet<String>,
    children: BTreeSet<String>,
}

impl Scope {
    /// Build the scope of `actor` from the classes and relationships naming them
    pub fn new(actor: &User, classes: &[Class], relationships: &[Relationship]) -> Self {
        let classes = match actor.role {
            Role::Teacher => classes
                .iter()
                .filter(|c| c.is_taught_by(&actor.email))
                .map(|c| c.name.clone())
                .collect(),
            _ => BTreeSet::new(),
        };
        let children = match actor.role {
            Role::Parent => relationships
                .iter()
                .filter(|r| r.parent_email == actor.email)
                .map(|r| r.student_email.clone())
                .collect(),
            _ => BTreeSet::new(),
        };

        Self {
            email: actor.email.clone(),
            role: actor.role,
            classes,
            children,
        }
    }

    /// Classes taught by the actor (teachers only)
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|s| s.as_str())
    }

    /// Linked children (parents only)
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|s| s.as_str())
    }

    pub fn reaches_class(&self, class_name: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Teacher => self.classes.contains(class_name),
            Role::Student | Role::Parent => false,
        }
    }

    pub fn reaches_student(&self, student: &User) -> bool {
        if !student.is(Role::Student) {
            return false;
        }
        match self.role {
            Role::Admin => true,
            Role::Teacher => student
                .class_name
                .as_deref()
                .is_some_and(|c| self.classes.contains(c)),
            Role::Student => student.email == self.email,
            Role::Parent => self.children.contains(&student.email),
        }
    }

    pub fn check_class(&self, action: &str, class_name: &str) -> Result<(), PermissionDeniedError> {
        if self.reaches_class(class_name) {
            return Ok(());
        }
        Err(self.denied(action, format!("class '{}' is outside your scope", class_name)))
    }

    pub fn check_student(&self, action: &str, student: &User) -> Result<(), PermissionDeniedError> {
        if self.reaches_student(student) {
            return Ok(());
        }
        Err(self.denied(action, format!("student '{}' is outside your scope", student.email)))
    }

    fn denied(&self, action: &str, reason: String) -> PermissionDeniedError {
        PermissionDeniedError {
            action: action.to_string(),
            role: self.role.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<Class> {
        vec![
            Class::new("10A1").with_teacher("gv@school.vn"),
            Class::new("10A2").with_teacher("khac@school.vn"),
        ]
    }

    fn relationships() -> Vec<Relationship> {
        vec![
            Relationship::new("hs@school.vn", "ph@school.vn"),
            Relationship::new("ban@school.vn", "khac@school.vn"),
        ]
    }

    fn student(email: &str, class: &str) -> User {
        User::new(email, "HS", Role::Student).with_class(class)
    }

    fn scope_of(email: &str, role: Role) -> Scope {
        Scope::new(&User::new(email, "X", role), &classes(), &relationships())
    }

    #[test]
    fn test_teacher_reaches_own_class_only() {
        let scope = scope_of("gv@school.vn", Role::Teacher);

        assert_eq!(scope.classes().collect::<Vec<_>>(), vec!["10A1"]);
        assert!(scope.reaches_class("10A1"));
        assert!(!scope.reaches_class("10A2"));
        assert!(scope.reaches_student(&student("hs@school.vn", "10A1")));
        assert!(!scope.reaches_student(&student("ban@school.vn", "10A2")));
    }

    #[test]
    fn test_parent_reaches_linked_children() {
        let scope = scope_of("ph@school.vn", Role::Parent);

        assert_eq!(scope.children().collect::<Vec<_>>(), vec!["hs@school.vn"]);
        assert!(scope.reaches_student(&student("hs@school.vn", "10A1")));
        assert!(!scope.reaches_student(&student("ban@school.vn", "10A1")));
        assert!(!scope.reaches_class("10A1"));
    }

    #[test]
    fn test_student_reaches_self() {
        let scope = scope_of("hs@school.vn", Role::Student);

        assert!(scope.reaches_student(&student("hs@school.vn", "10A1")));
        assert!(!scope.reaches_student(&student("ban@school.vn", "10A1")));
    }

    #[test]
    fn test_admin_reaches_everything() {
        let scope = scope_of("admin@school.vn", Role::Admin);

        assert!(scope.reaches_class("anything"));
        assert!(scope.reaches_student(&student("ban@school.vn", "10A2")));
    }

    #[test]
    fn test_non_students_are_never_reached() {
        let scope = scope_of("admin@school.vn", Role::Admin);
        let teacher = User::new("gv@school.vn", "GV", Role::Teacher);
        assert!(!scope.reaches_student(&teacher));
    }

    #[test]
    fn test_check_student_error() {
        let scope = scope_of("gv@school.vn", Role::Teacher);

        let err = scope
            .check_student("review-okrs", &student("ban@school.vn", "10A2"))
            .unwrap_err();
        assert_eq!(err.action, "review-okrs");
        assert_eq!(err.role, "teacher");
        assert!(err.reason.contains("ban@school.vn"));
    }
}
