//! RoleManager - Role permissions and permission checking

use crate::permission::Permission;
use shared::{PermissionDeniedError, Role, User};
use std::collections::{BTreeSet, HashMap};

/// RoleManager holds the permission set of each role
#[derive(Debug, Clone)]
pub struct RoleManager {
    grants: HashMap<Role, BTreeSet<Permission>>,
}

impl RoleManager {
    /// Create a RoleManager with no grants at all
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// The standard school matrix
    pub fn school_defaults() -> Self {
        use Permission::*;

        let mut manager = Self::new();
        manager.grant_all(
            Role::Admin,
            [
                ManageUsers,
                ManageClasses,
                ManagePeriods,
                ManageRelationships,
                ImportRoster,
                ViewAudit,
                ViewClassStudents,
                ViewClassSummary,
                ViewStudentProgress,
                ListPeriods,
                ChangeOwnPassword,
            ],
        );
        manager.grant_all(
            Role::Teacher,
            [
                ViewClassStudents,
                ReviewOkrs,
                ResolveDeleteRequests,
                WriteTeacherComment,
                SendReview,
                ViewClassSummary,
                ViewStudentProgress,
                ListPeriods,
                ChangeOwnPassword,
            ],
        );
        manager.grant_all(
            Role::Student,
            [
                CreateOkr,
                EditOwnOkr,
                RequestOkrDeletion,
                ViewStudentProgress,
                ListPeriods,
                ChangeOwnPassword,
            ],
        );
        manager.grant_all(
            Role::Parent,
            [
                ViewChildren,
                WriteParentComment,
                ViewStudentProgress,
                ListPeriods,
                ChangeOwnPassword,
            ],
        );
        manager
    }

    /// Grant one permission to a role
    pub fn grant(&mut self, role: Role, permission: Permission) {
        self.grants.entry(role).or_default().insert(permission);
    }

    /// Grant several permissions to a role
    pub fn grant_all(&mut self, role: Role, permissions: impl IntoIterator<Item = Permission>) {
        self.grants.entry(role).or_default().extend(permissions);
    }

    /// Revoke a permission, returning whether it was granted
    pub fn revoke(&mut self, role: Role, permission: Permission) -> bool {
        self.grants
            .get_mut(&role)
            .map(|set| set.remove(&permission))
            .unwrap_or(false)
    }

    /// Permissions of a role, in declaration order
    pub fn permissions_for(&self, role: Role) -> Vec<Permission> {
        self.grants
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Roles holding a permission
    pub fn roles_with(&self, permission: Permission) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.is_allowed(*role, permission))
            .collect()
    }

    pub fn is_allowed(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
    }

    /// Check that `user` holds `permission`
    pub fn check(&self, user: &User, permission: Permission) -> Result<(), PermissionDeniedError> {
        if self.is_allowed(user.role, permission) {
            return Ok(());
        }

        let allowed: Vec<&str> = self
            .roles_with(permission)
            .into_iter()
            .map(|r| r.as_str())
            .collect();
        let reason = if allowed.is_empty() {
            "no role holds this permission".to_string()
        } else {
            format!("requires role {}", allowed.join(" or "))
        };

        Err(PermissionDeniedError {
            action: permission.to_string(),
            role: user.role.to_string(),
            reason,
        })
    }
}

impl Default for RoleManager {
    fn default() -> Self {
        Self::school_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new(format!("{}@school.vn", role.as_str()), "Test", role)
    }

    // ============== Default Matrix Tests ==============

    #[test]
    fn test_admin_manages_but_does_not_review() {
        let manager = RoleManager::school_defaults();

        assert!(manager.is_allowed(Role::Admin, Permission::ManageUsers));
        assert!(manager.is_allowed(Role::Admin, Permission::ImportRoster));
        assert!(manager.is_allowed(Role::Admin, Permission::ViewAudit));
        assert!(!manager.is_allowed(Role::Admin, Permission::ReviewOkrs));
        assert!(!manager.is_allowed(Role::Admin, Permission::CreateOkr));
    }

    #[test]
    fn test_teacher_permissions() {
        let manager = RoleManager::school_defaults();

        assert!(manager.is_allowed(Role::Teacher, Permission::ReviewOkrs));
        assert!(manager.is_allowed(Role::Teacher, Permission::SendReview));
        assert!(!manager.is_allowed(Role::Teacher, Permission::ManageUsers));
        assert!(!manager.is_allowed(Role::Teacher, Permission::WriteParentComment));
    }

    #[test]
    fn test_student_and_parent_permissions() {
        let manager = RoleManager::school_defaults();

        assert!(manager.is_allowed(Role::Student, Permission::CreateOkr));
        assert!(!manager.is_allowed(Role::Student, Permission::ReviewOkrs));
        assert!(manager.is_allowed(Role::Parent, Permission::WriteParentComment));
        assert!(!manager.is_allowed(Role::Parent, Permission::CreateOkr));
    }

    #[test]
    fn test_everyone_can_change_password() {
        let manager = RoleManager::school_defaults();
        assert_eq!(manager.roles_with(Permission::ChangeOwnPassword), Role::ALL.to_vec());
    }

    // ============== Check Tests ==============

    #[test]
    fn test_check_denied_names_required_role() {
        let manager = RoleManager::school_defaults();

        let err = manager
            .check(&user(Role::Student), Permission::ReviewOkrs)
            .unwrap_err();
        assert_eq!(err.action, "review-okrs");
        assert_eq!(err.role, "student");
        assert_eq!(err.reason, "requires role teacher");
    }

    #[test]
    fn test_check_with_empty_manager() {
        let manager = RoleManager::new();

        let err = manager.check(&user(Role::Admin), Permission::ManageUsers).unwrap_err();
        assert_eq!(err.reason, "no role holds this permission");
        assert!(manager.permissions_for(Role::Admin).is_empty());
    }

    // ============== Grant / Revoke Tests ==============

    #[test]
    fn test_grant_and_revoke() {
        let mut manager = RoleManager::school_defaults();

        manager.grant(Role::Admin, Permission::ReviewOkrs);
        assert!(manager.check(&user(Role::Admin), Permission::ReviewOkrs).is_ok());

        assert!(manager.revoke(Role::Admin, Permission::ReviewOkrs));
        assert!(!manager.revoke(Role::Admin, Permission::ReviewOkrs));
        assert!(manager.check(&user(Role::Admin), Permission::ReviewOkrs).is_err());
    }

    #[test]
    fn test_permissions_for_is_sorted() {
        let manager = RoleManager::school_defaults();
        let permissions = manager.permissions_for(Role::Parent);

        let mut sorted = permissions.clone();
        sorted.sort();
        assert_eq!(permissions, sorted);
        assert_eq!(permissions.len(), 5);
    }
}
