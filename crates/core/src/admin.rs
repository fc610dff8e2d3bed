//! Admin operations: accounts, classes, periods, parent links, audit log

use audit::{AuditEntry, AuditStats};
use rbac::Permission;
use serde::{Deserialize, Serialize};
use shared::credential::hash_password;
use shared::{
    normalize_email, validate_email, Class, ClassPatch, OkrError, Period, PeriodStatus,
    Relationship, Result, Role, User, UserPatch,
};
use store::{CascadeReport, SchoolStore};

use crate::okr_core::{new_account, validate_password, OkrCore};

/// Input for creating an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub class_name: Option<String>,
    pub password: String,
}

/// Equality filters for listing accounts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl<S: SchoolStore> OkrCore<S> {
    // ============== Users ==============

    pub fn create_user(&mut self, token: &str, input: NewUser) -> Result<User> {
        let admin = self.authorize(token, Permission::ManageUsers)?;

        let mut user = new_account(&input.email, &input.name, input.role, &input.password)?;
        if let Some(class_name) = non_empty(input.class_name.as_deref()) {
            user = user.with_class(class_name);
        }
        self.store.insert_user(&user)?;

        self.record(&admin, "create-user", Some(&user.email));
        Ok(user)
    }

    pub fn update_user(&mut self, token: &str, email: &str, patch: UserPatch) -> Result<User> {
        let admin = self.authorize(token, Permission::ManageUsers)?;
        let email = normalize_email(email);
        let mut user = self
            .store
            .find_user(&email)?
            .ok_or_else(|| OkrError::not_found("User", &email))?;

        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(OkrError::validation("name is empty"));
        }
        if user.email == admin.email && patch.role.is_some_and(|r| r != Role::Admin) {
            return Err(OkrError::validation("you cannot change your own role"));
        }

        let patch = UserPatch {
            name: patch.name.map(|n| n.trim().to_string()),
            class_name: patch
                .class_name
                .map(|c| non_empty(c.as_deref()).map(str::to_string)),
            ..patch
        };
        patch.apply(&mut user);
        self.store.update_user(&user)?;

        self.record(&admin, "update-user", Some(&user.email));
        Ok(user)
    }

    /// Set a new password and lift any login lockout
    pub fn reset_password(&mut self, token: &str, email: &str, password: &str) -> Result<()> {
        let admin = self.authorize(token, Permission::ManageUsers)?;
        let email = normalize_email(email);
        let mut user = self
            .store
            .find_user(&email)?
            .ok_or_else(|| OkrError::not_found("User", &email))?;
        validate_password(password)?;

        user.password_hash = hash_password(password);
        self.store.update_user(&user)?;
        self.limiter.reset(&email);

        self.record(&admin, "reset-password", Some(&email));
        Ok(())
    }

    /// Change an account's email everywhere it appears
    pub fn rename_email(&mut self, token: &str, old: &str, new: &str) -> Result<User> {
        let admin = self.authorize(token, Permission::ManageUsers)?;
        let old = normalize_email(old);
        let new = normalize_email(new);
        validate_email(&new)?;

        self.store.rename_email(&old, &new)?;
        self.sessions.rename(&old, &new);

        self.record(&admin, "rename-email", Some(&format!("{} -> {}", old, new)));
        self.store
            .find_user(&new)?
            .ok_or_else(|| OkrError::not_found("User", &new))
    }

    /// Delete an account and every row naming it
    pub fn delete_user(&mut self, token: &str, email: &str) -> Result<CascadeReport> {
        let admin = self.authorize(token, Permission::ManageUsers)?;
        let email = normalize_email(email);
        if email == admin.email {
            return Err(OkrError::validation("you cannot delete your own account"));
        }

        let report = self.store.delete_user_cascade(&email)?;
        self.sessions.revoke_user(&email);
        self.limiter.reset(&email);

        self.record(&admin, "delete-user", Some(&email));
        Ok(report)
    }

    pub fn list_users(&mut self, token: &str, filter: &UserFilter) -> Result<Vec<User>> {
        let admin = self.authorize(token, Permission::ManageUsers)?;

        let users = match non_empty(filter.class_name.as_deref()) {
            Some(class_name) => self.store.list_users_by_class(class_name)?,
            None => self.store.list_users()?,
        };
        let users = users
            .into_iter()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .collect();

        self.record(&admin, "list-users", None);
        Ok(users)
    }

    // ============== Classes ==============

    pub fn create_class(&mut self, token: &str, class: Class) -> Result<Class> {
        let admin = self.authorize(token, Permission::ManageClasses)?;

        let class = Class {
            name: class.name.trim().to_string(),
            teacher_email: class.teacher_email.as_deref().map(normalize_email),
            ..class
        };
        if class.name.is_empty() {
            return Err(OkrError::validation("class name is empty"));
        }
        self.validate_teacher(class.teacher_email.as_deref())?;
        self.store.insert_class(&class)?;

        self.record(&admin, "create-class", Some(&class.name));
        Ok(class)
    }

    pub fn update_class(&mut self, token: &str, name: &str, patch: ClassPatch) -> Result<Class> {
        let admin = self.authorize(token, Permission::ManageClasses)?;
        let mut class = self
            .store
            .find_class(name)?
            .ok_or_else(|| OkrError::not_found("Class", name))?;

        patch.apply(&mut class);
        self.validate_teacher(class.teacher_email.as_deref())?;
        self.store.update_class(&class)?;

        self.record(&admin, "update-class", Some(&class.name));
        Ok(class)
    }

    /// Students keep their class name; it simply no longer resolves
    pub fn delete_class(&mut self, token: &str, name: &str) -> Result<()> {
        let admin = self.authorize(token, Permission::ManageClasses)?;
        if !self.store.delete_class(name)? {
            return Err(OkrError::not_found("Class", name));
        }
        self.record(&admin, "delete-class", Some(name));
        Ok(())
    }

    /// All classes for an admin, own classes for a teacher
    pub fn list_classes(&mut self, token: &str) -> Result<Vec<Class>> {
        let user = self.authorize(token, Permission::ViewClassStudents)?;
        let classes = match user.role {
            Role::Admin => self.store.list_classes()?,
            _ => self.store.list_classes_by_teacher(&user.email)?,
        };
        self.record(&user, "list-classes", None);
        Ok(classes)
    }

    fn validate_teacher(&self, email: Option<&str>) -> Result<()> {
        let Some(email) = email else {
            return Ok(());
        };
        match self.store.find_user(email)? {
            Some(user) if user.is(Role::Teacher) => Ok(()),
            Some(_) => Err(OkrError::validation(format!("'{}' is not a teacher", email))),
            None => Err(OkrError::not_found("Teacher", email)),
        }
    }

    // ============== Periods ==============

    pub fn create_period(&mut self, token: &str, id: &str, name: &str) -> Result<Period> {
        let admin = self.authorize(token, Permission::ManagePeriods)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(OkrError::validation("period id is empty"));
        }
        let name = non_empty(Some(name)).unwrap_or(id);

        let period = Period::new(id, name);
        self.store.insert_period(&period)?;

        self.record(&admin, "create-period", Some(id));
        Ok(period)
    }

    pub fn open_period(&mut self, token: &str, id: &str) -> Result<Period> {
        self.set_period_status(token, id, PeriodStatus::Open)
    }

    pub fn close_period(&mut self, token: &str, id: &str) -> Result<Period> {
        self.set_period_status(token, id, PeriodStatus::Closed)
    }

    fn set_period_status(&mut self, token: &str, id: &str, status: PeriodStatus) -> Result<Period> {
        let admin = self.authorize(token, Permission::ManagePeriods)?;
        self.store.set_period_status(id, status)?;

        let action = match status {
            PeriodStatus::Open => "open-period",
            PeriodStatus::Closed => "close-period",
        };
        self.record(&admin, action, Some(id));
        self.period(id)
    }

    /// OKRs and reviews of the period are left in place
    pub fn delete_period(&mut self, token: &str, id: &str) -> Result<()> {
        let admin = self.authorize(token, Permission::ManagePeriods)?;
        if !self.store.delete_period(id)? {
            return Err(OkrError::not_found("Period", id));
        }
        self.record(&admin, "delete-period", Some(id));
        Ok(())
    }

    pub fn list_periods(&mut self, token: &str) -> Result<Vec<Period>> {
        let user = self.authorize(token, Permission::ListPeriods)?;
        let periods = self.store.list_periods()?;
        self.record(&user, "list-periods", None);
        Ok(periods)
    }

    // ============== Relationships ==============

    pub fn link_parent(&mut self, token: &str, student: &str, parent: &str) -> Result<Relationship> {
        let admin = self.authorize(token, Permission::ManageRelationships)?;
        let relationship = Relationship::new(student, parent);

        self.require_role(&relationship.student_email, Role::Student)?;
        self.require_role(&relationship.parent_email, Role::Parent)?;
        self.store.insert_relationship(&relationship)?;

        self.record(&admin, "link-parent", Some(&relationship_key(&relationship)));
        Ok(relationship)
    }

    pub fn unlink_parent(&mut self, token: &str, student: &str, parent: &str) -> Result<()> {
        let admin = self.authorize(token, Permission::ManageRelationships)?;
        let relationship = Relationship::new(student, parent);
        let key = relationship_key(&relationship);

        if !self
            .store
            .delete_relationship(&relationship.student_email, &relationship.parent_email)?
        {
            return Err(OkrError::not_found("Relationship", key));
        }
        self.record(&admin, "unlink-parent", Some(&key));
        Ok(())
    }

    pub fn list_relationships(&mut self, token: &str) -> Result<Vec<Relationship>> {
        let admin = self.authorize(token, Permission::ManageRelationships)?;
        let relationships = self.store.list_relationships()?;
        self.record(&admin, "list-relationships", None);
        Ok(relationships)
    }

    pub(crate) fn require_role(&self, email: &str, role: Role) -> Result<User> {
        let entity = match role {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
            Role::Parent => "Parent",
        };
        self.store
            .find_user(email)?
            .filter(|u| u.is(role))
            .ok_or_else(|| OkrError::not_found(entity, email))
    }

    // ============== Audit ==============

    /// Most recent audit entries, newest first
    pub fn audit_recent(&mut self, token: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        self.authorize(token, Permission::ViewAudit)?;
        Ok(self.audit.get_recent(limit).into_iter().cloned().collect())
    }

    /// Most recent denials and failed logins, newest first
    pub fn audit_denials(&mut self, token: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        self.authorize(token, Permission::ViewAudit)?;
        Ok(self
            .audit
            .get_recent_denials(limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Most recent entries of one actor, newest first
    pub fn audit_for_actor(
        &mut self,
        token: &str,
        actor: &str,
        limit: usize,
    ) -> Result<Vec<AuditEntry>> {
        self.authorize(token, Permission::ViewAudit)?;
        let actor = normalize_email(actor);
        Ok(self
            .audit
            .get_for_actor(&actor, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn audit_stats(&mut self, token: &str) -> Result<AuditStats> {
        self.authorize(token, Permission::ViewAudit)?;
        Ok(self.audit.get_stats())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn relationship_key(relationship: &Relationship) -> String {
    format!("{} / {}", relationship.student_email, relationship.parent_email)
}
