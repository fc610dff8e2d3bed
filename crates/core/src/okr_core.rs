//! OkrCore - Central entry point for every school operation
//!
//! Every operation takes a session token, resolves the acting user from the
//! store, checks the role permission, checks scope, and records the outcome
//! in the audit log.

use audit::{AuditLogger, LoginLimitResult, LoginLimiter, LoginPolicy};
use rbac::{Permission, RoleManager, Scope};
use shared::credential::{hash_password, verify_password};
use shared::{
    normalize_email, AppConfig, Class, Okr, OkrError, Period, PermissionDeniedError, Result, Role,
    User,
};
use std::time::Duration;
use store::SchoolStore;

use crate::session::{Session, SessionStore};

/// OkrCore - owns the store and all per-process state
#[derive(Debug)]
pub struct OkrCore<S> {
    pub(crate) store: S,
    pub(crate) roles: RoleManager,
    pub(crate) audit: AuditLogger,
    pub(crate) limiter: LoginLimiter,
    pub(crate) sessions: SessionStore,
}

impl<S: SchoolStore> OkrCore<S> {
    /// Create an OkrCore over `store`, sized by `config`
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            store,
            roles: RoleManager::school_defaults(),
            audit: AuditLogger::new(config.audit_capacity),
            limiter: LoginLimiter::new(LoginPolicy::from_config(config)),
            sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn roles(&self) -> &RoleManager {
        &self.roles
    }

    // ============== Bootstrap ==============

    /// Create the first admin account. Fails once any admin exists.
    pub fn bootstrap_admin(&mut self, email: &str, name: &str, password: &str) -> Result<User> {
        if let Some(admin) = self.store.list_users_by_role(Role::Admin)?.first() {
            return Err(OkrError::conflict("Admin", &admin.email));
        }

        let user = new_account(email, name, Role::Admin, password)?;
        self.store.insert_user(&user)?;
        self.audit.log_action(&user.email, Role::Admin.as_str(), "bootstrap-admin", Some(&user.email));
        tracing::info!(email = %user.email, "admin account created");
        Ok(user)
    }

    /// Session for an operator with direct access to the database file.
    ///
    /// Acts as the first admin account (by email).
    pub fn local_session(&mut self) -> Result<Session> {
        let admin = self
            .store
            .list_users_by_role(Role::Admin)?
            .into_iter()
            .next()
            .ok_or_else(|| OkrError::Config("no admin account, run `okr init` first".to_string()))?;

        let session = self.sessions.issue(&admin);
        self.audit.log_action(&admin.email, Role::Admin.as_str(), "local-session", None);
        Ok(session)
    }

    // ============== Authentication ==============

    /// Check email + password against the stored account
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        match self.store.find_user(&email)? {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            _ => Err(OkrError::InvalidCredentials),
        }
    }

    /// Authenticate and open a session, subject to the failed-login limiter
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);

        if let LoginLimitResult::Locked { retry_after_secs } = self.limiter.check(&email) {
            self.audit.log_login_locked(&email, retry_after_secs);
            return Err(OkrError::TooManyAttempts {
                email,
                retry_after_secs,
            });
        }

        match self.authenticate(&email, password) {
            Ok(user) => {
                self.limiter.record_success(&email);
                let session = self.sessions.issue(&user);
                self.audit.log_login(&user.email, user.role.as_str());
                tracing::info!(email = %user.email, role = %user.role, "login");
                Ok(session)
            }
            Err(OkrError::InvalidCredentials) => {
                let result = self.limiter.record_failure(&email);
                self.audit
                    .log_login_failed(&email, &OkrError::InvalidCredentials.to_string());
                tracing::warn!(email = %email, locked = result.is_locked(), "login failed");
                Err(OkrError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    pub fn logout(&mut self, token: &str) -> Result<()> {
        let session = self.sessions.revoke(token).ok_or(OkrError::Unauthenticated)?;
        self.audit.log_logout(&session.email, session.role.as_str());
        Ok(())
    }

    pub fn session(&self, token: &str) -> Result<&Session> {
        self.sessions.get(token).ok_or(OkrError::Unauthenticated)
    }

    /// The acting user of a session
    pub fn me(&mut self, token: &str) -> Result<User> {
        self.actor(token)
    }

    pub fn change_password(&mut self, token: &str, old: &str, new: &str) -> Result<()> {
        let mut user = self.authorize(token, Permission::ChangeOwnPassword)?;
        if !verify_password(old, &user.password_hash) {
            return Err(OkrError::InvalidCredentials);
        }
        validate_password(new)?;

        user.password_hash = hash_password(new);
        self.store.update_user(&user)?;
        self.record(&user, "change-password", Some(&user.email));
        Ok(())
    }

    // ============== Authorization helpers ==============

    /// Resolve the user behind a token. Sessions of deleted users are dropped.
    pub(crate) fn actor(&mut self, token: &str) -> Result<User> {
        let email = self.session(token)?.email.clone();
        match self.store.find_user(&email)? {
            Some(user) => Ok(user),
            None => {
                self.sessions.revoke(token);
                Err(OkrError::Unauthenticated)
            }
        }
    }

    /// Resolve the actor and check one permission
    pub(crate) fn authorize(&mut self, token: &str, permission: Permission) -> Result<User> {
        let user = self.actor(token)?;
        if let Err(denied) = self.roles.check(&user, permission) {
            return Err(self.deny(&user, None, denied));
        }
        Ok(user)
    }

    pub(crate) fn scope_of(&self, user: &User) -> Result<Scope> {
        let classes = match user.role {
            Role::Teacher => self.store.list_classes_by_teacher(&user.email)?,
            _ => Vec::new(),
        };
        let relationships = match user.role {
            Role::Parent => self.store.list_children_of(&user.email)?,
            _ => Vec::new(),
        };
        Ok(Scope::new(user, &classes, &relationships))
    }

    /// Load a student and check `actor` can reach them
    pub(crate) fn student_in_scope(
        &mut self,
        actor: &User,
        permission: Permission,
        email: &str,
    ) -> Result<User> {
        let email = normalize_email(email);
        let student = self
            .store
            .find_user(&email)?
            .filter(|u| u.is(Role::Student))
            .ok_or_else(|| OkrError::not_found("Student", &email))?;

        if let Err(denied) = self.scope_of(actor)?.check_student(permission.as_str(), &student) {
            return Err(self.deny(actor, Some(&email), denied));
        }
        Ok(student)
    }

    /// Load a class and check `actor` can reach it
    pub(crate) fn class_in_scope(
        &mut self,
        actor: &User,
        permission: Permission,
        name: &str,
    ) -> Result<Class> {
        let class = self
            .store
            .find_class(name)?
            .ok_or_else(|| OkrError::not_found("Class", name))?;

        if let Err(denied) = self.scope_of(actor)?.check_class(permission.as_str(), name) {
            return Err(self.deny(actor, Some(name), denied));
        }
        Ok(class)
    }

    /// Load an OKR and check `actor` can reach its student
    pub(crate) fn okr_in_scope(
        &mut self,
        actor: &User,
        permission: Permission,
        id: &str,
    ) -> Result<Okr> {
        let okr = self
            .store
            .find_okr(id)?
            .ok_or_else(|| OkrError::not_found("Okr", id))?;
        self.student_in_scope(actor, permission, &okr.student_email)?;
        Ok(okr)
    }

    pub(crate) fn period(&self, id: &str) -> Result<Period> {
        self.store
            .find_period(id)?
            .ok_or_else(|| OkrError::not_found("Period", id))
    }

    /// A period that still accepts OKR changes
    pub(crate) fn writable_period(&self, id: &str) -> Result<Period> {
        let period = self.period(id)?;
        if !period.is_open() {
            return Err(OkrError::PeriodClosed(period.id));
        }
        Ok(period)
    }

    pub(crate) fn record(&mut self, actor: &User, action: &str, target: Option<&str>) {
        tracing::info!(
            actor = %actor.email,
            role = %actor.role,
            action,
            target = target.unwrap_or("-"),
            "action"
        );
        self.audit
            .log_action(&actor.email, actor.role.as_str(), action, target);
    }

    pub(crate) fn deny(
        &mut self,
        actor: &User,
        target: Option<&str>,
        denied: PermissionDeniedError,
    ) -> OkrError {
        tracing::warn!(
            actor = %actor.email,
            role = %actor.role,
            action = %denied.action,
            reason = %denied.reason,
            "permission denied"
        );
        self.audit.log_denied(
            &actor.email,
            actor.role.as_str(),
            &denied.action,
            target,
            &denied.reason,
        );
        denied.into()
    }
}

/// Validate and build a new account with a hashed password
pub(crate) fn new_account(email: &str, name: &str, role: Role, password: &str) -> Result<User> {
    let email = normalize_email(email);
    shared::validate_email(&email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(OkrError::validation("name is empty"));
    }
    validate_password(password)?;
    Ok(User::new(email, name, role).with_password_hash(hash_password(password)))
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(OkrError::validation("password is empty"));
    }
    Ok(())
}
