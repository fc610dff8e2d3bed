//! Login sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Role, User};
use std::collections::HashMap;
use std::time::Duration;

/// Session lifetime when none is configured
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Longest lifetime a session is given
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(u32::MAX as u64);

/// A signed-in user, identified by an opaque bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Live sessions by token. A session older than the TTL is gone.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let secs = ttl.min(MAX_SESSION_TTL).as_secs() as i64;
        Self {
            sessions: HashMap::new(),
            ttl: chrono::Duration::seconds(secs),
        }
    }

    fn is_live(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.created_at) < self.ttl
    }

    /// Issue a fresh token for `user`, dropping expired sessions
    pub fn issue(&mut self, user: &User) -> Session {
        self.purge_expired(Utc::now());
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn get(&self, token: &str) -> Option<&Session> {
        self.get_at(token, Utc::now())
    }

    pub fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<&Session> {
        self.sessions
            .get(token)
            .filter(|session| self.is_live(session, now))
    }

    pub fn revoke(&mut self, token: &str) -> Option<Session> {
        let now = Utc::now();
        self.sessions
            .remove(token)
            .filter(|session| self.is_live(session, now))
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.sessions
            .retain(|_, session| now.signed_duration_since(session.created_at) < ttl);
    }

    /// Drop every session of one user, returning how many were dropped
    pub fn revoke_user(&mut self, email: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.email != email);
        before - self.sessions.len()
    }

    /// Follow an email rename so open sessions stay valid
    pub fn rename(&mut self, old: &str, new: &str) {
        for session in self.sessions.values_mut().filter(|s| s.email == old) {
            session.email = new.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_revoke() {
        let mut store = SessionStore::default();
        let user = User::new("hs@school.vn", "Minh", Role::Student);

        let a = store.issue(&user);
        let b = store.issue(&user);
        assert_ne!(a.token, b.token);
        assert_eq!(store.get(&a.token).unwrap().email, "hs@school.vn");

        assert!(store.revoke(&a.token).is_some());
        assert!(store.get(&a.token).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_revoke_user_and_rename() {
        let mut store = SessionStore::default();
        let minh = User::new("hs@school.vn", "Minh", Role::Student);
        let lan = User::new("gv@school.vn", "Lan", Role::Teacher);

        store.issue(&minh);
        let token = store.issue(&minh).token;
        store.issue(&lan);

        store.rename("hs@school.vn", "minh@school.vn");
        assert_eq!(store.get(&token).unwrap().email, "minh@school.vn");

        assert_eq!(store.revoke_user("minh@school.vn"), 2);
        assert_eq!(store.len(), 1);
    }

    // ============== Expiry Tests ==============

    #[test]
    fn test_session_expires_after_ttl() {
        let mut store = SessionStore::new(Duration::from_secs(60));
        let user = User::new("hs@school.vn", "Minh", Role::Student);

        let session = store.issue(&user);
        let soon = session.created_at + chrono::Duration::seconds(59);
        let late = session.created_at + chrono::Duration::seconds(60);
        assert!(store.get_at(&session.token, soon).is_some());
        assert!(store.get_at(&session.token, late).is_none());
    }

    #[test]
    fn test_issue_purges_expired() {
        let mut store = SessionStore::new(Duration::ZERO);
        let user = User::new("hs@school.vn", "Minh", Role::Student);

        for _ in 0..100 {
            let session = store.issue(&user);
            assert!(store.get(&session.token).is_none());
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_huge_ttl_is_capped() {
        let mut store = SessionStore::new(Duration::from_secs(u64::MAX));
        let user = User::new("hs@school.vn", "Minh", Role::Student);

        let session = store.issue(&user);
        assert!(store.get(&session.token).is_some());
    }
}
