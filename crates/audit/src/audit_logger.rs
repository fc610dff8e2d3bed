//! AuditLogger - Audit logging for OKR School

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub event_type: AuditEventType,
    /// Email of the acting user (the attempted email for logins)
    pub actor: String,
    pub role: Option<String>,
    pub action: String,
    /// Row the action was about: an email, OKR id, class name...
    pub target: Option<String>,
    pub success: bool,
    pub reason: Option<String>,
}

/// Types of audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Login,
    LoginFailed,
    LoginLocked,
    Logout,
    Action,
    Denied,
}

/// Audit logger
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    /// Create a new AuditLogger keeping at most `max_entries`
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries: max_entries.max(1),
        }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: AuditEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn entry(event_type: AuditEventType, actor: &str, action: &str) -> AuditEntry {
        AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type,
            actor: actor.to_string(),
            role: None,
            action: action.to_string(),
            target: None,
            success: true,
            reason: None,
        }
    }

    /// Log a successful login
    pub fn log_login(&mut self, email: &str, role: &str) {
        self.log(AuditEntry {
            role: Some(role.to_string()),
            ..Self::entry(AuditEventType::Login, email, "login")
        });
    }

    /// Log a rejected login attempt
    pub fn log_login_failed(&mut self, email: &str, reason: &str) {
        self.log(AuditEntry {
            success: false,
            reason: Some(reason.to_string()),
            ..Self::entry(AuditEventType::LoginFailed, email, "login")
        });
    }

    /// Log a login refused because the email is locked out
    pub fn log_login_locked(&mut self, email: &str, retry_after_secs: u64) {
        self.log(AuditEntry {
            success: false,
            reason: Some(format!("Locked out, retry in {}s", retry_after_secs)),
            ..Self::entry(AuditEventType::LoginLocked, email, "login")
        });
    }

    /// Log a logout
    pub fn log_logout(&mut self, email: &str, role: &str) {
        self.log(AuditEntry {
            role: Some(role.to_string()),
            ..Self::entry(AuditEventType::Logout, email, "logout")
        });
    }

    /// Log an operation performed by a signed-in user
    pub fn log_action(&mut self, actor: &str, role: &str, action: &str, target: Option<&str>) {
        self.log(AuditEntry {
            role: Some(role.to_string()),
            target: target.map(|s| s.to_string()),
            ..Self::entry(AuditEventType::Action, actor, action)
        });
    }

    /// Log an operation refused by a permission or scope check
    pub fn log_denied(
        &mut self,
        actor: &str,
        role: &str,
        action: &str,
        target: Option<&str>,
        reason: &str,
    ) {
        self.log(AuditEntry {
            role: Some(role.to_string()),
            target: target.map(|s| s.to_string()),
            success: false,
            reason: Some(reason.to_string()),
            ..Self::entry(AuditEventType::Denied, actor, action)
        });
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent denials, newest first
    pub fn get_recent_denials(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| !e.success)
            .take(limit)
            .collect()
    }

    /// Get recent entries of one actor, newest first
    pub fn get_for_actor(&self, actor: &str, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.actor == actor)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let total = self.entries.len();
        let denials = self.entries.iter().filter(|e| !e.success).count();
        let failed_logins = self
            .entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    AuditEventType::LoginFailed | AuditEventType::LoginLocked
                )
            })
            .count();

        AuditStats {
            total_entries: total,
            denial_count: denials,
            failed_login_count: failed_logins,
        }
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_entries: usize,
    pub denial_count: usize,
    pub failed_login_count: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10000)
    }
}
