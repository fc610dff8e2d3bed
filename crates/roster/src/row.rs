//! Roster rows as they appear in spreadsheets exported to CSV or YAML

use serde::{Deserialize, Serialize};
use shared::credential::hash_password;
use shared::{normalize_email, validate_email, OkrError, Relationship, Role, User};

/// One account line of a users roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    #[serde(alias = "Email")]
    pub email: String,

    #[serde(alias = "Password", alias = "matKhau")]
    pub password: String,

    #[serde(alias = "Name", alias = "hoTen")]
    pub name: String,

    #[serde(alias = "Role", alias = "vaiTro")]
    pub role: String,

    #[serde(default, alias = "ClassName", alias = "class", alias = "lop")]
    pub class_name: Option<String>,
}

impl UserRow {
    /// Normalized email, the deduplication key
    pub fn key(&self) -> String {
        normalize_email(&self.email)
    }

    /// Validate the row and build the account it describes
    pub fn to_user(&self) -> Result<User, OkrError> {
        let email = self.key();
        validate_email(&email)?;
        let role: Role = self.role.parse()?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(OkrError::validation("name is empty"));
        }
        if self.password.is_empty() {
            return Err(OkrError::validation("password is empty"));
        }

        let mut user = User::new(email, name, role).with_password_hash(hash_password(&self.password));
        if let Some(class_name) = self.class_name.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            user = user.with_class(class_name);
        }
        Ok(user)
    }
}

/// One student / parent link of a parents roster.
///
/// When the parent has no account yet it is created from `parent_name`
/// and `password`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRow {
    #[serde(alias = "StudentEmail", alias = "emailHocSinh")]
    pub student_email: String,

    #[serde(alias = "ParentEmail", alias = "emailPhuHuynh")]
    pub parent_email: String,

    #[serde(default, alias = "ParentName", alias = "tenPhuHuynh")]
    pub parent_name: Option<String>,

    #[serde(default, alias = "Password", alias = "matKhau")]
    pub password: Option<String>,
}

impl ParentRow {
    /// Normalized (student, parent) pair, the deduplication key
    pub fn key(&self) -> String {
        format!(
            "{} / {}",
            normalize_email(&self.student_email),
            normalize_email(&self.parent_email)
        )
    }

    pub fn to_relationship(&self) -> Result<Relationship, OkrError> {
        let relationship = Relationship::new(&self.student_email, &self.parent_email);
        validate_email(&relationship.student_email)?;
        validate_email(&relationship.parent_email)?;
        if relationship.student_email == relationship.parent_email {
            return Err(OkrError::validation("student and parent are the same account"));
        }
        Ok(relationship)
    }

    /// Account for a parent that does not exist yet
    pub fn to_parent_user(&self) -> Result<User, OkrError> {
        let email = normalize_email(&self.parent_email);
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| OkrError::validation(format!("parent '{}' has no account and no password", email)))?;
        let name = self
            .parent_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(email.as_str())
            .to_string();

        Ok(User::new(&email, name, Role::Parent).with_password_hash(hash_password(password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::credential::verify_password;

    fn user_row(email: &str, role: &str) -> UserRow {
        UserRow {
            email: email.to_string(),
            password: "123456".to_string(),
            name: "Nguyễn Văn Minh".to_string(),
            role: role.to_string(),
            class_name: Some(" 10A1 ".to_string()),
        }
    }

    // ============== UserRow Tests ==============

    #[test]
    fn test_user_row_to_user() {
        let user = user_row(" Minh@School.VN ", "học sinh").to_user().unwrap();

        assert_eq!(user.email, "minh@school.vn");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.class_name.as_deref(), Some("10A1"));
        assert!(verify_password("123456", &user.password_hash));
    }

    #[test]
    fn test_user_row_rejects_bad_email_and_role() {
        assert!(matches!(
            user_row("not-an-email", "student").to_user(),
            Err(OkrError::Validation(_))
        ));
        assert!(matches!(
            user_row("a@school.vn", "principal").to_user(),
            Err(OkrError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_user_row_blank_class_is_none() {
        let mut row = user_row("gv@school.vn", "gvcn");
        row.class_name = Some("  ".to_string());

        let user = row.to_user().unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert!(user.class_name.is_none());
    }

    #[test]
    fn test_user_row_spreadsheet_headers() {
        let json = r#"{"Email":"a@s.vn","Password":"x","Name":"A","Role":"Student","ClassName":"10A1"}"#;
        let row: UserRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.class_name.as_deref(), Some("10A1"));
    }

    // ============== ParentRow Tests ==============

    #[test]
    fn test_parent_row_key_is_normalized() {
        let row = ParentRow {
            student_email: "HS@school.vn".to_string(),
            parent_email: " ph@school.vn".to_string(),
            parent_name: None,
            password: None,
        };

        assert_eq!(row.key(), "hs@school.vn / ph@school.vn");
        assert_eq!(
            row.to_relationship().unwrap(),
            Relationship::new("hs@school.vn", "ph@school.vn")
        );
    }

    #[test]
    fn test_parent_row_self_link_rejected() {
        let row = ParentRow {
            student_email: "hs@school.vn".to_string(),
            parent_email: "HS@school.vn".to_string(),
            parent_name: None,
            password: None,
        };
        assert!(row.to_relationship().is_err());
    }

    #[test]
    fn test_parent_user_needs_password() {
        let mut row = ParentRow {
            student_email: "hs@school.vn".to_string(),
            parent_email: "ph@school.vn".to_string(),
            parent_name: None,
            password: None,
        };
        assert!(row.to_parent_user().is_err());

        row.password = Some("abc".to_string());
        let parent = row.to_parent_user().unwrap();
        assert_eq!(parent.role, Role::Parent);
        // Name falls back to the email
        assert_eq!(parent.name, "ph@school.vn");
    }
}
