//! Permission - Actions a role may be granted

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something a signed-in user asks to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    // Administration
    ManageUsers,
    ManageClasses,
    ManagePeriods,
    ManageRelationships,
    ImportRoster,
    ViewAudit,

    // Homeroom teacher
    ViewClassStudents,
    ReviewOkrs,
    ResolveDeleteRequests,
    WriteTeacherComment,
    SendReview,
    ViewClassSummary,

    // Student
    CreateOkr,
    EditOwnOkr,
    RequestOkrDeletion,

    // Parent
    ViewChildren,
    WriteParentComment,

    // Anyone in scope
    ViewStudentProgress,
    ListPeriods,
    ChangeOwnPassword,
}

impl Permission {
    pub const ALL: [Permission; 20] = [
        Permission::ManageUsers,
        Permission::ManageClasses,
        Permission::ManagePeriods,
        Permission::ManageRelationships,
        Permission::ImportRoster,
        Permission::ViewAudit,
        Permission::ViewClassStudents,
        Permission::ReviewOkrs,
        Permission::ResolveDeleteRequests,
        Permission::WriteTeacherComment,
        Permission::SendReview,
        Permission::ViewClassSummary,
        Permission::CreateOkr,
        Permission::EditOwnOkr,
        Permission::RequestOkrDeletion,
        Permission::ViewChildren,
        Permission::WriteParentComment,
        Permission::ViewStudentProgress,
        Permission::ListPeriods,
        Permission::ChangeOwnPassword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage-users",
            Permission::ManageClasses => "manage-classes",
            Permission::ManagePeriods => "manage-periods",
            Permission::ManageRelationships => "manage-relationships",
            Permission::ImportRoster => "import-roster",
            Permission::ViewAudit => "view-audit",
            Permission::ViewClassStudents => "view-class-students",
            Permission::ReviewOkrs => "review-okrs",
            Permission::ResolveDeleteRequests => "resolve-delete-requests",
            Permission::WriteTeacherComment => "write-teacher-comment",
            Permission::SendReview => "send-review",
            Permission::ViewClassSummary => "view-class-summary",
            Permission::CreateOkr => "create-okr",
            Permission::EditOwnOkr => "edit-own-okr",
            Permission::RequestOkrDeletion => "request-okr-deletion",
            Permission::ViewChildren => "view-children",
            Permission::WriteParentComment => "write-parent-comment",
            Permission::ViewStudentProgress => "view-student-progress",
            Permission::ListPeriods => "list-periods",
            Permission::ChangeOwnPassword => "change-own-password",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
