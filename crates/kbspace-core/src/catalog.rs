//! Well-known function and command codes.
//!
//! These are the codes protected operations declare requirements against,
//! and the rows seeded into a fresh store.

use crate::command::Command;
use crate::function::Function;

/// Function codes.
pub mod function_code {
    pub const DASHBOARD: &str = "dashboard";

    pub const CONTENT: &str = "content";
    pub const CONTENT_CATEGORY: &str = "content.category";
    pub const CONTENT_KNOWLEDGEBASE: &str = "content.kb";
    pub const CONTENT_COMMENT: &str = "content.comment";
    pub const CONTENT_REPORT: &str = "content.report";

    pub const STATISTIC: &str = "statistic";
    pub const STATISTIC_MONTHLY_NEW_MEMBER: &str = "statistic.monthly_new_member";
    pub const STATISTIC_MONTHLY_NEW_KB: &str = "statistic.monthly_new_kb";
    pub const STATISTIC_MONTHLY_COMMENT: &str = "statistic.monthly_comment";

    pub const SYSTEM: &str = "system";
    pub const SYSTEM_USER: &str = "system.user";
    pub const SYSTEM_ROLE: &str = "system.role";
    pub const SYSTEM_FUNCTION: &str = "system.function";
    pub const SYSTEM_PERMISSION: &str = "system.permission";
}

/// Command codes.
pub mod command_code {
    pub const VIEW: &str = "VIEW";
    pub const CREATE: &str = "CREATE";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const APPROVE: &str = "APPROVE";
}

/// The standard verbs seeded into every store.
pub fn standard_commands() -> Vec<Command> {
    use command_code::*;
    vec![
        Command::new(VIEW, "View"),
        Command::new(CREATE, "Create"),
        Command::new(UPDATE, "Update"),
        Command::new(DELETE, "Delete"),
        Command::new(APPROVE, "Approve"),
    ]
}

/// The administrable resource tree seeded into every store.
pub fn standard_functions() -> Vec<Function> {
    use function_code::*;
    vec![
        Function::new(DASHBOARD, "Dashboard", "/", 1),
        Function::new(CONTENT, "Content", "/content", 2),
        Function::new(CONTENT_CATEGORY, "Categories", "/content/category", 1).with_parent(CONTENT),
        Function::new(CONTENT_KNOWLEDGEBASE, "Knowledge bases", "/content/kb", 2)
            .with_parent(CONTENT),
        Function::new(CONTENT_COMMENT, "Comments", "/content/comment", 3).with_parent(CONTENT),
        Function::new(CONTENT_REPORT, "Reports", "/content/report", 4).with_parent(CONTENT),
        Function::new(STATISTIC, "Statistics", "/statistic", 3),
        Function::new(
            STATISTIC_MONTHLY_NEW_MEMBER,
            "New members by month",
            "/statistic/monthly-registers",
            1,
        )
        .with_parent(STATISTIC),
        Function::new(
            STATISTIC_MONTHLY_NEW_KB,
            "New knowledge bases by month",
            "/statistic/monthly-newkbs",
            2,
        )
        .with_parent(STATISTIC),
        Function::new(
            STATISTIC_MONTHLY_COMMENT,
            "Comments by month",
            "/statistic/monthly-comments",
            3,
        )
        .with_parent(STATISTIC),
        Function::new(SYSTEM, "System", "/system", 4),
        Function::new(SYSTEM_USER, "Users", "/system/user", 1).with_parent(SYSTEM),
        Function::new(SYSTEM_ROLE, "Roles", "/system/role", 2).with_parent(SYSTEM),
        Function::new(SYSTEM_FUNCTION, "Functions", "/system/function", 3).with_parent(SYSTEM),
        Function::new(SYSTEM_PERMISSION, "Permissions", "/system/permission", 4)
            .with_parent(SYSTEM),
    ]
}
