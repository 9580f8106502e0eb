use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "manage_users"); route
/// actions are expressed as the permission they require.
/// The wildcard permission `"*"` grants every action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The Depth Studio permission catalog.
pub mod catalog {
    use super::Permission;

    pub const ALL_ACTIONS: Permission = Permission::from_static("*");

    pub const MANAGE_USERS: Permission = Permission::from_static("manage_users");
    pub const VIEW_FINANCIAL_REPORTS: Permission = Permission::from_static("view_financial_reports");
    pub const MANAGE_BRANDS: Permission = Permission::from_static("manage_brands");
    pub const MANAGE_CAMPAIGNS: Permission = Permission::from_static("manage_campaigns");
    pub const MANAGE_SCHEDULES: Permission = Permission::from_static("manage_schedules");
    pub const VIEW_SCHEDULES: Permission = Permission::from_static("view_schedules");
    pub const UPLOAD_CONTENT: Permission = Permission::from_static("upload_content");
    pub const REVIEW_CONTENT: Permission = Permission::from_static("review_content");
    pub const MANAGE_EQUIPMENT: Permission = Permission::from_static("manage_equipment");
    pub const VIEW_OWN_EARNINGS: Permission = Permission::from_static("view_own_earnings");
    pub const VIEW_ANALYTICS: Permission = Permission::from_static("view_analytics");

    /// Every concrete (non-wildcard) permission.
    pub const NAMED: [Permission; 11] = [
        MANAGE_USERS,
        VIEW_FINANCIAL_REPORTS,
        MANAGE_BRANDS,
        MANAGE_CAMPAIGNS,
        MANAGE_SCHEDULES,
        VIEW_SCHEDULES,
        UPLOAD_CONTENT,
        REVIEW_CONTENT,
        MANAGE_EQUIPMENT,
        VIEW_OWN_EARNINGS,
        VIEW_ANALYTICS,
    ];

    pub fn description(permission: &Permission) -> Option<&'static str> {
        let desc = match permission.as_str() {
            "*" => "Wildcard permission - grants all permissions",
            "manage_users" => "Create, suspend and re-role studio users",
            "view_financial_reports" => "View revenue and payout reports",
            "manage_brands" => "Create and edit brand accounts",
            "manage_campaigns" => "Plan and edit content campaigns",
            "manage_schedules" => "Book and reschedule shoots",
            "view_schedules" => "View the shoot calendar",
            "upload_content" => "Upload shoot deliverables",
            "review_content" => "Approve or reject uploaded content",
            "manage_equipment" => "Check equipment in and out",
            "view_own_earnings" => "View own payouts",
            "view_analytics" => "View campaign analytics",
            _ => return None,
        };
        Some(desc)
    }
}
