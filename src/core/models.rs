//! Account domain objects as exchanged with the NS1 REST API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub username: String,
    pub email: String,
    /// Team identifiers in the order they were supplied.
    #[serde(rename = "teams")]
    pub team_ids: Vec<String>,
    pub notify: NotificationSettings,
    pub permissions: PermissionsMap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub billing: bool,
}

/// Capability grants on the account. Part of this is computed server side
/// from team membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsMap {
    pub dns: PermissionsDns,
    pub data: PermissionsData,
    pub account: PermissionsAccount,
    pub monitoring: PermissionsMonitoring,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<PermissionsSecurity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsDns {
    pub view_zones: bool,
    pub manage_zones: bool,
    pub zones_allow_by_default: bool,
    pub zones_deny: Vec<String>,
    pub zones_allow: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsData {
    pub push_to_datafeeds: bool,
    pub manage_datasources: bool,
    pub manage_datafeeds: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsAccount {
    pub manage_users: bool,
    pub manage_payment_methods: bool,
    pub manage_plan: bool,
    pub manage_teams: bool,
    pub manage_apikeys: bool,
    pub manage_account_settings: bool,
    pub view_activity_log: bool,
    pub view_invoices: bool,
    pub manage_ip_whitelist: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsMonitoring {
    pub manage_lists: bool,
    pub manage_jobs: bool,
    pub view_jobs: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsSecurity {
    pub manage_global_2fa: bool,
    pub manage_active_directory: bool,
}
