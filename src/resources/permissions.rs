//! Flat resource fields for the nested NS1 permissions map.

use crate::core::models::{
    PermissionsAccount, PermissionsData, PermissionsDns, PermissionsMap, PermissionsMonitoring,
    PermissionsSecurity,
};
use crate::errors::Ns1Error;
use crate::schema::{ResourceData, Schema, SchemaMap, ValueType};

const BOOL_FIELDS: &[&str] = &[
    "dns_view_zones",
    "dns_manage_zones",
    "dns_zones_allow_by_default",
    "data_push_to_datafeeds",
    "data_manage_datasources",
    "data_manage_datafeeds",
    "account_manage_users",
    "account_manage_payment_methods",
    "account_manage_plan",
    "account_manage_teams",
    "account_manage_apikeys",
    "account_manage_account_settings",
    "account_view_activity_log",
    "account_view_invoices",
    "account_manage_ip_whitelist",
    "monitoring_manage_lists",
    "monitoring_manage_jobs",
    "monitoring_view_jobs",
    "security_manage_global_2fa",
    "security_manage_active_directory",
];

const LIST_FIELDS: &[&str] = &["dns_zones_deny", "dns_zones_allow"];

/// Add the permission fields to a resource schema.
///
/// Team membership grants permissions on the server, so every field is
/// computed and an omitted one keeps the value last read back.
#[must_use]
pub fn add_perms_schema(mut schema: SchemaMap) -> SchemaMap {
    for field in BOOL_FIELDS {
        schema.insert((*field).to_string(), Schema::optional(ValueType::Bool).computed());
    }
    for field in LIST_FIELDS {
        schema.insert(
            (*field).to_string(),
            Schema::optional(ValueType::list_of(ValueType::String)).computed(),
        );
    }
    schema
}

/// # Errors
///
/// Returns an error if the schema was not extended with `add_perms_schema`.
pub fn permissions_to_resource_data(
    d: &mut ResourceData,
    p: &PermissionsMap,
) -> Result<(), Ns1Error> {
    d.set("dns_view_zones", p.dns.view_zones)?;
    d.set("dns_manage_zones", p.dns.manage_zones)?;
    d.set("dns_zones_allow_by_default", p.dns.zones_allow_by_default)?;
    d.set("dns_zones_deny", p.dns.zones_deny.clone())?;
    d.set("dns_zones_allow", p.dns.zones_allow.clone())?;

    d.set("data_push_to_datafeeds", p.data.push_to_datafeeds)?;
    d.set("data_manage_datasources", p.data.manage_datasources)?;
    d.set("data_manage_datafeeds", p.data.manage_datafeeds)?;

    d.set("account_manage_users", p.account.manage_users)?;
    d.set("account_manage_payment_methods", p.account.manage_payment_methods)?;
    d.set("account_manage_plan", p.account.manage_plan)?;
    d.set("account_manage_teams", p.account.manage_teams)?;
    d.set("account_manage_apikeys", p.account.manage_apikeys)?;
    d.set("account_manage_account_settings", p.account.manage_account_settings)?;
    d.set("account_view_activity_log", p.account.view_activity_log)?;
    d.set("account_view_invoices", p.account.view_invoices)?;
    d.set("account_manage_ip_whitelist", p.account.manage_ip_whitelist)?;

    d.set("monitoring_manage_lists", p.monitoring.manage_lists)?;
    d.set("monitoring_manage_jobs", p.monitoring.manage_jobs)?;
    d.set("monitoring_view_jobs", p.monitoring.view_jobs)?;

    let security = p.security.unwrap_or_default();
    d.set("security_manage_global_2fa", security.manage_global_2fa)?;
    d.set("security_manage_active_directory", security.manage_active_directory)?;

    Ok(())
}

/// # Errors
///
/// Returns `TypeMismatch` if a permission field holds a value of the wrong type.
pub fn resource_data_to_permissions(d: &ResourceData) -> Result<PermissionsMap, Ns1Error> {
    let security = PermissionsSecurity {
        manage_global_2fa: d.get_bool("security_manage_global_2fa")?,
        manage_active_directory: d.get_bool("security_manage_active_directory")?,
    };
    // security section is omitted unless one of its flags is granted
    let security = (security.manage_global_2fa || security.manage_active_directory).then_some(security);

    Ok(PermissionsMap {
        dns: PermissionsDns {
            view_zones: d.get_bool("dns_view_zones")?,
            manage_zones: d.get_bool("dns_manage_zones")?,
            zones_allow_by_default: d.get_bool("dns_zones_allow_by_default")?,
            zones_deny: d.get_string_list("dns_zones_deny")?,
            zones_allow: d.get_string_list("dns_zones_allow")?,
        },
        data: PermissionsData {
            push_to_datafeeds: d.get_bool("data_push_to_datafeeds")?,
            manage_datasources: d.get_bool("data_manage_datasources")?,
            manage_datafeeds: d.get_bool("data_manage_datafeeds")?,
        },
        account: PermissionsAccount {
            manage_users: d.get_bool("account_manage_users")?,
            manage_payment_methods: d.get_bool("account_manage_payment_methods")?,
            manage_plan: d.get_bool("account_manage_plan")?,
            manage_teams: d.get_bool("account_manage_teams")?,
            manage_apikeys: d.get_bool("account_manage_apikeys")?,
            manage_account_settings: d.get_bool("account_manage_account_settings")?,
            view_activity_log: d.get_bool("account_view_activity_log")?,
            view_invoices: d.get_bool("account_view_invoices")?,
            manage_ip_whitelist: d.get_bool("account_manage_ip_whitelist")?,
        },
        monitoring: PermissionsMonitoring {
            manage_lists: d.get_bool("monitoring_manage_lists")?,
            manage_jobs: d.get_bool("monitoring_manage_jobs")?,
            view_jobs: d.get_bool("monitoring_view_jobs")?,
        },
        security,
    })
}
