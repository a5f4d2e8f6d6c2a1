//! Role based permission gate

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Role;

use self::Permission::*;

/// Fine-grained action a role may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    // Users
    #[serde(rename = "users.view")]
    UsersView,
    #[serde(rename = "users.create")]
    UsersCreate,
    #[serde(rename = "users.edit")]
    UsersEdit,
    #[serde(rename = "users.delete")]
    UsersDelete,

    // Meeting-room bookings
    #[serde(rename = "bookings.view.own")]
    BookingsViewOwn,
    #[serde(rename = "bookings.view.all")]
    BookingsViewAll,
    #[serde(rename = "bookings.create")]
    BookingsCreate,
    #[serde(rename = "bookings.approve")]
    BookingsApprove,
    #[serde(rename = "bookings.cancel")]
    BookingsCancel,
    #[serde(rename = "bookings.edit")]
    BookingsEdit,

    // Service requests
    #[serde(rename = "requests.view.own")]
    RequestsViewOwn,
    #[serde(rename = "requests.view.all")]
    RequestsViewAll,
    #[serde(rename = "requests.create")]
    RequestsCreate,
    #[serde(rename = "requests.approve")]
    RequestsApprove,
    #[serde(rename = "requests.reject")]
    RequestsReject,
    #[serde(rename = "requests.edit")]
    RequestsEdit,

    // Building records
    #[serde(rename = "building.view")]
    BuildingView,
    #[serde(rename = "building.edit")]
    BuildingEdit,
    #[serde(rename = "building.rooms.manage")]
    BuildingRoomsManage,
    #[serde(rename = "building.tenants.manage")]
    BuildingTenantsManage,

    // Billing and reports
    #[serde(rename = "billing.view")]
    BillingView,
    #[serde(rename = "billing.create")]
    BillingCreate,
    #[serde(rename = "billing.edit")]
    BillingEdit,
    #[serde(rename = "reports.view")]
    ReportsView,
    #[serde(rename = "reports.create")]
    ReportsCreate,

    // Vacancies
    #[serde(rename = "vacancy.view")]
    VacancyView,
    #[serde(rename = "vacancy.edit")]
    VacancyEdit,

    // Calendar
    #[serde(rename = "calendar.view")]
    CalendarView,
    #[serde(rename = "calendar.create")]
    CalendarCreate,
    #[serde(rename = "calendar.edit")]
    CalendarEdit,

    // Emergency contact
    #[serde(rename = "emergency.view")]
    EmergencyView,
    #[serde(rename = "emergency.create")]
    EmergencyCreate,
    #[serde(rename = "emergency.respond")]
    EmergencyRespond,
}

impl Permission {
    pub const ALL: [Permission; 33] = [
        Permission::UsersView,
        Permission::UsersCreate,
        Permission::UsersEdit,
        Permission::UsersDelete,
        Permission::BookingsViewOwn,
        Permission::BookingsViewAll,
        Permission::BookingsCreate,
        Permission::BookingsApprove,
        Permission::BookingsCancel,
        Permission::BookingsEdit,
        Permission::RequestsViewOwn,
        Permission::RequestsViewAll,
        Permission::RequestsCreate,
        Permission::RequestsApprove,
        Permission::RequestsReject,
        Permission::RequestsEdit,
        Permission::BuildingView,
        Permission::BuildingEdit,
        Permission::BuildingRoomsManage,
        Permission::BuildingTenantsManage,
        Permission::BillingView,
        Permission::BillingCreate,
        Permission::BillingEdit,
        Permission::ReportsView,
        Permission::ReportsCreate,
        Permission::VacancyView,
        Permission::VacancyEdit,
        Permission::CalendarView,
        Permission::CalendarCreate,
        Permission::CalendarEdit,
        Permission::EmergencyView,
        Permission::EmergencyCreate,
        Permission::EmergencyRespond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UsersView => "users.view",
            Permission::UsersCreate => "users.create",
            Permission::UsersEdit => "users.edit",
            Permission::UsersDelete => "users.delete",
            Permission::BookingsViewOwn => "bookings.view.own",
            Permission::BookingsViewAll => "bookings.view.all",
            Permission::BookingsCreate => "bookings.create",
            Permission::BookingsApprove => "bookings.approve",
            Permission::BookingsCancel => "bookings.cancel",
            Permission::BookingsEdit => "bookings.edit",
            Permission::RequestsViewOwn => "requests.view.own",
            Permission::RequestsViewAll => "requests.view.all",
            Permission::RequestsCreate => "requests.create",
            Permission::RequestsApprove => "requests.approve",
            Permission::RequestsReject => "requests.reject",
            Permission::RequestsEdit => "requests.edit",
            Permission::BuildingView => "building.view",
            Permission::BuildingEdit => "building.edit",
            Permission::BuildingRoomsManage => "building.rooms.manage",
            Permission::BuildingTenantsManage => "building.tenants.manage",
            Permission::BillingView => "billing.view",
            Permission::BillingCreate => "billing.create",
            Permission::BillingEdit => "billing.edit",
            Permission::ReportsView => "reports.view",
            Permission::ReportsCreate => "reports.create",
            Permission::VacancyView => "vacancy.view",
            Permission::VacancyEdit => "vacancy.edit",
            Permission::CalendarView => "calendar.view",
            Permission::CalendarCreate => "calendar.create",
            Permission::CalendarEdit => "calendar.edit",
            Permission::EmergencyView => "emergency.view",
            Permission::EmergencyCreate => "emergency.create",
            Permission::EmergencyRespond => "emergency.respond",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

// ---------------------------------------------------------------------------
// Role table
// ---------------------------------------------------------------------------

#[rustfmt::skip]
const OWNER_PERMISSIONS: &[Permission] = &[
    UsersView, UsersCreate, UsersEdit, UsersDelete,
    BookingsViewAll, BookingsApprove, BookingsCancel, BookingsEdit,
    RequestsViewAll, RequestsApprove, RequestsReject, RequestsEdit,
    BuildingView, BuildingEdit, BuildingRoomsManage, BuildingTenantsManage,
    BillingView, BillingCreate, BillingEdit,
    ReportsView, ReportsCreate,
    VacancyView, VacancyEdit,
    CalendarView, CalendarCreate, CalendarEdit,
    EmergencyView, EmergencyCreate, EmergencyRespond,
];

#[rustfmt::skip]
const MGMT_PERMISSIONS: &[Permission] = &[
    UsersView,
    BookingsViewAll, BookingsApprove, BookingsCancel,
    RequestsViewAll, RequestsApprove, RequestsReject,
    BuildingView, BuildingRoomsManage, BuildingTenantsManage,
    BillingView, BillingCreate,
    ReportsView, ReportsCreate,
    CalendarView, CalendarCreate, CalendarEdit,
    EmergencyView, EmergencyRespond,
];

#[rustfmt::skip]
const TENANT_PERMISSIONS: &[Permission] = &[
    BookingsViewOwn, BookingsCreate,
    RequestsViewOwn, RequestsCreate,
    BuildingView,
    CalendarView,
    EmergencyCreate,
];

const BROKER_PERMISSIONS: &[Permission] = &[BuildingView, VacancyView, CalendarView];

/// Default permission list of a role, in declaration order
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Owner => OWNER_PERMISSIONS,
        Role::Mgmt => MGMT_PERMISSIONS,
        Role::Tenant => TENANT_PERMISSIONS,
        Role::Broker => BROKER_PERMISSIONS,
    }
}

static ROLE_PERMISSION_SETS: Lazy<HashMap<Role, HashSet<Permission>>> = Lazy::new(|| {
    Role::ALL
        .iter()
        .map(|role| (*role, role_permissions(*role).iter().copied().collect()))
        .collect()
});

/// Permission checks for one role
#[derive(Debug, Clone, Copy)]
pub struct PermissionSet {
    role: Role,
}

impl PermissionSet {
    pub fn for_role(role: Role) -> Self {
        Self { role }
    }

    fn set(&self) -> Option<&'static HashSet<Permission>> {
        ROLE_PERMISSION_SETS.get(&self.role)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.set().map_or(false, |set| set.contains(&permission))
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// Check `<resource>.<action>`, e.g. `can_access("bookings", "approve")`
    pub fn can_access(&self, resource: &str, action: &str) -> bool {
        format!("{}.{}", resource, action)
            .parse::<Permission>()
            .map(|p| self.has_permission(p))
            .unwrap_or(false)
    }

    pub fn list(&self) -> Vec<Permission> {
        role_permissions(self.role).to_vec()
    }
}
