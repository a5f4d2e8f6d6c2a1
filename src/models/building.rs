//! Building, floor, unit and tenant records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Number of floors
    pub floors: i32,
    pub total_units: i32,
    pub occupied_units: i32,
    pub construction_year: i32,
    /// Square meters
    pub total_area: f64,
    pub management_company: String,
    pub owner: String,
    pub description: Option<String>,
    pub facilities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBuilding {
    #[validate(length(min = 1, message = "Building name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub floors: i32,
    #[serde(default)]
    pub total_units: i32,
    #[serde(default)]
    pub occupied_units: i32,
    pub construction_year: i32,
    pub total_area: f64,
    pub management_company: String,
    pub owner: String,
    pub description: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBuilding {
    #[validate(length(min = 1, message = "Building name cannot be empty"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub floors: Option<i32>,
    pub total_units: Option<i32>,
    pub occupied_units: Option<i32>,
    pub construction_year: Option<i32>,
    pub total_area: Option<f64>,
    pub management_company: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub facilities: Option<Vec<String>>,
}

impl Building {
    pub fn apply(&mut self, data: &UpdateBuilding, now: DateTime<Utc>) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(ref v) = data.$field {
                    self.$field = v.clone();
                }
            };
        }
        set!(name);
        set!(address);
        set!(floors);
        set!(total_units);
        set!(occupied_units);
        set!(construction_year);
        set!(total_area);
        set!(management_company);
        set!(owner);
        set!(facilities);
        if data.description.is_some() {
            self.description = data.description.clone();
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Floor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Floor {
    pub id: String,
    pub building_id: String,
    pub floor_number: i32,
    /// Display name ("1F", "B1", ...)
    pub floor_name: String,
    pub total_units: i32,
    pub occupied_units: i32,
    pub floor_area: f64,
    /// Floor plan URL
    pub floor_plan: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFloor {
    #[validate(length(min = 1, message = "Building is required"))]
    pub building_id: String,
    pub floor_number: i32,
    #[validate(length(min = 1, message = "Floor name is required"))]
    pub floor_name: String,
    #[serde(default)]
    pub total_units: i32,
    #[serde(default)]
    pub occupied_units: i32,
    pub floor_area: f64,
    pub floor_plan: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFloor {
    pub floor_number: Option<i32>,
    #[validate(length(min = 1, message = "Floor name cannot be empty"))]
    pub floor_name: Option<String>,
    pub total_units: Option<i32>,
    pub occupied_units: Option<i32>,
    pub floor_area: Option<f64>,
    pub floor_plan: Option<String>,
    pub description: Option<String>,
}

impl Floor {
    pub fn apply(&mut self, data: &UpdateFloor, now: DateTime<Utc>) {
        if let Some(n) = data.floor_number {
            self.floor_number = n;
        }
        if let Some(ref name) = data.floor_name {
            self.floor_name = name.clone();
        }
        if let Some(n) = data.total_units {
            self.total_units = n;
        }
        if let Some(n) = data.occupied_units {
            self.occupied_units = n;
        }
        if let Some(area) = data.floor_area {
            self.floor_area = area;
        }
        if data.floor_plan.is_some() {
            self.floor_plan = data.floor_plan.clone();
        }
        if data.description.is_some() {
            self.description = data.description.clone();
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Office,
    Retail,
    Warehouse,
    Parking,
    Other,
}

/// Rentable unit on a floor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Unit {
    pub id: String,
    pub building_id: String,
    pub floor_id: String,
    /// "201", "A-1", ...
    pub unit_number: String,
    pub unit_area: f64,
    /// Monthly rent
    #[schema(value_type = String)]
    pub rent: Decimal,
    #[schema(value_type = String)]
    pub deposit: Decimal,
    #[schema(value_type = String)]
    pub maintenance_fee: Decimal,
    pub is_occupied: bool,
    pub tenant_id: Option<String>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,
    pub unit_type: UnitType,
    pub facilities: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUnit {
    #[validate(length(min = 1, message = "Building is required"))]
    pub building_id: String,
    #[validate(length(min = 1, message = "Floor is required"))]
    pub floor_id: String,
    #[validate(length(min = 1, message = "Unit number is required"))]
    pub unit_number: String,
    pub unit_area: f64,
    #[schema(value_type = String)]
    pub rent: Decimal,
    #[schema(value_type = String)]
    pub deposit: Decimal,
    #[schema(value_type = String)]
    pub maintenance_fee: Decimal,
    #[serde(default)]
    pub is_occupied: bool,
    pub tenant_id: Option<String>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,
    pub unit_type: UnitType,
    #[serde(default)]
    pub facilities: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUnit {
    #[validate(length(min = 1, message = "Unit number cannot be empty"))]
    pub unit_number: Option<String>,
    pub unit_area: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub rent: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub deposit: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub maintenance_fee: Option<Decimal>,
    pub is_occupied: Option<bool>,
    pub tenant_id: Option<String>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,
    pub unit_type: Option<UnitType>,
    pub facilities: Option<Vec<String>>,
    pub description: Option<String>,
}

impl Unit {
    pub fn apply(&mut self, data: &UpdateUnit, now: DateTime<Utc>) {
        if let Some(ref number) = data.unit_number {
            self.unit_number = number.clone();
        }
        if let Some(area) = data.unit_area {
            self.unit_area = area;
        }
        if let Some(rent) = data.rent {
            self.rent = rent;
        }
        if let Some(deposit) = data.deposit {
            self.deposit = deposit;
        }
        if let Some(fee) = data.maintenance_fee {
            self.maintenance_fee = fee;
        }
        if let Some(occupied) = data.is_occupied {
            self.is_occupied = occupied;
        }
        if data.tenant_id.is_some() {
            self.tenant_id = data.tenant_id.clone();
        }
        if data.contract_start_date.is_some() {
            self.contract_start_date = data.contract_start_date;
        }
        if data.contract_end_date.is_some() {
            self.contract_end_date = data.contract_end_date;
        }
        if let Some(unit_type) = data.unit_type {
            self.unit_type = unit_type;
        }
        if let Some(ref facilities) = data.facilities {
            self.facilities = facilities.clone();
        }
        if data.description.is_some() {
            self.description = data.description.clone();
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Tenant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    /// Notice of departure given
    Notice,
    Expired,
    Terminated,
}

/// Company leasing one or more units
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    /// Leased units (may span floors)
    pub unit_ids: Vec<String>,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: NaiveDate,
    #[schema(value_type = String)]
    pub rent: Decimal,
    #[schema(value_type = String)]
    pub deposit: Decimal,
    #[schema(value_type = String)]
    pub maintenance_fee: Decimal,
    pub contact_person: String,
    pub business_type: String,
    pub employee_count: i32,
    pub status: TenantStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTenant {
    #[validate(length(min = 1, message = "Tenant name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub unit_ids: Vec<String>,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: NaiveDate,
    #[schema(value_type = String)]
    pub rent: Decimal,
    #[schema(value_type = String)]
    pub deposit: Decimal,
    #[schema(value_type = String)]
    pub maintenance_fee: Decimal,
    pub contact_person: String,
    pub business_type: String,
    #[serde(default)]
    pub employee_count: i32,
    pub status: Option<TenantStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTenant {
    #[validate(length(min = 1, message = "Tenant name cannot be empty"))]
    pub name: Option<String>,
    pub company_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_ids: Option<Vec<String>>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub rent: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub deposit: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub maintenance_fee: Option<Decimal>,
    pub contact_person: Option<String>,
    pub business_type: Option<String>,
    pub employee_count: Option<i32>,
    pub status: Option<TenantStatus>,
    pub notes: Option<String>,
}

impl Tenant {
    pub fn apply(&mut self, data: &UpdateTenant, now: DateTime<Utc>) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(ref v) = data.$field {
                    self.$field = v.clone();
                }
            };
        }
        set!(name);
        set!(company_name);
        set!(email);
        set!(phone);
        set!(unit_ids);
        set!(contract_start_date);
        set!(contract_end_date);
        set!(rent);
        set!(deposit);
        set!(maintenance_fee);
        set!(contact_person);
        set!(business_type);
        set!(employee_count);
        set!(status);
        if data.notes.is_some() {
            self.notes = data.notes.clone();
        }
        self.updated_at = now;
    }
}

/// Occupancy figures of a building, computed from its units
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Occupancy {
    pub building_id: String,
    pub total_units: usize,
    pub occupied_units: usize,
    /// Percentage, 0 when the building has no units
    pub occupancy_rate: f64,
}

impl Occupancy {
    pub fn from_units<'a, I>(building_id: &str, units: I) -> Self
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        let (total, occupied) = units
            .into_iter()
            .filter(|u| u.building_id == building_id)
            .fold((0usize, 0usize), |(t, o), u| (t + 1, o + usize::from(u.is_occupied)));
        let occupancy_rate = if total > 0 {
            occupied as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            building_id: building_id.to_string(),
            total_units: total,
            occupied_units: occupied,
            occupancy_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, building: &str, occupied: bool) -> Unit {
        let now = Utc::now();
        Unit {
            id: id.into(),
            building_id: building.into(),
            floor_id: "floor-2".into(),
            unit_number: id.into(),
            unit_area: 60.0,
            rent: Decimal::from(240000),
            deposit: Decimal::from(480000),
            maintenance_fee: Decimal::from(24000),
            is_occupied: occupied,
            tenant_id: None,
            contract_start_date: None,
            contract_end_date: None,
            unit_type: UnitType::Office,
            facilities: vec![],
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn occupancy_counts_only_the_building() {
        let units = vec![
            unit("u1", "building-1", true),
            unit("u2", "building-1", false),
            unit("u3", "building-1", true),
            unit("u4", "building-1", true),
            unit("u5", "building-2", false),
        ];
        let occ = Occupancy::from_units("building-1", &units);
        assert_eq!(occ.total_units, 4);
        assert_eq!(occ.occupied_units, 3);
        assert!((occ.occupancy_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_building_has_zero_rate() {
        let occ = Occupancy::from_units("building-9", &[]);
        assert_eq!(occ.occupancy_rate, 0.0);
    }
}
