//! Building, floor, unit and tenant stores
//!
//! Lock order: buildings, floors, units, tenants.

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::building::{Building, Floor, Occupancy, Tenant, Unit},
};

use super::Table;

#[derive(Clone)]
pub struct BuildingsRepository {
    buildings: Table<Building>,
    floors: Table<Floor>,
    units: Table<Unit>,
    tenants: Table<Tenant>,
}

impl BuildingsRepository {
    pub fn new() -> Self {
        Self {
            buildings: Table::new("Building"),
            floors: Table::new("Floor"),
            units: Table::new("Unit"),
            tenants: Table::new("Tenant"),
        }
    }

    // -----------------------------------------------------------------------
    // Buildings
    // -----------------------------------------------------------------------

    pub fn list_buildings(&self) -> AppResult<Vec<Building>> {
        self.buildings.list(|_| true)
    }

    pub fn get_building(&self, id: &str) -> AppResult<Building> {
        self.buildings.fetch(id)
    }

    pub fn insert_building(&self, building: Building) -> AppResult<Building> {
        self.buildings.insert(&building.id.clone(), building)
    }

    pub fn update_building<F>(&self, id: &str, f: F) -> AppResult<Building>
    where
        F: FnOnce(&mut Building) -> AppResult<()>,
    {
        self.buildings.update(id, f)
    }

    pub fn delete_building(&self, id: &str) -> AppResult<Building> {
        let mut buildings = self.buildings.write()?;
        if !buildings.contains_key(id) {
            return Err(AppError::NotFound(format!("Building {} not found", id)));
        }
        if self.floors.read()?.values().any(|f| f.building_id == id) {
            return Err(AppError::Conflict(format!(
                "Building {} still has floors",
                id
            )));
        }
        buildings
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Building {} not found", id)))
    }

    /// Occupancy computed from the building's units
    pub fn occupancy(&self, building_id: &str) -> AppResult<Occupancy> {
        if !self.buildings.exists(building_id)? {
            return Err(AppError::NotFound(format!("Building {} not found", building_id)));
        }
        let units = self.units.read()?;
        Ok(Occupancy::from_units(building_id, units.values()))
    }

    // -----------------------------------------------------------------------
    // Floors
    // -----------------------------------------------------------------------

    /// Floors of a building, lowest first
    pub fn floors_by_building(&self, building_id: &str) -> AppResult<Vec<Floor>> {
        let mut floors = self.floors.list(|f| f.building_id == building_id)?;
        floors.sort_by_key(|f| f.floor_number);
        Ok(floors)
    }

    pub fn get_floor(&self, id: &str) -> AppResult<Floor> {
        self.floors.fetch(id)
    }

    pub fn create_floor(&self, floor: Floor) -> AppResult<Floor> {
        let buildings = self.buildings.read()?;
        if !buildings.contains_key(&floor.building_id) {
            return Err(AppError::NotFound(format!(
                "Building {} not found",
                floor.building_id
            )));
        }
        self.floors.insert(&floor.id.clone(), floor)
    }

    pub fn update_floor<F>(&self, id: &str, f: F) -> AppResult<Floor>
    where
        F: FnOnce(&mut Floor) -> AppResult<()>,
    {
        self.floors.update(id, f)
    }

    pub fn delete_floor(&self, id: &str) -> AppResult<Floor> {
        let mut floors = self.floors.write()?;
        if !floors.contains_key(id) {
            return Err(AppError::NotFound(format!("Floor {} not found", id)));
        }
        if self.units.read()?.values().any(|u| u.floor_id == id) {
            return Err(AppError::Conflict(format!("Floor {} still has units", id)));
        }
        floors
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Floor {} not found", id)))
    }

    // -----------------------------------------------------------------------
    // Units
    // -----------------------------------------------------------------------

    pub fn units_by_floor(&self, floor_id: &str) -> AppResult<Vec<Unit>> {
        self.units.list(|u| u.floor_id == floor_id)
    }

    /// Unoccupied units of a building
    pub fn available_units(&self, building_id: &str) -> AppResult<Vec<Unit>> {
        self.units
            .list(|u| u.building_id == building_id && !u.is_occupied)
    }

    pub fn get_unit(&self, id: &str) -> AppResult<Unit> {
        self.units.fetch(id)
    }

    /// Insert a unit whose floor exists and belongs to the unit's building
    pub fn create_unit(&self, unit: Unit) -> AppResult<Unit> {
        let floors = self.floors.read()?;
        let floor = floors
            .get(&unit.floor_id)
            .ok_or_else(|| AppError::NotFound(format!("Floor {} not found", unit.floor_id)))?;
        if floor.building_id != unit.building_id {
            return Err(AppError::Validation(format!(
                "Floor {} does not belong to building {}",
                unit.floor_id, unit.building_id
            )));
        }
        self.units.insert(&unit.id.clone(), unit)
    }

    pub fn update_unit<F>(&self, id: &str, f: F) -> AppResult<Unit>
    where
        F: FnOnce(&mut Unit) -> AppResult<()>,
    {
        self.units.update(id, f)
    }

    pub fn delete_unit(&self, id: &str) -> AppResult<Unit> {
        self.units.remove(id)
    }

    // -----------------------------------------------------------------------
    // Tenants
    // -----------------------------------------------------------------------

    pub fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        self.tenants.list(|_| true)
    }

    /// Tenants leasing at least one unit of the building
    pub fn tenants_by_building(&self, building_id: &str) -> AppResult<Vec<Tenant>> {
        let units: HashSet<String> = self
            .units
            .read()?
            .values()
            .filter(|u| u.building_id == building_id)
            .map(|u| u.id.clone())
            .collect();
        self.tenants
            .list(|t| t.unit_ids.iter().any(|id| units.contains(id)))
    }

    pub fn get_tenant(&self, id: &str) -> AppResult<Tenant> {
        self.tenants.fetch(id)
    }

    fn check_units_exist(&self, unit_ids: &[String]) -> AppResult<()> {
        let units = self.units.read()?;
        match unit_ids.iter().find(|id| !units.contains_key(id.as_str())) {
            Some(missing) => Err(AppError::Validation(format!("Unit {} does not exist", missing))),
            None => Ok(()),
        }
    }

    pub fn create_tenant(&self, tenant: Tenant) -> AppResult<Tenant> {
        self.check_units_exist(&tenant.unit_ids)?;
        self.tenants.insert(&tenant.id.clone(), tenant)
    }

    pub fn update_tenant<F>(&self, id: &str, unit_ids: Option<&[String]>, f: F) -> AppResult<Tenant>
    where
        F: FnOnce(&mut Tenant) -> AppResult<()>,
    {
        if let Some(unit_ids) = unit_ids {
            self.check_units_exist(unit_ids)?;
        }
        self.tenants.update(id, f)
    }

    pub fn delete_tenant(&self, id: &str) -> AppResult<Tenant> {
        self.tenants.remove(id)
    }
}

impl Default for BuildingsRepository {
    fn default() -> Self {
        Self::new()
    }
}
