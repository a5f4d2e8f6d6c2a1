//! Building registry service

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        building::{
            Building, CreateBuilding, CreateFloor, CreateTenant, CreateUnit, Floor, Occupancy,
            Tenant, TenantStatus, Unit, UpdateBuilding, UpdateFloor, UpdateTenant, UpdateUnit,
        },
        new_id,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BuildingsService {
    repository: Repository,
}

impl BuildingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Buildings

    pub fn list(&self) -> AppResult<Vec<Building>> {
        self.repository.buildings.list_buildings()
    }

    pub fn get(&self, id: &str) -> AppResult<Building> {
        self.repository.buildings.get_building(id)
    }

    pub fn create(&self, data: CreateBuilding) -> AppResult<Building> {
        data.validate()?;
        let now = Utc::now();
        let building = Building {
            id: new_id("building"),
            name: data.name,
            address: data.address,
            floors: data.floors,
            total_units: data.total_units,
            occupied_units: data.occupied_units,
            construction_year: data.construction_year,
            total_area: data.total_area,
            management_company: data.management_company,
            owner: data.owner,
            description: data.description,
            facilities: data.facilities,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(building_id = %building.id, "Building created");
        self.repository.buildings.insert_building(building)
    }

    pub fn update(&self, id: &str, data: &UpdateBuilding) -> AppResult<Building> {
        data.validate()?;
        self.repository.buildings.update_building(id, |b| {
            b.apply(data, Utc::now());
            Ok(())
        })
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.buildings.delete_building(id)?;
        tracing::info!(building_id = %id, "Building deleted");
        Ok(())
    }

    pub fn occupancy(&self, building_id: &str) -> AppResult<Occupancy> {
        self.repository.buildings.occupancy(building_id)
    }

    pub fn available_units(&self, building_id: &str) -> AppResult<Vec<Unit>> {
        self.repository.buildings.get_building(building_id)?;
        self.repository.buildings.available_units(building_id)
    }

    pub fn tenants_by_building(&self, building_id: &str) -> AppResult<Vec<Tenant>> {
        self.repository.buildings.get_building(building_id)?;
        self.repository.buildings.tenants_by_building(building_id)
    }

    // Floors

    pub fn floors_by_building(&self, building_id: &str) -> AppResult<Vec<Floor>> {
        self.repository.buildings.get_building(building_id)?;
        self.repository.buildings.floors_by_building(building_id)
    }

    pub fn get_floor(&self, id: &str) -> AppResult<Floor> {
        self.repository.buildings.get_floor(id)
    }

    pub fn create_floor(&self, data: CreateFloor) -> AppResult<Floor> {
        data.validate()?;
        let now = Utc::now();
        let floor = Floor {
            id: new_id("floor"),
            building_id: data.building_id,
            floor_number: data.floor_number,
            floor_name: data.floor_name,
            total_units: data.total_units,
            occupied_units: data.occupied_units,
            floor_area: data.floor_area,
            floor_plan: data.floor_plan,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        self.repository.buildings.create_floor(floor)
    }

    pub fn update_floor(&self, id: &str, data: &UpdateFloor) -> AppResult<Floor> {
        data.validate()?;
        self.repository.buildings.update_floor(id, |f| {
            f.apply(data, Utc::now());
            Ok(())
        })
    }

    pub fn delete_floor(&self, id: &str) -> AppResult<()> {
        self.repository.buildings.delete_floor(id)?;
        Ok(())
    }

    // Units

    pub fn units_by_floor(&self, floor_id: &str) -> AppResult<Vec<Unit>> {
        self.repository.buildings.get_floor(floor_id)?;
        self.repository.buildings.units_by_floor(floor_id)
    }

    pub fn get_unit(&self, id: &str) -> AppResult<Unit> {
        self.repository.buildings.get_unit(id)
    }

    pub fn create_unit(&self, data: CreateUnit) -> AppResult<Unit> {
        data.validate()?;
        let now = Utc::now();
        let unit = Unit {
            id: new_id("unit"),
            building_id: data.building_id,
            floor_id: data.floor_id,
            unit_number: data.unit_number,
            unit_area: data.unit_area,
            rent: data.rent,
            deposit: data.deposit,
            maintenance_fee: data.maintenance_fee,
            is_occupied: data.is_occupied,
            tenant_id: data.tenant_id,
            contract_start_date: data.contract_start_date,
            contract_end_date: data.contract_end_date,
            unit_type: data.unit_type,
            facilities: data.facilities,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        self.repository.buildings.create_unit(unit)
    }

    pub fn update_unit(&self, id: &str, data: &UpdateUnit) -> AppResult<Unit> {
        data.validate()?;
        self.repository.buildings.update_unit(id, |u| {
            u.apply(data, Utc::now());
            Ok(())
        })
    }

    pub fn delete_unit(&self, id: &str) -> AppResult<()> {
        self.repository.buildings.delete_unit(id)?;
        Ok(())
    }

    // Tenants

    pub fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        self.repository.buildings.list_tenants()
    }

    pub fn get_tenant(&self, id: &str) -> AppResult<Tenant> {
        self.repository.buildings.get_tenant(id)
    }

    pub fn create_tenant(&self, data: CreateTenant) -> AppResult<Tenant> {
        data.validate()?;
        check_contract_dates(data.contract_start_date, data.contract_end_date)?;
        let now = Utc::now();
        let tenant = Tenant {
            id: new_id("tenant"),
            name: data.name,
            company_name: data.company_name,
            email: data.email,
            phone: data.phone,
            unit_ids: data.unit_ids,
            contract_start_date: data.contract_start_date,
            contract_end_date: data.contract_end_date,
            rent: data.rent,
            deposit: data.deposit,
            maintenance_fee: data.maintenance_fee,
            contact_person: data.contact_person,
            business_type: data.business_type,
            employee_count: data.employee_count,
            status: data.status.unwrap_or(TenantStatus::Active),
            notes: data.notes,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(tenant_id = %tenant.id, company = %tenant.company_name, "Tenant created");
        self.repository.buildings.create_tenant(tenant)
    }

    pub fn update_tenant(&self, id: &str, data: &UpdateTenant) -> AppResult<Tenant> {
        data.validate()?;
        self.repository
            .buildings
            .update_tenant(id, data.unit_ids.as_deref(), |t| {
                t.apply(data, Utc::now());
                check_contract_dates(t.contract_start_date, t.contract_end_date)
            })
    }

    pub fn delete_tenant(&self, id: &str) -> AppResult<()> {
        self.repository.buildings.delete_tenant(id)?;
        Ok(())
    }
}

fn check_contract_dates(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation(
            "Contract end date must not precede its start date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::seed;
    use chrono::NaiveDate;

    fn service() -> BuildingsService {
        let repository = Repository::new();
        let today = NaiveDate::from_ymd_opt(2030, 6, 3).unwrap();
        seed::load(&repository, "unused-hash", today).unwrap();
        BuildingsService::new(repository)
    }

    fn floor(building_id: &str) -> CreateFloor {
        CreateFloor {
            building_id: building_id.into(),
            floor_number: 4,
            floor_name: "4F".into(),
            total_units: 0,
            occupied_units: 0,
            floor_area: 480.0,
            floor_plan: None,
            description: None,
        }
    }

    #[test]
    fn floor_needs_existing_building() {
        let service = service();
        assert!(matches!(
            service.create_floor(floor("building-9")),
            Err(AppError::NotFound(_))
        ));
        let created = service.create_floor(floor("building-1")).unwrap();
        let floors = service.floors_by_building("building-1").unwrap();
        assert_eq!(floors.last().map(|f| f.id.as_str()), Some(created.id.as_str()));
    }

    #[test]
    fn parents_with_children_cannot_be_deleted() {
        let service = service();
        assert!(matches!(service.delete("building-1"), Err(AppError::Conflict(_))));
        assert!(matches!(service.delete_floor("floor-2"), Err(AppError::Conflict(_))));
        service.delete_floor("floor-3").unwrap();
    }

    #[test]
    fn vacancy_helpers() {
        let service = service();
        let available = service.available_units("building-1").unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].unit_number, "202");

        let occupancy = service.occupancy("building-1").unwrap();
        assert_eq!(occupancy.total_units, 2);
        assert_eq!(occupancy.occupied_units, 1);
        assert!((occupancy.occupancy_rate - 50.0).abs() < f64::EPSILON);

        let tenants = service.tenants_by_building("building-1").unwrap();
        assert_eq!(tenants.len(), 1);
    }

    #[test]
    fn tenant_units_must_exist() {
        let service = service();
        let update = UpdateTenant {
            name: None,
            company_name: None,
            email: None,
            phone: None,
            unit_ids: Some(vec!["unit-1".into(), "unit-404".into()]),
            contract_start_date: None,
            contract_end_date: None,
            rent: None,
            deposit: None,
            maintenance_fee: None,
            contact_person: None,
            business_type: None,
            employee_count: None,
            status: None,
            notes: None,
        };
        assert!(matches!(
            service.update_tenant("tenant-1", &update),
            Err(AppError::Validation(_))
        ));
        assert_eq!(service.get_tenant("tenant-1").unwrap().unit_ids, vec!["unit-1"]);
    }

    #[test]
    fn tenant_update_keeps_contract_dates_ordered() {
        let service = service();
        let before = service.get_tenant("tenant-1").unwrap();
        let update = UpdateTenant {
            name: None,
            company_name: None,
            email: None,
            phone: None,
            unit_ids: None,
            contract_start_date: None,
            contract_end_date: before.contract_start_date.pred_opt(),
            rent: None,
            deposit: None,
            maintenance_fee: None,
            contact_person: None,
            business_type: None,
            employee_count: None,
            status: None,
            notes: None,
        };
        assert!(matches!(
            service.update_tenant("tenant-1", &update),
            Err(AppError::Validation(_))
        ));
        let after = service.get_tenant("tenant-1").unwrap();
        assert_eq!(after.contract_end_date, before.contract_end_date);
    }
}
