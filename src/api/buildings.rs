//! Building registry endpoints: buildings, floors, units and tenants

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        building::{
            Building, CreateBuilding, CreateFloor, CreateTenant, CreateUnit, Floor, Occupancy,
            Tenant, Unit, UpdateBuilding, UpdateFloor, UpdateTenant, UpdateUnit,
        },
        permission::Permission,
    },
};

use super::AuthenticatedUser;

const VACANCY: [Permission; 2] = [Permission::VacancyView, Permission::BuildingView];

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// List buildings
#[utoipa::path(
    get,
    path = "/buildings",
    tag = "buildings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of buildings", body = Vec<Building>)
    )
)]
pub async fn list_buildings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Building>>> {
    claims.require(Permission::BuildingView)?;

    let buildings = state.services.buildings.list()?;
    Ok(Json(buildings))
}

/// Get building details by ID
#[utoipa::path(
    get,
    path = "/buildings/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Building details", body = Building),
        (status = 404, description = "Building not found")
    )
)]
pub async fn get_building(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Building>> {
    claims.require(Permission::BuildingView)?;

    let building = state.services.buildings.get(&id)?;
    Ok(Json(building))
}

/// Create a building
#[utoipa::path(
    post,
    path = "/buildings",
    tag = "buildings",
    security(("bearer_auth" = [])),
    request_body = CreateBuilding,
    responses(
        (status = 201, description = "Building created", body = Building),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_building(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBuilding>,
) -> AppResult<(StatusCode, Json<Building>)> {
    claims.require(Permission::BuildingEdit)?;

    let building = state.services.buildings.create(data)?;
    Ok((StatusCode::CREATED, Json(building)))
}

/// Update a building
#[utoipa::path(
    put,
    path = "/buildings/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    request_body = UpdateBuilding,
    responses(
        (status = 200, description = "Building updated", body = Building),
        (status = 404, description = "Building not found")
    )
)]
pub async fn update_building(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateBuilding>,
) -> AppResult<Json<Building>> {
    claims.require(Permission::BuildingEdit)?;

    let building = state.services.buildings.update(&id, &data)?;
    Ok(Json(building))
}

/// Delete a building without floors
#[utoipa::path(
    delete,
    path = "/buildings/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 204, description = "Building deleted"),
        (status = 404, description = "Building not found"),
        (status = 409, description = "Building still has floors")
    )
)]
pub async fn delete_building(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BuildingEdit)?;

    state.services.buildings.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Floors of a building, lowest first
#[utoipa::path(
    get,
    path = "/buildings/{id}/floors",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Floors", body = Vec<Floor>),
        (status = 404, description = "Building not found")
    )
)]
pub async fn building_floors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Floor>>> {
    claims.require(Permission::BuildingView)?;

    let floors = state.services.buildings.floors_by_building(&id)?;
    Ok(Json(floors))
}

/// Tenants leasing units in a building
#[utoipa::path(
    get,
    path = "/buildings/{id}/tenants",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Tenants", body = Vec<Tenant>),
        (status = 404, description = "Building not found")
    )
)]
pub async fn building_tenants(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Tenant>>> {
    claims.require(Permission::BuildingTenantsManage)?;

    let tenants = state.services.buildings.tenants_by_building(&id)?;
    Ok(Json(tenants))
}

/// Unoccupied units of a building
#[utoipa::path(
    get,
    path = "/buildings/{id}/available-units",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Vacant units", body = Vec<Unit>),
        (status = 404, description = "Building not found")
    )
)]
pub async fn available_units(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Unit>>> {
    claims.require_any(&VACANCY)?;

    let units = state.services.buildings.available_units(&id)?;
    Ok(Json(units))
}

/// Occupancy rate of a building
#[utoipa::path(
    get,
    path = "/buildings/{id}/occupancy",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Building ID")
    ),
    responses(
        (status = 200, description = "Occupancy figures", body = Occupancy),
        (status = 404, description = "Building not found")
    )
)]
pub async fn occupancy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Occupancy>> {
    claims.require_any(&VACANCY)?;

    let occupancy = state.services.buildings.occupancy(&id)?;
    Ok(Json(occupancy))
}

// ---------------------------------------------------------------------------
// Floors
// ---------------------------------------------------------------------------

/// Get floor details by ID
#[utoipa::path(
    get,
    path = "/floors/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Floor ID")
    ),
    responses(
        (status = 200, description = "Floor details", body = Floor),
        (status = 404, description = "Floor not found")
    )
)]
pub async fn get_floor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Floor>> {
    claims.require(Permission::BuildingView)?;

    let floor = state.services.buildings.get_floor(&id)?;
    Ok(Json(floor))
}

/// Create a floor in an existing building
#[utoipa::path(
    post,
    path = "/floors",
    tag = "buildings",
    security(("bearer_auth" = [])),
    request_body = CreateFloor,
    responses(
        (status = 201, description = "Floor created", body = Floor),
        (status = 404, description = "Building not found")
    )
)]
pub async fn create_floor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateFloor>,
) -> AppResult<(StatusCode, Json<Floor>)> {
    claims.require(Permission::BuildingEdit)?;

    let floor = state.services.buildings.create_floor(data)?;
    Ok((StatusCode::CREATED, Json(floor)))
}

/// Update a floor
#[utoipa::path(
    put,
    path = "/floors/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Floor ID")
    ),
    request_body = UpdateFloor,
    responses(
        (status = 200, description = "Floor updated", body = Floor),
        (status = 404, description = "Floor not found")
    )
)]
pub async fn update_floor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateFloor>,
) -> AppResult<Json<Floor>> {
    claims.require(Permission::BuildingEdit)?;

    let floor = state.services.buildings.update_floor(&id, &data)?;
    Ok(Json(floor))
}

/// Delete a floor without units
#[utoipa::path(
    delete,
    path = "/floors/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Floor ID")
    ),
    responses(
        (status = 204, description = "Floor deleted"),
        (status = 409, description = "Floor still has units")
    )
)]
pub async fn delete_floor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BuildingEdit)?;

    state.services.buildings.delete_floor(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Units on a floor
#[utoipa::path(
    get,
    path = "/floors/{id}/units",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Floor ID")
    ),
    responses(
        (status = 200, description = "Units", body = Vec<Unit>),
        (status = 404, description = "Floor not found")
    )
)]
pub async fn floor_units(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Unit>>> {
    claims.require(Permission::BuildingView)?;

    let units = state.services.buildings.units_by_floor(&id)?;
    Ok(Json(units))
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Get unit details by ID
#[utoipa::path(
    get,
    path = "/units/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Unit ID")
    ),
    responses(
        (status = 200, description = "Unit details", body = Unit),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn get_unit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Unit>> {
    claims.require(Permission::BuildingView)?;

    let unit = state.services.buildings.get_unit(&id)?;
    Ok(Json(unit))
}

/// Create a unit on a floor of the given building
#[utoipa::path(
    post,
    path = "/units",
    tag = "buildings",
    security(("bearer_auth" = [])),
    request_body = CreateUnit,
    responses(
        (status = 201, description = "Unit created", body = Unit),
        (status = 400, description = "Floor belongs to another building"),
        (status = 404, description = "Floor not found")
    )
)]
pub async fn create_unit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateUnit>,
) -> AppResult<(StatusCode, Json<Unit>)> {
    claims.require(Permission::BuildingEdit)?;

    let unit = state.services.buildings.create_unit(data)?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// Update a unit
#[utoipa::path(
    put,
    path = "/units/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Unit ID")
    ),
    request_body = UpdateUnit,
    responses(
        (status = 200, description = "Unit updated", body = Unit),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn update_unit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateUnit>,
) -> AppResult<Json<Unit>> {
    claims.require(Permission::BuildingEdit)?;

    let unit = state.services.buildings.update_unit(&id, &data)?;
    Ok(Json(unit))
}

/// Delete a unit
#[utoipa::path(
    delete,
    path = "/units/{id}",
    tag = "buildings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Unit ID")
    ),
    responses(
        (status = 204, description = "Unit deleted"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn delete_unit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BuildingEdit)?;

    state.services.buildings.delete_unit(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

/// List tenants
#[utoipa::path(
    get,
    path = "/tenants",
    tag = "tenants",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of tenants", body = Vec<Tenant>),
        (status = 403, description = "Missing building.tenants.manage")
    )
)]
pub async fn list_tenants(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Tenant>>> {
    claims.require(Permission::BuildingTenantsManage)?;

    let tenants = state.services.buildings.list_tenants()?;
    Ok(Json(tenants))
}

/// Get tenant details by ID
#[utoipa::path(
    get,
    path = "/tenants/{id}",
    tag = "tenants",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Tenant details", body = Tenant),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn get_tenant(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Tenant>> {
    claims.require(Permission::BuildingTenantsManage)?;

    let tenant = state.services.buildings.get_tenant(&id)?;
    Ok(Json(tenant))
}

/// Register a tenant
#[utoipa::path(
    post,
    path = "/tenants",
    tag = "tenants",
    security(("bearer_auth" = [])),
    request_body = CreateTenant,
    responses(
        (status = 201, description = "Tenant created", body = Tenant),
        (status = 400, description = "Invalid input or unknown unit")
    )
)]
pub async fn create_tenant(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTenant>,
) -> AppResult<(StatusCode, Json<Tenant>)> {
    claims.require(Permission::BuildingTenantsManage)?;

    let tenant = state.services.buildings.create_tenant(data)?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// Update a tenant
#[utoipa::path(
    put,
    path = "/tenants/{id}",
    tag = "tenants",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Tenant ID")
    ),
    request_body = UpdateTenant,
    responses(
        (status = 200, description = "Tenant updated", body = Tenant),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn update_tenant(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(data): Json<UpdateTenant>,
) -> AppResult<Json<Tenant>> {
    claims.require(Permission::BuildingTenantsManage)?;

    let tenant = state.services.buildings.update_tenant(&id, &data)?;
    Ok(Json(tenant))
}

/// Delete a tenant
#[utoipa::path(
    delete,
    path = "/tenants/{id}",
    tag = "tenants",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Tenant ID")
    ),
    responses(
        (status = 204, description = "Tenant deleted"),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn delete_tenant(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require(Permission::BuildingTenantsManage)?;

    state.services.buildings.delete_tenant(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
