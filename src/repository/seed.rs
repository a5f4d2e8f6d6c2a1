//! Demo data loaded at startup when `seed.enabled` is set

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        billing::{Invoice, InvoiceItem, InvoiceItemType, InvoiceStatus, Payment, PaymentMethod},
        booking::{Booking, BookingStatus, Room},
        building::{Building, Floor, Tenant, TenantStatus, Unit, UnitType},
        incident::{
            ContactAvailability, EmergencyContact, Incident, IncidentCategory, IncidentSeverity,
            IncidentStatus, IncidentUpdate,
        },
        request::{Request, RequestComment, RequestPriority, RequestStatus, RequestType},
        user::{Role, User},
    },
};

use super::Repository;

/// Shared by every seeded account
pub const DEMO_PASSWORD: &str = "password";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn hm(h: u32, m: u32) -> AppResult<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
        .ok_or_else(|| AppError::Internal(format!("Invalid seed time {}:{}", h, m)))
}

fn ymd(y: i32, m: u32, d: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::Internal(format!("Invalid seed date {}-{}-{}", y, m, d)))
}

/// Fill the stores. Bookings are placed on `today` and the day after.
pub fn load(repository: &Repository, password_hash: &str, today: NaiveDate) -> AppResult<()> {
    load_users(repository, password_hash)?;
    load_buildings(repository)?;
    load_rooms(repository)?;
    load_bookings(repository, today)?;
    load_requests(repository)?;
    load_emergency(repository)?;
    load_billing(repository)?;

    tracing::info!(
        users = repository.users.list()?.len(),
        rooms = repository.bookings.list_rooms()?.len(),
        invoices = repository.billing.list(&Default::default())?.len(),
        "Demo data loaded"
    );
    Ok(())
}

fn load_users(repository: &Repository, password_hash: &str) -> AppResult<()> {
    let users = [
        ("owner-1", "owner@example.com", "Taro Tanaka", Role::Owner, Some("building-1"), None),
        ("mgmt-1", "mgmt@example.com", "Hanako Sato", Role::Mgmt, Some("building-1"), None),
        (
            "tenant-1",
            "tenant@example.com",
            "Jiro Yamada",
            Role::Tenant,
            Some("building-1"),
            Some("tenant-1"),
        ),
        ("broker-1", "broker@example.com", "Saburo Suzuki", Role::Broker, None, None),
    ];
    for (id, email, name, role, building_id, tenant_id) in users {
        repository.users.insert(User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            building_id: building_id.map(str::to_string),
            tenant_id: tenant_id.map(str::to_string),
            password: Some(password_hash.to_string()),
        })?;
    }
    Ok(())
}

fn load_buildings(repository: &Repository) -> AppResult<()> {
    let now = Utc::now();
    let buildings = &repository.buildings;

    buildings.insert_building(Building {
        id: "building-1".into(),
        name: "JBC Building".into(),
        address: "1-1-1 Roppongi, Minato-ku, Tokyo".into(),
        floors: 10,
        total_units: 50,
        occupied_units: 42,
        construction_year: 2018,
        total_area: 5000.0,
        management_company: "JBC Management Co., Ltd.".into(),
        owner: "JBC Real Estate Co., Ltd.".into(),
        description: Some("Modern office building in central Roppongi".into()),
        facilities: strings(&["Elevator", "Parking", "Meeting rooms", "Reception", "Security"]),
        created_at: now,
        updated_at: now,
    })?;

    for (id, number, units, occupied, area, description) in [
        ("floor-1", 1, 5, 4, 500.0, "Entrance, reception and retail"),
        ("floor-2", 2, 6, 5, 480.0, "Office space"),
        ("floor-3", 3, 6, 6, 480.0, "Office space and meeting rooms"),
    ] {
        buildings.create_floor(Floor {
            id: id.into(),
            building_id: "building-1".into(),
            floor_number: number,
            floor_name: format!("{}F", number),
            total_units: units,
            occupied_units: occupied,
            floor_area: area,
            floor_plan: None,
            description: Some(description.into()),
            created_at: now,
            updated_at: now,
        })?;
    }

    let contract_start = ymd(2024, 1, 1)?;
    let contract_end = ymd(2025, 12, 31)?;

    buildings.create_unit(Unit {
        id: "unit-1".into(),
        building_id: "building-1".into(),
        floor_id: "floor-2".into(),
        unit_number: "201".into(),
        unit_area: 80.0,
        rent: Decimal::from(320_000),
        deposit: Decimal::from(640_000),
        maintenance_fee: Decimal::from(32_000),
        is_occupied: true,
        tenant_id: Some("tenant-1".into()),
        contract_start_date: Some(contract_start),
        contract_end_date: Some(contract_end),
        unit_type: UnitType::Office,
        facilities: strings(&["Air conditioning", "Internet", "Phone line"]),
        description: Some("Bright corner office".into()),
        created_at: now,
        updated_at: now,
    })?;
    buildings.create_unit(Unit {
        id: "unit-2".into(),
        building_id: "building-1".into(),
        floor_id: "floor-2".into(),
        unit_number: "202".into(),
        unit_area: 60.0,
        rent: Decimal::from(240_000),
        deposit: Decimal::from(480_000),
        maintenance_fee: Decimal::from(24_000),
        is_occupied: false,
        tenant_id: None,
        contract_start_date: None,
        contract_end_date: None,
        unit_type: UnitType::Office,
        facilities: strings(&["Air conditioning", "Internet"]),
        description: Some("Mid-sized office space".into()),
        created_at: now,
        updated_at: now,
    })?;

    buildings.create_tenant(Tenant {
        id: "tenant-1".into(),
        name: "Taro Tanaka".into(),
        company_name: "Tech Solution Inc.".into(),
        email: "tanaka@techsolution.co.jp".into(),
        phone: "03-1234-5678".into(),
        unit_ids: strings(&["unit-1"]),
        contract_start_date: contract_start,
        contract_end_date: contract_end,
        rent: Decimal::from(320_000),
        deposit: Decimal::from(640_000),
        maintenance_fee: Decimal::from(32_000),
        contact_person: "Taro Tanaka".into(),
        business_type: "IT services".into(),
        employee_count: 15,
        status: TenantStatus::Active,
        notes: Some("Good standing".into()),
        created_at: now,
        updated_at: now,
    })?;
    Ok(())
}

fn load_rooms(repository: &Repository) -> AppResult<()> {
    let rooms = [
        ("room-1", "Conference Room A", 3, 12, &["Projector", "Whiteboard", "Video conferencing"][..], 3000),
        ("room-2", "Meeting Room B", 3, 6, &["Monitor", "Whiteboard"][..], 2000),
        ("room-3", "Seminar Hall", 1, 40, &["Projector", "Microphone", "Stage"][..], 8000),
    ];
    for (id, name, floor, capacity, equipment, rate) in rooms {
        repository.bookings.insert_room(Room {
            id: id.into(),
            name: name.into(),
            floor,
            capacity,
            equipment: strings(equipment),
            hourly_rate: Some(Decimal::from(rate)),
            is_active: true,
        })?;
    }
    Ok(())
}

fn load_bookings(repository: &Repository, today: NaiveDate) -> AppResult<()> {
    let now = Utc::now();
    let tomorrow = today + Duration::days(1);

    let bookings = [
        ("booking-1", "room-1", "Quarterly review", today, (10, 0), (11, 0), BookingStatus::Approved),
        ("booking-2", "room-1", "Client meeting", today, (13, 0), (14, 0), BookingStatus::Pending),
        ("booking-3", "room-2", "Team standup", tomorrow, (9, 30), (10, 0), BookingStatus::Pending),
    ];
    for (id, room_id, title, day, (sh, sm), (eh, em), status) in bookings {
        let approved = status == BookingStatus::Approved;
        repository.bookings.insert(Booking {
            id: id.into(),
            room_id: room_id.into(),
            user_id: "tenant-1".into(),
            title: title.into(),
            description: None,
            start_time: day.and_time(hm(sh, sm)?),
            end_time: day.and_time(hm(eh, em)?),
            status,
            rejection_reason: None,
            approved_by: approved.then(|| "mgmt-1".to_string()),
            approved_at: approved.then_some(now),
            created_at: now,
            updated_at: now,
        })?;
    }
    Ok(())
}

fn load_requests(repository: &Repository) -> AppResult<()> {
    let now = Utc::now();

    repository.requests.insert(Request {
        id: "req-1".into(),
        request_type: RequestType::Maintenance,
        title: "Air conditioning leak in 201".into(),
        description: "Water is dripping from the ceiling unit near the window.".into(),
        priority: RequestPriority::High,
        status: RequestStatus::Submitted,
        submitter_id: "tenant-1".into(),
        submitter_name: "Jiro Yamada".into(),
        assigned_to: None,
        reviewed_by: None,
        reviewed_at: None,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        completed_at: None,
        due_date: None,
        estimated_cost: None,
        actual_cost: None,
        location: Some("Unit 201".into()),
        documents: Vec::new(),
        comments: Vec::new(),
        created_at: now - Duration::days(2),
        updated_at: now - Duration::days(2),
    })?;

    repository.requests.insert(Request {
        id: "req-2".into(),
        request_type: RequestType::Construction,
        title: "Partition wall installation".into(),
        description: "Install a glass partition to create a small meeting space.".into(),
        priority: RequestPriority::Medium,
        status: RequestStatus::UnderReview,
        submitter_id: "tenant-1".into(),
        submitter_name: "Jiro Yamada".into(),
        assigned_to: Some("mgmt-1".into()),
        reviewed_by: Some("mgmt-1".into()),
        reviewed_at: Some(now - Duration::hours(3)),
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        completed_at: None,
        due_date: None,
        estimated_cost: Some(Decimal::from(450_000)),
        actual_cost: None,
        location: Some("Unit 201".into()),
        documents: Vec::new(),
        comments: vec![RequestComment {
            id: "comment-1".into(),
            user_id: "mgmt-1".into(),
            user_name: "Hanako Sato".into(),
            content: "Waiting for the contractor's quote.".into(),
            created_at: now - Duration::hours(3),
        }],
        created_at: now - Duration::days(1),
        updated_at: now - Duration::hours(3),
    })?;
    Ok(())
}

fn load_emergency(repository: &Repository) -> AppResult<()> {
    let now = Utc::now();
    let contacts = [
        (
            "contact-1",
            "Security office",
            "Security",
            "03-1234-5678",
            "security@example.com",
            ContactAvailability::AllDay,
            1,
            None,
        ),
        (
            "contact-2",
            "Management office",
            "Management",
            "03-1234-5679",
            "management@example.com",
            ContactAvailability::BusinessHours,
            2,
            Some("mgmt-1"),
        ),
        (
            "contact-3",
            "Facility center",
            "Facilities",
            "03-1234-5680",
            "facility@example.com",
            ContactAvailability::AllDay,
            3,
            None,
        ),
    ];
    for (id, name, role, phone, email, availability, priority, user_id) in contacts {
        repository.incidents.insert_contact(EmergencyContact {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            phone: phone.into(),
            email: email.into(),
            availability,
            priority,
            building_id: None,
            user_id: user_id.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        })?;
    }

    repository.incidents.insert(Incident {
        id: "incident-1".into(),
        title: "Water leak in 3F corridor".into(),
        description: "Water is leaking from the ceiling of the east corridor on the 3rd floor.".into(),
        category: IncidentCategory::Water,
        severity: IncidentSeverity::Medium,
        location: "3F east corridor".into(),
        building_id: "building-1".into(),
        reported_by: "tenant-1".into(),
        reporter_name: "Jiro Yamada".into(),
        reporter_phone: Some("090-1234-5678".into()),
        status: IncidentStatus::Acknowledged,
        assigned_to: Some("contact-3".into()),
        responded_by: strings(&["mgmt-1"]),
        response_time: Some(now - Duration::minutes(30)),
        resolved_at: None,
        updates: vec![IncidentUpdate {
            id: "update-1".into(),
            user_id: "mgmt-1".into(),
            user_name: "Hanako Sato".into(),
            content: "Facility center contacted, on site within 30 minutes.".into(),
            timestamp: now - Duration::minutes(25),
        }],
        notified_contacts: strings(&["contact-2", "contact-3"]),
        created_at: now - Duration::minutes(45),
        updated_at: now - Duration::minutes(25),
    })?;
    Ok(())
}

fn item(
    id: &str,
    description: &str,
    price: i64,
    item_type: InvoiceItemType,
    unit_id: Option<&str>,
) -> InvoiceItem {
    InvoiceItem {
        id: id.into(),
        description: description.into(),
        quantity: 1,
        unit_price: Decimal::from(price),
        amount: Decimal::from(price),
        item_type,
        unit_id: unit_id.map(str::to_string),
    }
}

fn load_billing(repository: &Repository) -> AppResult<()> {
    let now = Utc::now();

    repository.billing.insert(Invoice {
        id: "invoice-1".into(),
        invoice_number: "2024-001".into(),
        tenant_id: "tenant-1".into(),
        tenant_name: "Tech Solution Inc.".into(),
        period_start: ymd(2024, 2, 1)?,
        period_end: ymd(2024, 2, 29)?,
        items: vec![
            item("item-1", "Rent (unit 201)", 320_000, InvoiceItemType::Rent, Some("unit-1")),
            item("item-2", "Common area fee", 32_000, InvoiceItemType::Maintenance, None),
            item("item-3", "Parking", 15_000, InvoiceItemType::Parking, None),
        ],
        subtotal: Decimal::from(367_000),
        tax: Decimal::from(36_700),
        total: Decimal::from(403_700),
        amount_paid: Decimal::ZERO,
        status: InvoiceStatus::Issued,
        issue_date: ymd(2024, 1, 25)?,
        due_date: ymd(2024, 2, 25)?,
        paid_date: None,
        notes: None,
        created_at: now,
        updated_at: now,
    })?;

    repository.billing.insert(Invoice {
        id: "invoice-2".into(),
        invoice_number: "2024-002".into(),
        tenant_id: "tenant-1".into(),
        tenant_name: "Tech Solution Inc.".into(),
        period_start: ymd(2024, 1, 1)?,
        period_end: ymd(2024, 1, 31)?,
        items: vec![
            item("item-4", "Rent (unit 201)", 320_000, InvoiceItemType::Rent, Some("unit-1")),
            item("item-5", "Common area fee", 32_000, InvoiceItemType::Maintenance, None),
        ],
        subtotal: Decimal::from(352_000),
        tax: Decimal::from(35_200),
        total: Decimal::from(387_200),
        amount_paid: Decimal::from(387_200),
        status: InvoiceStatus::Paid,
        issue_date: ymd(2023, 12, 25)?,
        due_date: ymd(2024, 1, 25)?,
        paid_date: Some(ymd(2024, 1, 20)?),
        notes: None,
        created_at: now,
        updated_at: now,
    })?;

    repository.billing.insert_payment(Payment {
        id: "payment-1".into(),
        invoice_id: "invoice-2".into(),
        amount: Decimal::from(387_200),
        payment_date: ymd(2024, 1, 20)?,
        method: PaymentMethod::BankTransfer,
        reference: Some("TXN-20240120-001".into()),
        notes: None,
        created_at: now,
    })?;
    Ok(())
}
