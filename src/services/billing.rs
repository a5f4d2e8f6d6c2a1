//! Tenant invoicing and payment tracking

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    config::BillingConfig,
    error::AppResult,
    models::{
        billing::{
            check_dates, CreateInvoice, Invoice, InvoiceItem, InvoiceQuery, InvoiceStatus,
            Payment, RecordPayment, Revenue, RevenueQuery, UpdateInvoice,
        },
        new_id,
        notification::{NewNotification, NotificationLevel},
    },
    repository::Repository,
};

use super::notifications::{notify, NotificationSink};

#[derive(Clone)]
pub struct BillingService {
    repository: Repository,
    tax_rate: Decimal,
    notifier: Arc<dyn NotificationSink>,
}

impl BillingService {
    pub fn new(
        repository: Repository,
        config: &BillingConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            tax_rate: config.tax_rate,
            notifier,
        }
    }

    pub fn list(&self, query: &InvoiceQuery) -> AppResult<Vec<Invoice>> {
        self.repository.billing.list(query)
    }

    pub fn get(&self, id: &str) -> AppResult<Invoice> {
        self.repository.billing.get(id)
    }

    pub fn overdue(&self, today: NaiveDate) -> AppResult<Vec<Invoice>> {
        self.repository.billing.overdue(today)
    }

    /// Totals of invoices paid within the range
    pub fn revenue(&self, query: &RevenueQuery) -> AppResult<Revenue> {
        let paid = self.repository.billing.list(&InvoiceQuery {
            tenant_id: None,
            status: Some(InvoiceStatus::Paid),
        })?;
        let in_range: Vec<&Invoice> = paid
            .iter()
            .filter(|i| {
                i.paid_date.map_or(false, |d| {
                    query.from.map_or(true, |from| d >= from) && query.to.map_or(true, |to| d <= to)
                })
            })
            .collect();
        Ok(Revenue {
            from: query.from,
            to: query.to,
            invoice_count: in_range.len(),
            total: in_range.iter().map(|i| i.total).sum(),
        })
    }

    /// New invoices start as drafts with the next number of their issue year
    pub fn create(&self, data: CreateInvoice) -> AppResult<Invoice> {
        data.validate()?;
        check_dates(data.period_start, data.period_end, data.issue_date, data.due_date)?;
        let tenant = self.repository.buildings.get_tenant(&data.tenant_id)?;
        let items = data
            .items
            .iter()
            .map(InvoiceItem::new)
            .collect::<AppResult<Vec<_>>>()?;

        let now = Utc::now();
        let mut invoice = Invoice {
            id: new_id("invoice"),
            invoice_number: String::new(),
            tenant_id: tenant.id,
            tenant_name: tenant.company_name,
            period_start: data.period_start,
            period_end: data.period_end,
            items,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            issue_date: data.issue_date,
            due_date: data.due_date,
            paid_date: None,
            notes: data.notes,
            created_at: now,
            updated_at: now,
        };
        invoice.recalculate(self.tax_rate);

        let invoice = self.repository.billing.create(invoice)?;
        tracing::info!(
            invoice_id = %invoice.id,
            number = %invoice.invoice_number,
            tenant_id = %invoice.tenant_id,
            total = %invoice.total,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub fn update(&self, id: &str, data: &UpdateInvoice) -> AppResult<Invoice> {
        data.validate()?;
        self.repository
            .billing
            .update(id, |i| i.apply(data, self.tax_rate, Utc::now()))
    }

    pub fn set_status(&self, id: &str, status: InvoiceStatus) -> AppResult<Invoice> {
        let today = Local::now().date_naive();
        let invoice = self
            .repository
            .billing
            .update(id, |i| i.set_status(status, today, Utc::now()))?;
        tracing::info!(invoice_id = %id, status = %status, "Invoice status changed");

        match status {
            InvoiceStatus::Sent => self.notify_tenant(
                &invoice,
                NotificationLevel::Info,
                "New invoice",
                format!(
                    "Invoice {} for {} is due on {}.",
                    invoice.invoice_number, invoice.total, invoice.due_date
                ),
            ),
            InvoiceStatus::Overdue => self.notify_tenant(
                &invoice,
                NotificationLevel::Warning,
                "Invoice overdue",
                format!(
                    "Invoice {} was due on {}; {} remains unpaid.",
                    invoice.invoice_number,
                    invoice.due_date,
                    invoice.balance()
                ),
            ),
            _ => {}
        }
        Ok(invoice)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        let invoice = self.repository.billing.delete(id)?;
        tracing::info!(invoice_id = %id, number = %invoice.invoice_number, "Invoice deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    pub fn payments(&self, invoice_id: &str) -> AppResult<Vec<Payment>> {
        self.repository.billing.get(invoice_id)?;
        self.repository.billing.payments_by_invoice(invoice_id)
    }

    /// Record a payment; the invoice turns paid once fully covered
    pub fn add_payment(&self, invoice_id: &str, data: RecordPayment) -> AppResult<(Payment, Invoice)> {
        let now = Utc::now();
        let payment = Payment {
            id: new_id("payment"),
            invoice_id: invoice_id.to_string(),
            amount: data.amount,
            payment_date: data.payment_date.unwrap_or_else(|| Local::now().date_naive()),
            method: data.method,
            reference: data.reference,
            notes: data.notes,
            created_at: now,
        };
        let (payment, invoice) = self.repository.billing.add_payment(payment, now)?;
        tracing::info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            balance = %invoice.balance(),
            "Payment recorded"
        );
        Ok((payment, invoice))
    }

    /// Tell every portal account of the invoiced tenant
    fn notify_tenant(&self, invoice: &Invoice, level: NotificationLevel, title: &str, message: String) {
        let users = match self.repository.users.by_tenant(&invoice.tenant_id) {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(invoice_id = %invoice.id, error = %e, "Could not resolve tenant users");
                return;
            }
        };
        for user in users {
            notify(
                self.notifier.as_ref(),
                NewNotification::general(&user.id, level, title, message.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{
            billing::{InvoiceItemInput, InvoiceItemType, PaymentMethod},
            building::{Tenant, TenantStatus},
            user::{Role, User},
        },
        services::notifications::MockNotificationSink,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(sink: MockNotificationSink) -> BillingService {
        let repository = Repository::new();
        let now = Utc::now();
        repository
            .buildings
            .create_tenant(Tenant {
                id: "tenant-1".into(),
                name: "Tech Solutions".into(),
                company_name: "Tech Solutions Inc.".into(),
                email: "info@techsolutions.example".into(),
                phone: "03-1111-2222".into(),
                unit_ids: vec![],
                contract_start_date: date(2023, 4, 1),
                contract_end_date: date(2026, 3, 31),
                rent: Decimal::from(320_000),
                deposit: Decimal::from(640_000),
                maintenance_fee: Decimal::from(32_000),
                contact_person: "Jiro Yamada".into(),
                business_type: "IT".into(),
                employee_count: 25,
                status: TenantStatus::Active,
                notes: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        repository
            .users
            .insert(User {
                id: "tenant-1".into(),
                email: "tenant@example.com".into(),
                name: "Jiro Yamada".into(),
                role: Role::Tenant,
                building_id: None,
                tenant_id: Some("tenant-1".into()),
                password: None,
            })
            .unwrap();
        BillingService::new(repository, &BillingConfig::default(), Arc::new(sink))
    }

    fn create(issue: NaiveDate) -> CreateInvoice {
        CreateInvoice {
            tenant_id: "tenant-1".into(),
            period_start: date(2024, 3, 1),
            period_end: date(2024, 3, 31),
            items: vec![
                InvoiceItemInput {
                    description: "Rent (201)".into(),
                    quantity: 1,
                    unit_price: Decimal::from(320_000),
                    item_type: InvoiceItemType::Rent,
                    unit_id: Some("unit-1".into()),
                },
                InvoiceItemInput {
                    description: "Common area fee".into(),
                    quantity: 1,
                    unit_price: Decimal::from(32_000),
                    item_type: InvoiceItemType::Maintenance,
                    unit_id: None,
                },
            ],
            issue_date: issue,
            due_date: issue + chrono::Duration::days(30),
            notes: None,
        }
    }

    fn payment(amount: i64) -> RecordPayment {
        RecordPayment {
            amount: Decimal::from(amount),
            payment_date: Some(date(2024, 3, 20)),
            method: PaymentMethod::BankTransfer,
            reference: None,
            notes: None,
        }
    }

    #[test]
    fn create_numbers_and_totals_the_invoice() {
        let service = service(MockNotificationSink::new());
        let first = service.create(create(date(2024, 2, 25))).unwrap();
        let second = service.create(create(date(2024, 3, 25))).unwrap();

        assert_eq!(first.invoice_number, "2024-001");
        assert_eq!(second.invoice_number, "2024-002");
        assert_eq!(first.status, InvoiceStatus::Draft);
        assert_eq!(first.tenant_name, "Tech Solutions Inc.");
        assert_eq!(first.subtotal, Decimal::from(352_000));
        assert_eq!(first.tax, Decimal::from(35_200));
        assert_eq!(first.total, Decimal::from(387_200));
    }

    #[test]
    fn unknown_tenant_and_inverted_dates_are_refused() {
        let service = service(MockNotificationSink::new());
        let mut data = create(date(2024, 2, 25));
        data.tenant_id = "tenant-9".into();
        assert!(matches!(service.create(data), Err(AppError::NotFound(_))));

        let mut data = create(date(2024, 2, 25));
        data.due_date = date(2024, 2, 1);
        assert!(matches!(service.create(data), Err(AppError::Validation(_))));
    }

    #[test]
    fn sending_and_overdue_notify_tenant_users() {
        let mut sink = MockNotificationSink::new();
        sink.expect_deliver()
            .withf(|n| n.user_id == "tenant-1" && n.level == NotificationLevel::Info)
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_deliver()
            .withf(|n| n.user_id == "tenant-1" && n.level == NotificationLevel::Warning)
            .times(1)
            .returning(|_| Ok(()));
        let service = service(sink);

        let invoice = service.create(create(date(2024, 2, 25))).unwrap();
        service.set_status(&invoice.id, InvoiceStatus::Issued).unwrap();
        service.set_status(&invoice.id, InvoiceStatus::Sent).unwrap();
        assert_eq!(service.overdue(date(2024, 4, 1)).unwrap().len(), 1);
        assert!(service.overdue(date(2024, 3, 1)).unwrap().is_empty());

        let overdue = service.set_status(&invoice.id, InvoiceStatus::Overdue).unwrap();
        assert_eq!(overdue.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn payments_settle_and_count_as_revenue() {
        let service = service(MockNotificationSink::new());
        let invoice = service.create(create(date(2024, 2, 25))).unwrap();

        assert!(matches!(
            service.add_payment(&invoice.id, payment(100)),
            Err(AppError::BusinessRule(_))
        ));
        service.set_status(&invoice.id, InvoiceStatus::Issued).unwrap();

        let (_, partial) = service.add_payment(&invoice.id, payment(200_000)).unwrap();
        assert_eq!(partial.status, InvoiceStatus::Issued);
        let (_, paid) = service.add_payment(&invoice.id, payment(187_200)).unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.paid_date, Some(date(2024, 3, 20)));
        assert_eq!(service.payments(&invoice.id).unwrap().len(), 2);

        let revenue = service
            .revenue(&RevenueQuery {
                from: Some(date(2024, 3, 1)),
                to: Some(date(2024, 3, 31)),
            })
            .unwrap();
        assert_eq!(revenue.invoice_count, 1);
        assert_eq!(revenue.total, Decimal::from(387_200));

        let empty = service
            .revenue(&RevenueQuery {
                from: Some(date(2024, 4, 1)),
                to: None,
            })
            .unwrap();
        assert_eq!(empty.total, Decimal::ZERO);
    }

    #[test]
    fn refused_payment_is_not_stored() {
        let service = service(MockNotificationSink::new());
        let invoice = service.create(create(date(2024, 2, 25))).unwrap();
        assert!(service.add_payment(&invoice.id, payment(1_000)).is_err());
        assert!(service.payments(&invoice.id).unwrap().is_empty());
    }

    #[test]
    fn only_drafts_and_cancelled_invoices_are_deleted() {
        let service = service(MockNotificationSink::new());
        let invoice = service.create(create(date(2024, 2, 25))).unwrap();
        service.set_status(&invoice.id, InvoiceStatus::Issued).unwrap();
        assert!(matches!(service.delete(&invoice.id), Err(AppError::Conflict(_))));

        service.set_status(&invoice.id, InvoiceStatus::Cancelled).unwrap();
        service.delete(&invoice.id).unwrap();
        assert!(matches!(service.get(&invoice.id), Err(AppError::NotFound(_))));
    }
}
