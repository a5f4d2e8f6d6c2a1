//! Tenant invoices and the payments recorded against them

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::new_id;

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn allowed_transitions(&self) -> &'static [InvoiceStatus] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Issued, Cancelled],
            Issued => &[Sent, Paid, Overdue, Cancelled],
            Sent => &[Paid, Overdue, Cancelled],
            Overdue => &[Paid, Cancelled],
            Paid | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Billed to the tenant and still awaiting payment
    pub fn is_outstanding(&self) -> bool {
        matches!(self, InvoiceStatus::Issued | InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceItemType {
    Rent,
    Maintenance,
    Utility,
    Parking,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// quantity x unit_price
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub item_type: InvoiceItemType,
    pub unit_id: Option<String>,
}

impl InvoiceItem {
    pub fn new(data: &InvoiceItemInput) -> AppResult<Self> {
        let description = data.description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "Item description is required".to_string(),
            ));
        }
        if data.quantity == 0 || data.unit_price.is_sign_negative() {
            return Err(AppError::Validation(format!(
                "Item \"{}\" needs a positive quantity and a non-negative price",
                description
            )));
        }
        Ok(Self {
            id: new_id("item"),
            description: description.to_string(),
            quantity: data.quantity,
            unit_price: data.unit_price,
            amount: data.unit_price * Decimal::from(data.quantity),
            item_type: data.item_type,
            unit_id: data.unit_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Invoice {
    pub id: String,
    /// `YYYY-NNN`, sequential per issue year
    pub invoice_number: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub items: Vec<InvoiceItem>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    /// Sum of recorded payments
    #[schema(value_type = String)]
    pub amount_paid: Decimal,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Recompute subtotal, tax and total from the items
    pub fn recalculate(&mut self, tax_rate: Decimal) {
        self.subtotal = self.items.iter().map(|i| i.amount).sum();
        self.tax = (self.subtotal * tax_rate).round_dp(0);
        self.total = self.subtotal + self.tax;
    }

    pub fn balance(&self) -> Decimal {
        self.total - self.amount_paid
    }

    /// Past its due date and not settled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_outstanding() && self.due_date < today
    }

    pub fn set_status(&mut self, next: InvoiceStatus, today: NaiveDate, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Invoice {} is {} and cannot become {}",
                self.invoice_number, self.status, next
            )));
        }
        self.status = next;
        if next == InvoiceStatus::Paid {
            self.paid_date = Some(today);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Record a payment; the invoice is paid once the balance reaches zero
    pub fn record_payment(&mut self, amount: Decimal, paid_on: NaiveDate, now: DateTime<Utc>) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }
        if !self.status.is_outstanding() {
            return Err(AppError::BusinessRule(format!(
                "Invoice {} is {} and does not accept payments",
                self.invoice_number, self.status
            )));
        }
        self.amount_paid += amount;
        self.updated_at = now;
        if self.balance() <= Decimal::ZERO {
            self.set_status(InvoiceStatus::Paid, paid_on, now)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, data: &UpdateInvoice, tax_rate: Decimal, now: DateTime<Utc>) -> AppResult<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(AppError::BusinessRule(format!(
                "Invoice {} is {} and can no longer be edited",
                self.invoice_number, self.status
            )));
        }
        if let Some(ref items) = data.items {
            self.items = items.iter().map(InvoiceItem::new).collect::<AppResult<_>>()?;
            self.recalculate(tax_rate);
        }
        if let Some(d) = data.period_start {
            self.period_start = d;
        }
        if let Some(d) = data.period_end {
            self.period_end = d;
        }
        if let Some(d) = data.issue_date {
            self.issue_date = d;
        }
        if let Some(d) = data.due_date {
            self.due_date = d;
        }
        if data.notes.is_some() {
            self.notes = data.notes.clone();
        }
        check_dates(self.period_start, self.period_end, self.issue_date, self.due_date)?;
        self.updated_at = now;
        Ok(())
    }
}

/// Period must not be inverted and payment cannot be due before issue
pub fn check_dates(
    period_start: NaiveDate,
    period_end: NaiveDate,
    issue_date: NaiveDate,
    due_date: NaiveDate,
) -> AppResult<()> {
    if period_end < period_start {
        return Err(AppError::Validation(
            "Billing period ends before it starts".to_string(),
        ));
    }
    if due_date < issue_date {
        return Err(AppError::Validation(
            "Due date must not precede the issue date".to_string(),
        ));
    }
    Ok(())
}

/// Next `YYYY-NNN` number given the numbers already in use
pub fn next_invoice_number<'a>(issue_date: NaiveDate, existing: impl Iterator<Item = &'a str>) -> String {
    let prefix = format!("{}-", issue_date.year());
    let last = existing
        .filter_map(|n| n.strip_prefix(&prefix))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix, last + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    CreditCard,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Recorded payment with the invoice it was applied to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub invoice: Invoice,
}

/// Paid invoice totals over a paid-date range
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Revenue {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub invoice_count: usize,
    #[schema(value_type = String)]
    pub total: Decimal,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItemInput {
    pub description: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[serde(rename = "type")]
    pub item_type: InvoiceItemType,
    pub unit_id: Option<String>,
}

fn one() -> u32 {
    1
}

/// Create invoice payload; the invoice starts as a draft
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvoice {
    #[validate(length(min = 1, message = "Tenant is required"))]
    pub tenant_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[validate(length(min = 1, message = "An invoice needs at least one item"))]
    pub items: Vec<InvoiceItemInput>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

/// Update payload (draft invoices only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoice {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    #[validate(length(min = 1, message = "An invoice needs at least one item"))]
    pub items: Option<Vec<InvoiceItemInput>>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetInvoiceStatus {
    pub status: InvoiceStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPayment {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct InvoiceQuery {
    pub tenant_id: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceQuery {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.tenant_id.as_ref().map_or(true, |t| &invoice.tenant_id == t)
            && self.status.map_or(true, |s| invoice.status == s)
    }
}

/// Paid-date range, both ends inclusive and optional
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RevenueQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(price: i64, quantity: u32) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "Rent".into(),
            quantity,
            unit_price: Decimal::from(price),
            item_type: InvoiceItemType::Rent,
            unit_id: None,
        }
    }

    fn invoice(status: InvoiceStatus) -> Invoice {
        let now = Utc::now();
        let mut invoice = Invoice {
            id: "invoice-1".into(),
            invoice_number: "2024-001".into(),
            tenant_id: "tenant-1".into(),
            tenant_name: "Tech Solutions".into(),
            period_start: date(2024, 2, 1),
            period_end: date(2024, 2, 29),
            items: vec![
                InvoiceItem::new(&item(320_000, 1)).unwrap(),
                InvoiceItem::new(&item(15_000, 1)).unwrap(),
            ],
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            status,
            issue_date: date(2024, 1, 25),
            due_date: date(2024, 2, 25),
            paid_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        invoice.recalculate(Decimal::new(10, 2));
        invoice
    }

    #[test]
    fn totals_include_tax() {
        let i = invoice(InvoiceStatus::Draft);
        assert_eq!(i.subtotal, Decimal::from(335_000));
        assert_eq!(i.tax, Decimal::from(33_500));
        assert_eq!(i.total, Decimal::from(368_500));

        let line = InvoiceItem::new(&item(1_200, 3)).unwrap();
        assert_eq!(line.amount, Decimal::from(3_600));
        assert!(InvoiceItem::new(&item(1_200, 0)).is_err());
    }

    #[test]
    fn partial_payments_settle_the_invoice() {
        let mut i = invoice(InvoiceStatus::Sent);
        let paid_on = date(2024, 2, 20);
        i.record_payment(Decimal::from(200_000), paid_on, Utc::now()).unwrap();
        assert_eq!(i.status, InvoiceStatus::Sent);
        assert_eq!(i.balance(), Decimal::from(168_500));

        i.record_payment(Decimal::from(168_500), paid_on, Utc::now()).unwrap();
        assert_eq!(i.status, InvoiceStatus::Paid);
        assert_eq!(i.paid_date, Some(paid_on));
        assert!(matches!(
            i.record_payment(Decimal::ONE, paid_on, Utc::now()),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn drafts_take_no_payments_and_amounts_must_be_positive() {
        let mut i = invoice(InvoiceStatus::Draft);
        assert!(matches!(
            i.record_payment(Decimal::ONE, date(2024, 2, 1), Utc::now()),
            Err(AppError::BusinessRule(_))
        ));
        let mut i = invoice(InvoiceStatus::Issued);
        assert!(matches!(
            i.record_payment(Decimal::ZERO, date(2024, 2, 1), Utc::now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn status_follows_the_billing_cycle() {
        let today = date(2024, 3, 1);
        let mut i = invoice(InvoiceStatus::Draft);
        assert!(matches!(
            i.set_status(InvoiceStatus::Paid, today, Utc::now()),
            Err(AppError::InvalidTransition(_))
        ));
        i.set_status(InvoiceStatus::Issued, today, Utc::now()).unwrap();
        assert!(i.is_overdue(today));
        i.set_status(InvoiceStatus::Overdue, today, Utc::now()).unwrap();
        i.set_status(InvoiceStatus::Paid, today, Utc::now()).unwrap();
        assert_eq!(i.paid_date, Some(today));
        assert!(!i.is_overdue(today));
        assert!(i.set_status(InvoiceStatus::Cancelled, today, Utc::now()).is_err());
    }

    #[test]
    fn only_drafts_are_editable() {
        let rate = Decimal::new(10, 2);
        let update = UpdateInvoice {
            period_start: None,
            period_end: None,
            items: Some(vec![item(100_000, 2)]),
            issue_date: None,
            due_date: Some(date(2024, 1, 1)),
            notes: None,
        };
        let mut draft = invoice(InvoiceStatus::Draft);
        assert!(matches!(
            draft.apply(&update, rate, Utc::now()),
            Err(AppError::Validation(_))
        ));

        let update = UpdateInvoice { due_date: None, ..update };
        draft.apply(&update, rate, Utc::now()).unwrap();
        assert_eq!(draft.total, Decimal::from(220_000));

        let mut issued = invoice(InvoiceStatus::Issued);
        assert!(matches!(
            issued.apply(&update, rate, Utc::now()),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn numbers_continue_per_year() {
        let existing = ["2024-001", "2024-007", "2023-012", "junk"];
        assert_eq!(
            next_invoice_number(date(2024, 5, 1), existing.iter().copied()),
            "2024-008"
        );
        assert_eq!(
            next_invoice_number(date(2025, 1, 5), existing.iter().copied()),
            "2025-001"
        );
    }
}
