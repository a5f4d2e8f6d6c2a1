//! Invoices and payments store

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::billing::{next_invoice_number, Invoice, InvoiceQuery, InvoiceStatus, Payment},
};

use super::Table;

/// Invoices are always locked before payments.
#[derive(Clone)]
pub struct BillingRepository {
    invoices: Table<Invoice>,
    payments: Table<Payment>,
}

impl BillingRepository {
    pub fn new() -> Self {
        Self {
            invoices: Table::new("Invoice"),
            payments: Table::new("Payment"),
        }
    }

    pub fn get(&self, id: &str) -> AppResult<Invoice> {
        self.invoices.fetch(id)
    }

    /// Invoices matching the query, latest issue date first
    pub fn list(&self, query: &InvoiceQuery) -> AppResult<Vec<Invoice>> {
        let mut invoices = self.invoices.list(|i| query.matches(i))?;
        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });
        Ok(invoices)
    }

    /// Outstanding invoices whose due date is before `today`, oldest first
    pub fn overdue(&self, today: NaiveDate) -> AppResult<Vec<Invoice>> {
        let mut invoices = self.invoices.list(|i| i.is_overdue(today))?;
        invoices.sort_by_key(|i| i.due_date);
        Ok(invoices)
    }

    /// Insert with the next free number for the issue year, under the write guard
    pub fn create(&self, mut invoice: Invoice) -> AppResult<Invoice> {
        let mut invoices = self.invoices.write()?;
        invoice.invoice_number = next_invoice_number(
            invoice.issue_date,
            invoices.values().map(|i| i.invoice_number.as_str()),
        );
        invoices.insert(invoice.id.clone(), invoice.clone());
        Ok(invoice)
    }

    /// Insert as-is, keeping the given number
    pub fn insert(&self, invoice: Invoice) -> AppResult<Invoice> {
        self.invoices.insert(&invoice.id.clone(), invoice)
    }

    pub fn update<F>(&self, id: &str, f: F) -> AppResult<Invoice>
    where
        F: FnOnce(&mut Invoice) -> AppResult<()>,
    {
        self.invoices.update(id, f)
    }

    /// Delete a draft or cancelled invoice together with its payments
    pub fn delete(&self, id: &str) -> AppResult<Invoice> {
        let mut invoices = self.invoices.write()?;
        let invoice = invoices
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", id)))?;
        if !matches!(invoice.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled) {
            return Err(AppError::Conflict(format!(
                "Invoice {} is {}; cancel it before deleting",
                invoice.invoice_number, invoice.status
            )));
        }
        self.payments.write()?.retain(|_, p| p.invoice_id != id);
        invoices
            .shift_remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", id)))
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    /// Apply the payment to its invoice and store it, or neither
    pub fn add_payment(&self, payment: Payment, now: DateTime<Utc>) -> AppResult<(Payment, Invoice)> {
        let invoice = self.invoices.update(&payment.invoice_id, |invoice| {
            invoice.record_payment(payment.amount, payment.payment_date, now)?;
            self.payments.insert(&payment.id, payment.clone())?;
            Ok(())
        })?;
        Ok((payment, invoice))
    }

    /// Payments of an invoice, oldest first
    pub fn payments_by_invoice(&self, invoice_id: &str) -> AppResult<Vec<Payment>> {
        let mut payments = self.payments.list(|p| p.invoice_id == invoice_id)?;
        payments.sort_by_key(|p| p.payment_date);
        Ok(payments)
    }

    pub fn insert_payment(&self, payment: Payment) -> AppResult<Payment> {
        self.payments.insert(&payment.id.clone(), payment)
    }
}

impl Default for BillingRepository {
    fn default() -> Self {
        Self::new()
    }
}
