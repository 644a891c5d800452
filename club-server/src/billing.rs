//! Session bill
//!
//! `total = subtotal × (1 + service%) × (1 + tax%)`, then slip rounding when
//! the store enables it (plain yen rounding otherwise). Service charge and tax
//! are reported separately, each rounded half-up to the yen.

use rust_decimal::prelude::*;
use shared::models::{Bill, Order, RoundingMethod, StoreSettings};

use crate::payroll::rounding::{apply_rounding, percent_of};

pub fn compute_bill(subtotal: i64, settings: &StoreSettings) -> Bill {
    let base = Decimal::from(subtotal);
    let service = percent_of(base, settings.service_rate);
    let taxable = base + service;
    let tax = percent_of(taxable, settings.tax_rate);

    let total = if settings.slip_rounding_enabled {
        apply_rounding(taxable + tax, settings.slip_rounding_method, settings.slip_rounding_unit)
    } else {
        apply_rounding(taxable + tax, RoundingMethod::Round, 1)
    };

    Bill {
        subtotal,
        service_charge: apply_rounding(service, RoundingMethod::Round, 1),
        tax: apply_rounding(tax, RoundingMethod::Round, 1),
        total,
    }
}

/// Sum of order amounts
pub fn subtotal_of(orders: &[Order]) -> i64 {
    orders.iter().map(|o| o.amount).sum()
}
