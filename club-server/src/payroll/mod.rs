//! Payroll engine (給与計算)
//!
//! - [`rounding`] - yen and minute rounding on `rust_decimal`
//! - [`period`] - reset windows for variable backs
//! - [`tier`] - tier selection
//! - [`calculator`] - hourly pay, backs and deductions for one period
//! - [`validate`] - salary system checks and normalization on save

pub mod calculator;
pub mod period;
pub mod rounding;
pub mod tier;
pub mod validate;

pub use calculator::calculate;
pub use validate::normalize_system;
