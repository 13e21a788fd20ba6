//! Sales totals shown to a cashier before clock-out.
//!
//! Orders and payments live in another subsystem. It plugs in through
//! [`SalesSummaryProvider`]; this crate never computes the totals itself.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AttendanceResult;

/// Aggregate sales for one user since a point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// The user the totals belong to.
    pub user_id: String,
    /// Start of the period, usually the open session's clock-in.
    pub since: Option<NaiveDateTime>,
    /// Number of completed orders.
    pub order_count: u64,
    /// Sum of all completed orders.
    pub total_sales: Decimal,
    /// Totals keyed by payment method (e.g. `cash`, `card`).
    #[serde(default)]
    pub by_payment_method: BTreeMap<String, Decimal>,
}

/// Supplies sales totals from the order/payment subsystem.
pub trait SalesSummaryProvider: Send + Sync {
    /// Returns totals for `user_id` from `since` onwards.
    fn summary(
        &self,
        user_id: &str,
        since: Option<NaiveDateTime>,
    ) -> AttendanceResult<SalesSummary>;
}

/// Provider used when no order subsystem is wired in: always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSalesData;

impl SalesSummaryProvider for NoSalesData {
    fn summary(
        &self,
        user_id: &str,
        since: Option<NaiveDateTime>,
    ) -> AttendanceResult<SalesSummary> {
        Ok(SalesSummary {
            user_id: user_id.to_string(),
            since,
            ..SalesSummary::default()
        })
    }
}
