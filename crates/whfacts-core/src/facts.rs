//! Per-day fact contributions and their merge.
//!
//! Each upstream fetch stage produces values for one metric group, and every
//! group owns a disjoint set of `daily_facts` columns:
//!
//! - sales → `revenue`, `receipts_count`
//! - profit → `cost`, `returns_cost`
//! - discount → `discount`
//! - inflow → `inflow_cost`
//! - writeoff → the four `writeoff_cost_*` buckets
//!
//! Because the groups never share a column, merging contributions from
//! different groups is commutative, and a [`DayPatch`] can be upserted any
//! number of times without clobbering columns it does not carry.

use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesMetrics {
    pub revenue: Decimal,
    pub receipts_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfitMetrics {
    pub cost: Decimal,
    pub returns_cost: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscountMetrics {
    pub discount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflowMetrics {
    pub inflow_cost: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteoffMetrics {
    pub total: Decimal,
    pub defect: Decimal,
    pub inventory: Decimal,
    pub other: Decimal,
}

/// Accumulated contributions for one `(date, warehouse)` key. Groups left
/// `None` are untouched by the eventual upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPatch {
    pub date: NaiveDate,
    pub warehouse_id: i32,
    pub sales: Option<SalesMetrics>,
    pub profit: Option<ProfitMetrics>,
    pub discount: Option<DiscountMetrics>,
    pub inflow: Option<InflowMetrics>,
    pub writeoff: Option<WriteoffMetrics>,
}

impl DayPatch {
    #[must_use]
    pub fn new(date: NaiveDate, warehouse_id: i32) -> Self {
        Self {
            date,
            warehouse_id,
            sales: None,
            profit: None,
            discount: None,
            inflow: None,
            writeoff: None,
        }
    }

    /// Combines two patches for the same `(date, warehouse)` key.
    ///
    /// For each group, a `Some` contribution from `other` replaces this
    /// patch's value; groups absent from `other` are kept. Since groups own
    /// disjoint columns, merging contributions from *different* groups is
    /// commutative; re-merging the *same* group keeps the later value.
    #[must_use]
    pub fn merge(self, other: DayPatch) -> DayPatch {
        debug_assert_eq!((self.date, self.warehouse_id), (other.date, other.warehouse_id));
        DayPatch {
            date: self.date,
            warehouse_id: self.warehouse_id,
            sales: other.sales.or(self.sales),
            profit: other.profit.or(self.profit),
            discount: other.discount.or(self.discount),
            inflow: other.inflow.or(self.inflow),
            writeoff: other.writeoff.or(self.writeoff),
        }
    }

    /// True when no group carries a contribution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sales.is_none()
            && self.profit.is_none()
            && self.discount.is_none()
            && self.inflow.is_none()
            && self.writeoff.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid test date")
    }

    fn dec(s: &str) -> Decimal {
        s.parse().expect("literal decimal")
    }

    fn sales_patch() -> DayPatch {
        DayPatch {
            sales: Some(SalesMetrics {
                revenue: dec("123.45"),
                receipts_count: 17,
            }),
            ..DayPatch::new(day(), 1)
        }
    }

    fn profit_patch() -> DayPatch {
        DayPatch {
            profit: Some(ProfitMetrics {
                cost: dec("70.10"),
                returns_cost: dec("3.00"),
            }),
            discount: Some(DiscountMetrics {
                discount: dec("5.55"),
            }),
            ..DayPatch::new(day(), 1)
        }
    }

    #[test]
    fn new_patch_is_empty() {
        assert!(DayPatch::new(day(), 1).is_empty());
        assert!(!sales_patch().is_empty());
    }

    #[test]
    fn cross_group_merge_is_commutative() {
        let ab = sales_patch().merge(profit_patch());
        let ba = profit_patch().merge(sales_patch());
        assert_eq!(ab, ba);
        assert_eq!(ab.sales, sales_patch().sales);
        assert_eq!(ab.profit, profit_patch().profit);
        assert_eq!(ab.discount, profit_patch().discount);
        assert!(ab.inflow.is_none());
        assert!(ab.writeoff.is_none());
    }

    #[test]
    fn same_group_merge_keeps_later_value() {
        let older = sales_patch();
        let newer = DayPatch {
            sales: Some(SalesMetrics {
                revenue: dec("200.00"),
                receipts_count: 20,
            }),
            ..DayPatch::new(day(), 1)
        };
        let merged = older.merge(newer);
        assert_eq!(merged.sales.unwrap().revenue, dec("200.00"));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let patch = sales_patch().merge(profit_patch());
        assert_eq!(patch.merge(DayPatch::new(day(), 1)), patch);
        assert_eq!(DayPatch::new(day(), 1).merge(patch), patch);
    }

    #[test]
    fn merge_is_idempotent() {
        let patch = sales_patch().merge(profit_patch());
        assert_eq!(patch.merge(patch), patch);
    }
}
