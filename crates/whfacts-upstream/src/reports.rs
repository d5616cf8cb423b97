//! Typed wrappers over the upstream report and document endpoints.
//!
//! All monetary fields arrive as minor-unit numbers and leave here as
//! 2-decimal major-unit values. Numeric fields that are explicitly absent
//! from a row default to zero; structurally wrong payloads surface as
//! [`UpstreamError::Malformed`] or [`UpstreamError::Deserialize`].

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use serde::Deserialize;

use whfacts_core::facts::{DiscountMetrics, InflowMetrics, ProfitMetrics, SalesMetrics};
use whfacts_core::money;

use crate::client::UpstreamClient;
use crate::error::UpstreamError;
use crate::paging::{PageStrategy, PagedEnvelope};

const PAGE_SIZE: u32 = 1000;
const MOMENT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct PlotSeriesResponse {
    #[serde(default)]
    series: Vec<PlotPoint>,
}

#[derive(Debug, Deserialize)]
struct PlotPoint {
    date: String,
    #[serde(default)]
    sum: Option<f64>,
    #[serde(default)]
    quantity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfitRow {
    #[serde(rename = "sellCostSum")]
    sell_cost_sum: Option<f64>,
    #[serde(rename = "returnCostSum")]
    return_cost_sum: Option<f64>,
    #[serde(rename = "sellPrice")]
    sell_price: Option<f64>,
    #[serde(rename = "sellQuantity")]
    sell_quantity: Option<f64>,
    #[serde(rename = "sellSum")]
    sell_sum: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReceiptDoc {
    #[serde(default)]
    sum: Option<f64>,
}

/// One store from the upstream registry.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Cost-side metrics derived from one day's profit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitDay {
    pub profit: ProfitMetrics,
    pub discount: DiscountMetrics,
}

fn moment_from(day: NaiveDate) -> String {
    format!("{day} 00:00:00")
}

fn moment_to(day: NaiveDate) -> String {
    format!("{day} 23:59:59")
}

impl UpstreamClient {
    /// Daily revenue/receipts series for `[start, end]` at one store.
    ///
    /// The upstream aggregates the whole range server-side, so this is a
    /// single call rather than one per day. Days without retail activity
    /// are absent from the result.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the retry engine;
    /// [`UpstreamError::Malformed`] if a series date does not parse.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn sales_series(
        &self,
        store_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, SalesMetrics>, UpstreamError> {
        const CONTEXT: &str = "report/sales/plotseries";

        let filter = format!("store={}", self.store_href(store_id));
        let url = self.endpoint(
            CONTEXT,
            &[
                ("momentFrom", moment_from(start).as_str()),
                ("momentTo", moment_to(end).as_str()),
                ("interval", "day"),
                ("filter", filter.as_str()),
            ],
        )?;
        let body: PlotSeriesResponse = self.get(url, CONTEXT).await?;

        let mut series = BTreeMap::new();
        for point in body.series {
            let date = NaiveDateTime::parse_from_str(&point.date, MOMENT_FORMAT)
                .map_err(|e| UpstreamError::Malformed {
                    context: CONTEXT.to_string(),
                    reason: format!("bad series date \"{}\": {e}", point.date),
                })?
                .date();
            series.insert(
                date,
                SalesMetrics {
                    revenue: money::to_major(money::minor_units(point.sum)),
                    receipts_count: point.quantity.unwrap_or(0.0) as i32,
                },
            );
        }
        Ok(series)
    }

    /// One day's profit report at one store, aggregated across products:
    /// cost of goods sold, cost of returns, and the discount implied by
    /// `sellPrice × sellQuantity − sellSum`.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the retry engine.
    pub async fn profit_by_day(
        &self,
        store_id: &str,
        day: NaiveDate,
    ) -> Result<ProfitDay, UpstreamError> {
        const CONTEXT: &str = "report/profit/byproduct";

        let filter = format!("store={}", self.store_href(store_id));
        let limit = PAGE_SIZE.to_string();
        let url = self.endpoint(
            CONTEXT,
            &[
                ("momentFrom", moment_from(day).as_str()),
                ("momentTo", moment_to(day).as_str()),
                ("filter", filter.as_str()),
                ("limit", limit.as_str()),
            ],
        )?;
        let body: PagedEnvelope<ProfitRow> = self.get(url, CONTEXT).await?;

        let mut cost = Decimal::ZERO;
        let mut returns = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        for row in body.rows {
            cost += money::minor_units(row.sell_cost_sum);
            returns += money::minor_units(row.return_cost_sum);
            let price = money::minor_units(row.sell_price);
            let quantity = row
                .sell_quantity
                .and_then(Decimal::from_f64_retain)
                .unwrap_or(Decimal::ZERO);
            let sold = money::minor_units(row.sell_sum);
            discount += price * quantity - sold;
        }

        Ok(ProfitDay {
            profit: ProfitMetrics {
                cost: money::to_major(cost),
                returns_cost: money::to_major(returns),
            },
            discount: DiscountMetrics {
                discount: money::to_major(discount),
            },
        })
    }

    /// Total value of goods-receipt documents posted on `day` at one
    /// store, following pagination until the collection is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the retry engine; a page that
    /// exhausts its retries aborts the sum.
    pub async fn inflow_by_day(
        &self,
        store_id: &str,
        day: NaiveDate,
    ) -> Result<InflowMetrics, UpstreamError> {
        let filter = format!(
            "moment>={};moment<={};store={}",
            moment_from(day),
            moment_to(day),
            self.store_href(store_id)
        );
        let total = self
            .rows::<ReceiptDoc>("entity/enter", Some(&filter), PAGE_SIZE, PageStrategy::Offset)
            .try_fold(Decimal::ZERO, |acc, doc| async move {
                Ok(acc + money::minor_units(doc.sum))
            })
            .await?;

        Ok(InflowMetrics {
            inflow_cost: money::to_major(total),
        })
    }

    /// Every store in the upstream registry (paginated).
    ///
    /// # Errors
    ///
    /// Propagates request errors from the retry engine.
    pub async fn stores(&self) -> Result<Vec<StoreRecord>, UpstreamError> {
        self.rows::<StoreRecord>("entity/store", None, PAGE_SIZE, PageStrategy::Offset)
            .try_collect()
            .await
    }
}
