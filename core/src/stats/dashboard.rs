//! Dashboard aggregates
//!
//! Stat cards, the expiration timeline and month-over-month purchase and
//! spending figures. Everything here is a pure function of the item list
//! and the caller's notion of "today".

use crate::config::{
    SOON_THRESHOLD_DAYS, WINDOW_MONTH_DAYS, WINDOW_TWO_WEEKS_DAYS, WINDOW_WEEK_DAYS,
};
use crate::inventory::InventoryItem;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Headline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub to_buy: usize,
    pub in_progress: usize,
    /// Acquired items expiring within [`SOON_THRESHOLD_DAYS`], not yet expired
    pub expires_soon: usize,
}

pub fn compute_stats(items: &[InventoryItem], today: NaiveDate) -> DashboardStats {
    DashboardStats {
        total: items.len(),
        to_buy: items.iter().filter(|item| item.is_to_buy()).count(),
        in_progress: items.iter().filter(|item| item.is_in_progress()).count(),
        expires_soon: items
            .iter()
            .filter(|item| !item.is_to_buy())
            .filter_map(|item| item.days_until_expiration(today))
            .filter(|days| (0..=SOON_THRESHOLD_DAYS).contains(days))
            .count(),
    }
}

/// Item counts per upcoming expiration window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationWindows {
    /// 0–7 days
    pub within_week: usize,
    /// 8–14 days
    pub within_two_weeks: usize,
    /// 15–30 days
    pub within_month: usize,
}

impl ExpirationWindows {
    pub fn total(&self) -> usize {
        self.within_week + self.within_two_weeks + self.within_month
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Count acquired items by expiration window. Shopping-list items, items
/// without an expiration date, expired items and items more than a month
/// out are not counted.
pub fn bucket_by_expiration_window(items: &[InventoryItem], today: NaiveDate) -> ExpirationWindows {
    let mut windows = ExpirationWindows::default();

    for days in items
        .iter()
        .filter(|item| !item.is_to_buy())
        .filter_map(|item| item.days_until_expiration(today))
    {
        match days {
            d if (0..=WINDOW_WEEK_DAYS).contains(&d) => windows.within_week += 1,
            d if d > WINDOW_WEEK_DAYS && d <= WINDOW_TWO_WEEKS_DAYS => {
                windows.within_two_weeks += 1
            }
            d if d > WINDOW_TWO_WEEKS_DAYS && d <= WINDOW_MONTH_DAYS => {
                windows.within_month += 1
            }
            _ => {}
        }
    }

    windows
}

/// Direction of a month-over-month change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Up,
    Down,
    Same,
}

/// A value for the current and the previous calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate<T> {
    pub this_month: T,
    pub last_month: T,
}

impl MonthlyAggregate<usize> {
    pub fn difference(&self) -> i64 {
        self.this_month as i64 - self.last_month as i64
    }

    pub fn trend(&self) -> Trend {
        match self.this_month.cmp(&self.last_month) {
            std::cmp::Ordering::Greater => Trend::Up,
            std::cmp::Ordering::Less => Trend::Down,
            std::cmp::Ordering::Equal => Trend::Same,
        }
    }
}

impl MonthlyAggregate<f64> {
    pub fn difference(&self) -> f64 {
        self.this_month - self.last_month
    }

    pub fn trend(&self) -> Trend {
        let diff = self.difference();
        if diff.abs() < 0.005 {
            Trend::Same
        } else if diff > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// (year, month) of the calendar month before `today`'s
fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}

fn bought_in(item: &InventoryItem, (year, month): (i32, u32)) -> bool {
    item.bought_date
        .is_some_and(|date| date.year() == year && date.month() == month)
}

/// Group acquired (active) items by the calendar month of their bought
/// date and reduce each group. Items bought outside the current and the
/// previous month, or without a bought date, are ignored.
pub fn monthly_aggregate<T, F>(items: &[InventoryItem], today: NaiveDate, reduce: F) -> MonthlyAggregate<T>
where
    F: Fn(&[&InventoryItem]) -> T,
{
    let this_month = (today.year(), today.month());
    let last_month = previous_month(today);

    let acquired: Vec<&InventoryItem> = items.iter().filter(|item| item.is_active()).collect();

    let current: Vec<&InventoryItem> = acquired
        .iter()
        .copied()
        .filter(|item| bought_in(item, this_month))
        .collect();
    let previous: Vec<&InventoryItem> = acquired
        .iter()
        .copied()
        .filter(|item| bought_in(item, last_month))
        .collect();

    MonthlyAggregate {
        this_month: reduce(&current),
        last_month: reduce(&previous),
    }
}

/// Number of items purchased this month and last month
pub fn monthly_purchase_counts(items: &[InventoryItem], today: NaiveDate) -> MonthlyAggregate<usize> {
    monthly_aggregate(items, today, |group| group.len())
}

/// Money spent this month and last month; missing prices count as zero
pub fn monthly_spending(items: &[InventoryItem], today: NaiveDate) -> MonthlyAggregate<f64> {
    monthly_aggregate(items, today, |group| {
        group.iter().map(|item| item.price_or_zero()).sum()
    })
}

/// Everything the dashboard screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub expiration_windows: ExpirationWindows,
    pub purchases: MonthlyAggregate<usize>,
    pub spending: MonthlyAggregate<f64>,
}

impl DashboardSummary {
    pub fn compute(items: &[InventoryItem], today: NaiveDate) -> Self {
        Self {
            stats: compute_stats(items, today),
            expiration_windows: bucket_by_expiration_window(items, today),
            purchases: monthly_purchase_counts(items, today),
            spending: monthly_spending(items, today),
        }
    }
}
