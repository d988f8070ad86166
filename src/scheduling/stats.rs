use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use time::Date;

use crate::db::repositories::{AppointmentStore, OfferingCatalog};
use crate::error::AppResult;

use super::{day_end, day_start};

/// One aggregation bucket: how many completed appointments and how much
/// they earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    pub count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_revenue: f64,
    pub total_clients: u64,
    /// Keyed by offering name; no defined order.
    pub by_offering: Vec<GroupStats>,
    /// Keyed `YYYY-MM-DD`, ascending.
    pub by_day: Vec<GroupStats>,
    /// Keyed `YYYY-MM`, ascending.
    pub by_month: Vec<GroupStats>,
}

/// Folds completed appointments into revenue totals and per-offering,
/// per-day and per-month groupings. Appointments whose offering no longer
/// resolves, or whose offering has no price, are silently left out: a
/// data-quality tolerance, not an error.
pub struct StatsService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn OfferingCatalog>,
}

impl StatsService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, catalog: Arc<dyn OfferingCatalog>) -> Self {
        Self {
            appointments,
            catalog,
        }
    }

    /// Aggregate over completed appointments; the optional range is
    /// inclusive of both whole days.
    pub async fn aggregate(&self, from: Option<Date>, to: Option<Date>) -> AppResult<StatsReport> {
        let completed = self
            .appointments
            .find_completed_between(from.map(day_start), to.map(day_end))
            .await?;

        let mut total_revenue = 0.0;
        let mut total_clients = 0;
        let mut by_offering: HashMap<String, GroupStats> = HashMap::new();
        let mut by_day: BTreeMap<String, GroupStats> = BTreeMap::new();
        let mut by_month: BTreeMap<String, GroupStats> = BTreeMap::new();

        for appointment in &completed {
            let Some(offering) = self.catalog.get(appointment.offering_id).await? else {
                continue;
            };
            let Some(price) = offering.price else {
                continue;
            };

            total_revenue += price;
            total_clients += 1;

            let date = appointment.scheduled_at.date();
            let name = offering.name.clone();
            accumulate(by_offering.entry(name.clone()).or_insert_with(|| empty_group(name)), price);
            let day = day_key(date);
            accumulate(by_day.entry(day.clone()).or_insert_with(|| empty_group(day)), price);
            let month = month_key(date);
            accumulate(by_month.entry(month.clone()).or_insert_with(|| empty_group(month)), price);
        }

        Ok(StatsReport {
            total_revenue,
            total_clients,
            by_offering: by_offering.into_values().collect(),
            by_day: by_day.into_values().collect(),
            by_month: by_month.into_values().collect(),
        })
    }
}

fn day_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

fn empty_group(label: String) -> GroupStats {
    GroupStats {
        label,
        count: 0,
        revenue: 0.0,
    }
}

fn accumulate(group: &mut GroupStats, price: f64) {
    group.count += 1;
    group.revenue += price;
}
