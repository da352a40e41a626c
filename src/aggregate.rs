//! Single-pass KPI, time-series, and ranking aggregation.
//!
//! Given a [`Dataset`] and its resolved [`ColumnRoles`], one scan over the
//! rows produces the full [`Report`]: sales totals, contract counts, the
//! per-day series, and the consultant/trial/product rankings. Unresolved
//! roles and degraded cells never abort the run; they surface as warning
//! strings and defect counters on the report.

use std::collections::HashMap;

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{
    columns::ColumnRoles,
    data::{self, Cell},
    loader::Dataset,
};

/// Placeholder for rows whose consultant or product cell is blank.
pub const UNSPECIFIED: &str = "Não especificado";

/// A product counts as a trial class when its name contains any of these.
const TRIAL_MARKERS: &[&str] = &["experimental", "trial", "test", "teste"];

const PRODUCT_RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub total_sales: Decimal,
    pub contracts: usize,
    pub average_ticket: Decimal,
    pub trial_classes: usize,
    pub subscriptions: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPoint {
    pub day: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultantRank {
    pub name: String,
    pub total: Decimal,
    pub percent: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialRank {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductRank {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

/// Cells that degraded during the scan. Non-zero counts become warnings
/// rather than errors; dirty exports are the norm, not the exception.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DefectSummary {
    pub bad_amount_cells: usize,
    pub fallback_dates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kpis: Kpis,
    pub sales_by_day: Vec<DayPoint>,
    pub consultants: Vec<ConsultantRank>,
    pub trials: Vec<TrialRank>,
    pub products: Vec<ProductRank>,
    pub roles: ColumnRoles,
    pub warnings: Vec<String>,
    pub defects: DefectSummary,
}

/// Runs the aggregation. `today` anchors the fallback for unreadable date
/// cells; callers pass the current date, tests pass a fixed one.
pub fn analyze(dataset: &Dataset, roles: &ColumnRoles, today: NaiveDate) -> Report {
    let total_idx = resolved_index(dataset, roles.total.as_deref());
    let date_idx = resolved_index(dataset, roles.date.as_deref());
    let consultant_idx = resolved_index(dataset, roles.consultant.as_deref());
    let product_idx = resolved_index(dataset, roles.product.as_deref());
    let marker_idxs: Vec<usize> = roles
        .contract_marker_columns()
        .filter_map(|name| dataset.column_index(name))
        .unique()
        .collect();

    let mut defects = DefectSummary::default();
    let mut total_sales = Decimal::ZERO;
    let mut contracts = 0usize;
    let mut trial_classes = 0usize;
    let mut day_totals: HashMap<String, Decimal> = HashMap::new();
    let mut consultant_totals: HashMap<String, Decimal> = HashMap::new();
    let mut trial_counts: HashMap<String, usize> = HashMap::new();
    let mut product_totals: HashMap<String, (Decimal, usize)> = HashMap::new();

    for row in &dataset.rows {
        let amount = match total_idx.map(|idx| &row[idx]) {
            Some(cell) => match data::try_parse_amount(cell) {
                Some(value) => value,
                None => {
                    defects.bad_amount_cells += 1;
                    Decimal::ZERO
                }
            },
            None => Decimal::ZERO,
        };
        total_sales += amount;

        if marker_idxs.is_empty() {
            // No categorization columns resolved: every row counts
            contracts += 1;
        } else if marker_idxs.iter().any(|idx| !row[*idx].is_blank()) {
            contracts += 1;
        }

        if let Some(idx) = date_idx
            && !row[idx].is_blank()
        {
            let label = match data::try_day_month_label(&row[idx]) {
                Some(label) => label,
                None => {
                    defects.fallback_dates += 1;
                    data::day_month_label(&row[idx], today)
                }
            };
            *day_totals.entry(label).or_insert(Decimal::ZERO) += amount;
        }

        if let Some(idx) = consultant_idx {
            let name = named_or_unspecified(&row[idx]);
            *consultant_totals.entry(name).or_insert(Decimal::ZERO) += amount;
        }

        if let Some(idx) = product_idx {
            let product = &row[idx];
            if is_trial_product(product) {
                trial_classes += 1;
                let consultant = consultant_idx
                    .map(|c| named_or_unspecified(&row[c]))
                    .unwrap_or_else(|| UNSPECIFIED.to_string());
                *trial_counts.entry(consultant).or_insert(0) += 1;
            }

            if total_idx.is_some() {
                let name = named_or_unspecified(product);
                let entry = product_totals.entry(name).or_insert((Decimal::ZERO, 0));
                entry.0 += amount;
                entry.1 += 1;
            }
        }
    }

    let average_ticket = if contracts > 0 {
        total_sales / Decimal::from(contracts)
    } else {
        Decimal::ZERO
    };

    let sales_by_day = day_totals
        .into_iter()
        .sorted_by_key(|(day, _)| month_day_key(day))
        .map(|(day, total)| DayPoint { day, total })
        .collect();

    let grand_total: Decimal = consultant_totals.values().copied().sum();
    let consultants = consultant_totals
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(name, total)| ConsultantRank {
            name,
            percent: percent_of(total, grand_total),
            total,
        })
        .collect();

    let trials = trial_counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(name, count)| TrialRank { name, count })
        .collect();

    let products = product_totals
        .into_iter()
        .filter(|(_, (total, _))| *total > Decimal::ZERO)
        .sorted_by(|a, b| b.1.0.cmp(&a.1.0).then_with(|| a.0.cmp(&b.0)))
        .take(PRODUCT_RANKING_SIZE)
        .map(|(name, (total, count))| ProductRank { name, total, count })
        .collect();

    let warnings = collect_warnings(roles, marker_idxs.is_empty(), &defects);

    Report {
        kpis: Kpis {
            total_sales,
            contracts,
            average_ticket,
            trial_classes,
            subscriptions: contracts as i64 - trial_classes as i64,
        },
        sales_by_day,
        consultants,
        trials,
        products,
        roles: roles.clone(),
        warnings,
        defects,
    }
}

fn resolved_index(dataset: &Dataset, name: Option<&str>) -> Option<usize> {
    name.and_then(|n| dataset.column_index(n))
}

fn named_or_unspecified(cell: &Cell) -> String {
    if cell.is_blank() {
        UNSPECIFIED.to_string()
    } else {
        cell.display().trim().to_string()
    }
}

fn is_trial_product(cell: &Cell) -> bool {
    match cell.as_text() {
        Some(text) => {
            let lowered = text.trim().to_lowercase();
            !lowered.is_empty() && TRIAL_MARKERS.iter().any(|marker| lowered.contains(marker))
        }
        None => false,
    }
}

/// `DD/MM` labels sort by month then day; years are not part of the label,
/// so a multi-year dataset merges same-day entries.
fn month_day_key(label: &str) -> (u32, u32) {
    let mut parts = label.splitn(2, '/');
    let day = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let month = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (month, day)
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn collect_warnings(roles: &ColumnRoles, no_markers: bool, defects: &DefectSummary) -> Vec<String> {
    let mut warnings = Vec::new();
    if roles.total.is_none() {
        warnings.push(
            "No monetary total column found; sales totals and tickets default to 0".to_string(),
        );
    }
    if roles.date.is_none() {
        warnings.push("No date column found; the day series is empty".to_string());
    }
    if roles.consultant.is_none() {
        warnings.push("No consultant column found; the consultant ranking is empty".to_string());
    }
    if roles.product.is_none() {
        warnings
            .push("No product column found; trial and product rankings are empty".to_string());
    }
    if no_markers {
        warnings.push(
            "No categorization columns found; every row was counted as a contract".to_string(),
        );
    }
    if defects.bad_amount_cells > 0 {
        warnings.push(format!(
            "{} cell(s) could not be read as amounts and were counted as 0",
            defects.bad_amount_cells
        ));
    }
    if defects.fallback_dates > 0 {
        warnings.push(format!(
            "{} date cell(s) were unreadable and fell back to today",
            defects.fallback_dates
        ));
    }
    warnings
}
