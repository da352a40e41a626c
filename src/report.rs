//! Terminal rendition of the dashboard panels: KPI cards, the day series,
//! and the rankings, plus JSON export of the whole report.

use anyhow::{Context, Result};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{aggregate::Report, table};

/// `pt-BR` currency formatting: `R$ 1.234,56`. The exports this crate
/// consumes are BRL, matching the dashboard this replaces.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative();
    let unsigned = rounded.abs().to_string();
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned.as_str(), ""));

    let mut grouped = String::new();
    let digits: Vec<char> = integer.chars().collect();
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let mut cents = fraction.to_string();
    while cents.len() < 2 {
        cents.push('0');
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents}")
}

pub fn format_percent(value: Decimal) -> String {
    format!("{value:.1}%")
}

/// Prints the full report as a sequence of tables, mirroring the dashboard
/// cards. `target` is the externally supplied sales goal; attainment is
/// display-only and never feeds back into the aggregation.
pub fn print_report(report: &Report, target: Option<Decimal>) {
    print_kpis(report, target);

    if !report.sales_by_day.is_empty() {
        println!();
        println!("Sales by day");
        let headers = vec!["day".to_string(), "total".to_string()];
        let rows = report
            .sales_by_day
            .iter()
            .map(|point| vec![point.day.clone(), format_currency(point.total)])
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }

    if !report.consultants.is_empty() {
        println!();
        println!("Consultant ranking");
        let headers = vec![
            "#".to_string(),
            "consultant".to_string(),
            "total".to_string(),
            "share".to_string(),
        ];
        let rows = report
            .consultants
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                vec![
                    (idx + 1).to_string(),
                    entry.name.clone(),
                    format_currency(entry.total),
                    format_percent(entry.percent),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }

    if !report.trials.is_empty() {
        println!();
        println!("Trial classes by consultant");
        let headers = vec!["#".to_string(), "consultant".to_string(), "classes".to_string()];
        let rows = report
            .trials
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                vec![(idx + 1).to_string(), entry.name.clone(), entry.count.to_string()]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }

    if !report.products.is_empty() {
        println!();
        println!("Top products");
        let headers = vec![
            "#".to_string(),
            "product".to_string(),
            "total".to_string(),
            "sales".to_string(),
        ];
        let rows = report
            .products
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                vec![
                    (idx + 1).to_string(),
                    entry.name.clone(),
                    format_currency(entry.total),
                    entry.count.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
}

fn print_kpis(report: &Report, target: Option<Decimal>) {
    let kpis = &report.kpis;
    let headers = vec!["kpi".to_string(), "value".to_string()];
    let mut rows = vec![
        vec!["Total sales".to_string(), format_currency(kpis.total_sales)],
        vec!["Contracts".to_string(), kpis.contracts.to_string()],
        vec![
            "Average ticket".to_string(),
            format_currency(kpis.average_ticket),
        ],
        vec!["Trial classes".to_string(), kpis.trial_classes.to_string()],
        vec!["Subscriptions".to_string(), kpis.subscriptions.to_string()],
    ];
    if let Some(target) = target
        && !target.is_zero()
    {
        let attainment = (kpis.total_sales * Decimal::ONE_HUNDRED / target)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        rows.push(vec![
            format!("Target ({})", format_currency(target)),
            format_percent(attainment),
        ]);
    }
    table::print_table(&headers, &rows);
}

/// Serializes the report as pretty JSON for downstream consumers.
pub fn to_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Serializing report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("decimal literal")
    }

    #[test]
    fn currency_groups_thousands_with_dots() {
        assert_eq!(format_currency(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(format_currency(dec("1234567.5")), "R$ 1.234.567,50");
        assert_eq!(format_currency(dec("12")), "R$ 12,00");
        assert_eq!(format_currency(dec("0")), "R$ 0,00");
    }

    #[test]
    fn currency_keeps_sign_outside_symbol() {
        assert_eq!(format_currency(dec("-150.75")), "-R$ 150,75");
    }

    #[test]
    fn currency_rounds_to_cents() {
        assert_eq!(format_currency(dec("10.005")), "R$ 10,01");
    }
}
