use super::engine::summarize;
use super::types::{AssetChange, CashflowEntry, FinancialItem, ProjectionResult, YearResult};

fn deflate_items(items: &[FinancialItem], multiplier: f64) -> Vec<FinancialItem> {
    items
        .iter()
        .map(|item| item.with_value(item.value * multiplier))
        .collect()
}

fn deflate_changes(changes: &[AssetChange], multiplier: f64) -> Vec<AssetChange> {
    changes
        .iter()
        .map(|change| AssetChange {
            amount: change.amount * multiplier,
            ..change.clone()
        })
        .collect()
}

fn deflate_entries(entries: &[CashflowEntry], multiplier: f64) -> Vec<CashflowEntry> {
    entries
        .iter()
        .map(|entry| CashflowEntry {
            amount: entry.amount * multiplier,
            ..entry.clone()
        })
        .collect()
}

fn real_gain(closing: f64, opening: f64, multiplier: f64, prev_multiplier: f64) -> f64 {
    closing * multiplier - opening * prev_multiplier
}

fn value_of(assets: &[FinancialItem], id: &str) -> Option<f64> {
    assets
        .iter()
        .find(|asset| asset.id == id)
        .map(|asset| asset.value)
}

fn history_total(changes: &[AssetChange], id: &str) -> f64 {
    changes
        .iter()
        .filter(|change| change.id == id)
        .map(|change| change.amount)
        .sum()
}

/// Real gain of one asset over a year: its deflated closing balance less
/// its opening balance deflated at the previous year's multiplier. Growth
/// that merely keeps pace with inflation comes out as zero.
fn real_growth(
    year: &YearResult,
    nominal_growth: &AssetChange,
    multiplier: f64,
    prev_multiplier: f64,
    prev_assets: Option<&[FinancialItem]>,
) -> f64 {
    let id = nominal_growth.id.as_str();
    let closing = value_of(&year.assets, id).unwrap_or(0.0);
    // The first year has no previous snapshot; every change to a balance
    // is recorded in the history, so the starting balance is recovered
    // from it.
    let opening = prev_assets
        .and_then(|assets| value_of(assets, id))
        .unwrap_or_else(|| {
            closing
                - nominal_growth.amount
                - history_total(&year.history.asset_yield, id)
                - history_total(&year.history.contributions, id)
                + history_total(&year.history.deficits, id)
        });
    real_gain(closing, opening, multiplier, prev_multiplier)
}

fn deflate_year(
    year: &YearResult,
    multiplier: f64,
    prev_multiplier: f64,
    prev_assets: Option<&[FinancialItem]>,
) -> YearResult {
    let mut real = year.clone();
    real.total_income *= multiplier;
    real.total_expenses *= multiplier;
    real.net_cashflow *= multiplier;
    real.remaining_cashflow *= multiplier;
    real.net_worth *= multiplier;
    real.assets = deflate_items(&year.assets, multiplier);
    real.liabilities = deflate_items(&year.liabilities, multiplier);

    let history = &mut real.history;
    history.income = deflate_entries(&year.history.income, multiplier);
    history.expenses = deflate_entries(&year.history.expenses, multiplier);
    // Yield arrives during the year, so it has no opening balance.
    history.asset_yield = year
        .history
        .asset_yield
        .iter()
        .map(|change| AssetChange {
            amount: real_gain(change.amount, 0.0, multiplier, prev_multiplier),
            ..change.clone()
        })
        .collect();
    history.contributions = deflate_changes(&year.history.contributions, multiplier);
    history.deficits = deflate_changes(&year.history.deficits, multiplier);
    history.unallocated_surplus *= multiplier;
    history.unmet_deficit *= multiplier;
    history.asset_growth = year
        .history
        .asset_growth
        .iter()
        .map(|growth| AssetChange {
            amount: real_growth(year, growth, multiplier, prev_multiplier, prev_assets),
            ..growth.clone()
        })
        .collect();
    for payment in &mut history.liabilities {
        payment.interest_charged *= multiplier;
        payment.principal_paid *= multiplier;
        payment.remaining_balance *= multiplier;
    }
    real
}

/// Re-expresses a nominal projection in start-of-projection money. The
/// simulation is not re-run; each year is scaled by the inverse of its
/// cumulative inflation factor.
pub fn transform_to_real_values(result: &ProjectionResult) -> ProjectionResult {
    if result.real_values {
        return result.clone();
    }

    let mut years = Vec::with_capacity(result.years.len());
    let mut prev_multiplier = 1.0;
    let mut prev_assets: Option<&[FinancialItem]> = None;
    for year in &result.years {
        let multiplier = 1.0 / year.inflation_factor.max(1e-9);
        years.push(deflate_year(year, multiplier, prev_multiplier, prev_assets));
        prev_multiplier = multiplier;
        prev_assets = Some(&year.assets);
    }

    let summary = summarize(result.summary.starting_net_worth, &years);
    ProjectionResult {
        years,
        summary,
        real_values: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::run_multi_year_projection;
    use crate::core::types::{AssetTerms, Frequency, Growth, ItemKind, Schedule, UserProfile};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn asset(id: &str, value: f64, growth_rate: f64, yield_rate: f64) -> FinancialItem {
        FinancialItem::new(
            id,
            id,
            value,
            ItemKind::Asset(AssetTerms {
                growth_rate,
                yield_rate,
                max_annual_contribution: None,
            }),
        )
    }

    fn profile() -> UserProfile {
        UserProfile {
            birth_date: None,
            life_expectancy: None,
            start_month: 1,
        }
    }

    fn project(items: &[FinancialItem], years: i32, inflation: f64) -> ProjectionResult {
        run_multi_year_projection(items, 2025, years, &profile(), &[], &[], inflation)
            .expect("valid projection")
    }

    #[test]
    fn growth_equal_to_inflation_has_zero_real_gain() {
        let nominal = project(&[asset("stocks", 10_000.0, 0.03, 0.0)], 4, 0.03);
        let real = transform_to_real_values(&nominal);

        for (nominal_year, real_year) in nominal.years.iter().zip(&real.years) {
            assert!(nominal_year.history.asset_growth[0].amount > 0.0);
            assert_approx(real_year.history.asset_growth[0].amount, 0.0);
            assert_approx(real_year.assets[0].value, 10_000.0);
        }
        assert_approx(real.summary.ending_net_worth, 10_000.0);
        assert_approx(real.summary.average_annual_return, 0.0);
    }

    #[test]
    fn real_gain_is_not_nominal_gain_times_multiplier() {
        let nominal = project(&[asset("stocks", 10_000.0, 0.07, 0.0)], 2, 0.03);
        let real = transform_to_real_values(&nominal);
        let year = &nominal.years[1];
        let multiplier = 1.0 / year.inflation_factor;
        let prev_multiplier = 1.0 / nominal.years[0].inflation_factor;
        let expected =
            year.assets[0].value * multiplier - nominal.years[0].assets[0].value * prev_multiplier;
        let real_gain = real.years[1].history.asset_growth[0].amount;

        assert_approx(real_gain, expected);
        assert!((real_gain - year.history.asset_growth[0].amount * multiplier).abs() > 1.0);
    }

    #[test]
    fn contributions_count_toward_real_gain() {
        let items = vec![
            asset("stocks", 10_000.0, 0.05, 0.0),
            FinancialItem::new("salary", "Salary", 12_000.0, ItemKind::Income(Schedule::default())),
        ];
        let nominal = project(&items, 1, 0.0);
        let real = transform_to_real_values(&nominal);
        let year = &nominal.years[0];
        let real_gain = real.years[0].history.asset_growth[0].amount;

        assert_approx(real_gain, year.assets[0].value - 10_000.0);
        assert_approx(real_gain, year.history.asset_growth[0].amount + 12_000.0);
    }

    #[test]
    fn first_year_gain_uses_the_starting_balance() {
        let items = vec![
            asset("stocks", 10_000.0, 0.05, 0.0),
            FinancialItem::new("salary", "Salary", 12_000.0, ItemKind::Income(Schedule::default())),
        ];
        let nominal = project(&items, 2, 0.02);
        let real = transform_to_real_values(&nominal);
        let multiplier = 1.0 / nominal.years[0].inflation_factor;

        assert_approx(
            real.years[0].history.asset_growth[0].amount,
            nominal.years[0].assets[0].value * multiplier - 10_000.0,
        );
    }

    #[test]
    fn yield_and_growth_use_the_deflated_balances() {
        let nominal = project(&[asset("fund", 10_000.0, 0.03, 0.02)], 2, 0.03);
        let real = transform_to_real_values(&nominal);
        for (nominal_year, real_year) in nominal.years.iter().zip(&real.years) {
            let multiplier = 1.0 / nominal_year.inflation_factor;
            assert_approx(
                real_year.history.asset_yield[0].amount,
                nominal_year.history.asset_yield[0].amount * multiplier,
            );
        }

        let prev_multiplier = 1.0 / nominal.years[0].inflation_factor;
        let multiplier = 1.0 / nominal.years[1].inflation_factor;
        assert_approx(
            real.years[1].history.asset_growth[0].amount,
            nominal.years[1].assets[0].value * multiplier
                - nominal.years[0].assets[0].value * prev_multiplier,
        );
    }

    #[test]
    fn future_dated_inflation_income_keeps_todays_value() {
        let items = vec![FinancialItem::new(
            "pension",
            "Pension",
            10_000.0,
            ItemKind::Income(Schedule {
                start_year: Some(2039),
                frequency: Frequency::Annual,
                growth: Growth::Inflation,
                ..Schedule::default()
            }),
        )];
        let nominal = project(&items, 20, 0.03);
        let real = transform_to_real_values(&nominal);

        let first_paid = nominal
            .years
            .iter()
            .position(|year| year.total_income > 0.0)
            .expect("income starts inside the horizon");
        assert_eq!(nominal.years[first_paid].year, 2039);
        assert!((nominal.years[first_paid].total_income - 10_000.0 * 1.03_f64.powi(14)).abs() < 1e-6);
        let real_income = real.years[first_paid].total_income;
        assert!(
            (real_income - 10_000.0).abs() / 10_000.0 < 0.05,
            "real income {real_income}"
        );
    }

    #[test]
    fn scalars_and_histories_are_deflated() {
        let items = vec![
            asset("cash", 1_000.0, 0.0, 0.0),
            FinancialItem::new("rent", "Rent", 600.0, ItemKind::Expense(Schedule::default())),
        ];
        let nominal = project(&items, 2, 0.10);
        let real = transform_to_real_values(&nominal);
        let multiplier = 1.0 / nominal.years[1].inflation_factor;

        assert!(real.real_values);
        assert_approx(real.years[1].total_expenses, nominal.years[1].total_expenses * multiplier);
        assert_approx(real.years[1].net_worth, nominal.years[1].net_worth * multiplier);
        assert_approx(
            real.years[1].history.deficits[0].amount,
            nominal.years[1].history.deficits[0].amount * multiplier,
        );
        assert_approx(real.summary.starting_net_worth, nominal.summary.starting_net_worth);
    }

    #[test]
    fn zero_inflation_changes_nothing_but_the_flag() {
        let nominal = project(&[asset("stocks", 5_000.0, 0.05, 0.0)], 3, 0.0);
        let real = transform_to_real_values(&nominal);
        for (nominal_year, real_year) in nominal.years.iter().zip(&real.years) {
            assert_approx(real_year.net_worth, nominal_year.net_worth);
            assert_approx(
                real_year.history.asset_growth[0].amount,
                nominal_year.history.asset_growth[0].amount,
            );
        }
    }

    #[test]
    fn transforming_twice_is_a_no_op() {
        let nominal = project(&[asset("stocks", 5_000.0, 0.05, 0.0)], 3, 0.04);
        let once = transform_to_real_values(&nominal);
        let twice = transform_to_real_values(&once);
        assert_eq!(once, twice);
    }
}
