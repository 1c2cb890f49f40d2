use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::calendar::label_for_date;
use super::error::ProjectionError;
use super::types::{
    Category, ComparisonBucket, ComparisonResult, ComparisonStatus, ComparisonSummary,
    FinancialItem, ProjectionResult, YearResult,
};
use super::validate::{validate_items, validate_parameter};

pub const DEFAULT_TOLERANCE: f64 = 0.05;

type BucketKey = (Category, Option<String>);

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    actual: f64,
    projected: f64,
}

fn percent_diff(actual: f64, projected: f64) -> f64 {
    if projected == 0.0 {
        if actual == 0.0 { 0.0 } else { 1.0 }
    } else {
        (actual - projected) / projected
    }
}

/// Liabilities are better when lower, so their polarity is inverted.
fn status_for(category: Category, percent_diff: f64, tolerance: f64) -> ComparisonStatus {
    if percent_diff.abs() <= tolerance {
        return ComparisonStatus::OnTrack;
    }
    let higher_is_better = !matches!(category, Category::Liability);
    if (percent_diff > 0.0) == higher_is_better {
        ComparisonStatus::Ahead
    } else {
        ComparisonStatus::Behind
    }
}

fn add_to_buckets(
    buckets: &mut BTreeMap<BucketKey, Totals>,
    items: &[FinancialItem],
    apply: impl Fn(&mut Totals, f64),
) {
    for item in items {
        let category = item.category();
        if !matches!(category, Category::Asset | Category::Liability) {
            continue;
        }
        let totals = buckets
            .entry((category, item.subcategory.clone()))
            .or_default();
        apply(totals, item.value);
    }
}

/// Compares actual balances against one projected year, bucketed by
/// category and subcategory. Income and expense items are ignored.
pub fn compare_financial_state(
    actual_items: &[FinancialItem],
    projected: &YearResult,
    tolerance: f64,
) -> Result<ComparisonResult, ProjectionError> {
    validate_items(actual_items)?;
    validate_parameter("tolerance", tolerance)?;

    let mut totals: BTreeMap<BucketKey, Totals> = BTreeMap::new();
    add_to_buckets(&mut totals, actual_items, |t, value| t.actual += value);
    add_to_buckets(&mut totals, &projected.assets, |t, value| t.projected += value);
    add_to_buckets(&mut totals, &projected.liabilities, |t, value| t.projected += value);

    let mut actual_net_worth = 0.0;
    let mut projected_net_worth = 0.0;
    let mut buckets = Vec::with_capacity(totals.len());
    for ((category, subcategory), bucket) in totals {
        let sign = if category == Category::Liability { -1.0 } else { 1.0 };
        actual_net_worth += sign * bucket.actual;
        projected_net_worth += sign * bucket.projected;

        let percent = percent_diff(bucket.actual, bucket.projected);
        buckets.push(ComparisonBucket {
            category,
            subcategory,
            actual_value: bucket.actual,
            projected_value: bucket.projected,
            diff: bucket.actual - bucket.projected,
            percent_diff: percent,
            status: status_for(category, percent, tolerance),
        });
    }

    let summary_percent = percent_diff(actual_net_worth, projected_net_worth);
    Ok(ComparisonResult {
        year: projected.year,
        tolerance,
        buckets,
        summary: ComparisonSummary {
            actual_net_worth,
            projected_net_worth,
            diff: actual_net_worth - projected_net_worth,
            percent_diff: summary_percent,
            status: status_for(Category::Asset, summary_percent, tolerance),
        },
    })
}

/// The projected year whose age-year label covers `date`.
pub fn projected_year_for_date(
    result: &ProjectionResult,
    date: NaiveDate,
    birth_month: Option<u32>,
) -> Option<&YearResult> {
    let label = label_for_date(date, birth_month);
    result.years.iter().find(|year| year.year == label)
}
