mod calendar;
mod cashflow;
mod compare;
mod engine;
mod error;
mod growth;
mod liabilities;
mod real_values;
mod schedule;
mod types;
mod validate;
mod waterfall;

pub use calendar::{AgeYearPosition, age_for_label, age_year_position, label_for_date};
pub use cashflow::{CashflowBreakdown, calculate_cashflow};
pub use compare::{DEFAULT_TOLERANCE, compare_financial_state, projected_year_for_date};
pub use engine::{horizon_years, net_worth, run_multi_year_projection, run_single_year};
pub use error::ProjectionError;
pub use growth::{GrowthOutcome, apply_growth_and_yield, mid_period_growth};
pub use liabilities::{AmortizationOutcome, amortize_liabilities};
pub use real_values::transform_to_real_values;
pub use schedule::{
    annualize_amount, growth_adjusted_annual_amount, is_active_in_year, monthly_amount,
};
pub use types::{
    AssetChange, AssetTerms, CashflowEntry, Category, ComparisonBucket, ComparisonResult,
    ComparisonStatus, ComparisonSummary, FinancialItem, Frequency, Growth, ItemKind,
    LiabilityPayment, LiabilityTerms, ProjectionResult, ProjectionSummary, Schedule, UserProfile,
    YearHistory, YearResult,
};
pub use validate::{validate_item, validate_items};
pub use waterfall::{
    ALLOCATION_EPSILON, ContributionLedger, DeficitOutcome, SurplusOutcome, allocate_surplus,
    cover_deficit,
};
