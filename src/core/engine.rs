use chrono::Datelike;
use tracing::{debug, trace};

use super::calendar::{
    AgeYearPosition, age_for_label, age_year_position, calendar_year_position, next_month,
};
use super::cashflow::calculate_cashflow;
use super::error::ProjectionError;
use super::growth::apply_growth_and_yield;
use super::liabilities::amortize_liabilities;
use super::types::{
    AssetChange, CashflowEntry, Category, FinancialItem, LiabilityPayment, ProjectionResult,
    ProjectionSummary, UserProfile, YearHistory, YearResult,
};
use super::validate::{validate_items, validate_parameter};
use super::waterfall::{ALLOCATION_EPSILON, ContributionLedger, allocate_surplus, cover_deficit};

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy)]
struct Period<'a> {
    year: i32,
    base_year: i32,
    inflation_rate: f64,
    fraction: f64,
    cap_scale: f64,
    surplus_priority: &'a [String],
    deficit_priority: &'a [String],
}

#[derive(Debug)]
struct SimulationState {
    assets: Vec<FinancialItem>,
    liabilities: Vec<FinancialItem>,
    ledger: ContributionLedger,
    inflation_factor: f64,
}

impl SimulationState {
    fn net_worth(&self) -> f64 {
        net_worth(&self.assets, &self.liabilities)
    }
}

#[derive(Debug)]
struct PeriodOutcome {
    income_total: f64,
    expense_total: f64,
    income: Vec<CashflowEntry>,
    expenses: Vec<CashflowEntry>,
    remaining_cashflow: f64,
    contributions: Vec<AssetChange>,
    unallocated_surplus: f64,
    withdrawals: Vec<AssetChange>,
    unmet_deficit: f64,
    growth: Vec<AssetChange>,
    yields: Vec<AssetChange>,
    liability_payments: Vec<LiabilityPayment>,
}

trait Accumulate {
    fn key(&self) -> &str;
    fn accumulate(&mut self, other: &Self);
}

impl Accumulate for CashflowEntry {
    fn key(&self) -> &str {
        &self.id
    }

    fn accumulate(&mut self, other: &Self) {
        self.amount += other.amount;
    }
}

impl Accumulate for AssetChange {
    fn key(&self) -> &str {
        &self.id
    }

    fn accumulate(&mut self, other: &Self) {
        self.amount += other.amount;
    }
}

impl Accumulate for LiabilityPayment {
    fn key(&self) -> &str {
        &self.id
    }

    // Flows sum across months; the balance is a point-in-time figure.
    fn accumulate(&mut self, other: &Self) {
        self.interest_charged += other.interest_charged;
        self.principal_paid += other.principal_paid;
        self.remaining_balance = other.remaining_balance;
    }
}

fn merge_into<T: Accumulate + Clone>(target: &mut Vec<T>, incoming: &[T]) {
    for entry in incoming {
        match target.iter_mut().find(|existing| existing.key() == entry.key()) {
            Some(existing) => existing.accumulate(entry),
            None => target.push(entry.clone()),
        }
    }
}

struct YearAccumulator {
    label: i32,
    age: Option<u32>,
    months: u32,
    total_income: f64,
    total_expenses: f64,
    remaining_cashflow: f64,
    history: YearHistory,
}

impl YearAccumulator {
    fn new(label: i32, age: Option<u32>) -> Self {
        Self {
            label,
            age,
            months: 0,
            total_income: 0.0,
            total_expenses: 0.0,
            remaining_cashflow: 0.0,
            history: YearHistory::default(),
        }
    }

    fn absorb(&mut self, outcome: &PeriodOutcome) {
        self.months += 1;
        self.total_income += outcome.income_total;
        self.total_expenses += outcome.expense_total;
        self.remaining_cashflow += outcome.remaining_cashflow;

        let history = &mut self.history;
        merge_into(&mut history.income, &outcome.income);
        merge_into(&mut history.expenses, &outcome.expenses);
        merge_into(&mut history.asset_growth, &outcome.growth);
        merge_into(&mut history.asset_yield, &outcome.yields);
        merge_into(&mut history.contributions, &outcome.contributions);
        merge_into(&mut history.deficits, &outcome.withdrawals);
        merge_into(&mut history.liabilities, &outcome.liability_payments);
        history.unallocated_surplus += outcome.unallocated_surplus;
        history.unmet_deficit += outcome.unmet_deficit;
    }

    fn finish(self, state: &SimulationState) -> YearResult {
        YearResult {
            year: self.label,
            age: self.age,
            months: self.months,
            fraction_of_year: self.months as f64 / MONTHS_PER_YEAR,
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            net_cashflow: self.total_income - self.total_expenses,
            remaining_cashflow: self.remaining_cashflow,
            assets: state.assets.clone(),
            liabilities: state.liabilities.clone(),
            net_worth: state.net_worth(),
            inflation_factor: state.inflation_factor,
            history: self.history,
        }
    }
}

pub fn net_worth(assets: &[FinancialItem], liabilities: &[FinancialItem]) -> f64 {
    let held: f64 = assets
        .iter()
        .filter(|item| item.category() == Category::Asset)
        .map(|item| item.value)
        .sum();
    let owed: f64 = liabilities
        .iter()
        .filter(|item| item.category() == Category::Liability)
        .map(|item| item.value)
        .sum();
    held - owed
}

fn split_items(items: &[FinancialItem]) -> (Vec<FinancialItem>, Vec<FinancialItem>, Vec<FinancialItem>) {
    let mut flows = Vec::new();
    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    for item in items {
        match item.category() {
            Category::Income | Category::Expense => flows.push(item.clone()),
            Category::Asset => assets.push(item.clone()),
            Category::Liability => liabilities.push(item.clone()),
        }
    }
    (flows, assets, liabilities)
}

fn step_period(state: &mut SimulationState, flows: &[FinancialItem], period: &Period) -> PeriodOutcome {
    let opening: Vec<f64> = state.assets.iter().map(|asset| asset.value).collect();

    let cashflow = calculate_cashflow(flows, period.year, period.base_year, period.inflation_rate)
        .scale_period(period.fraction * MONTHS_PER_YEAR);
    let net = cashflow.net();

    let amortization = amortize_liabilities(&state.liabilities, net, period.fraction);
    let mut remaining = net - amortization.total_paid;

    let mut contributions = Vec::new();
    let mut withdrawals = Vec::new();
    let mut unallocated_surplus = 0.0;
    let mut unmet_deficit = 0.0;

    let assets_after_flows = if remaining > ALLOCATION_EPSILON {
        let surplus = allocate_surplus(
            &state.assets,
            remaining,
            period.surplus_priority,
            &mut state.ledger,
            period.cap_scale,
        );
        remaining = surplus.remaining;
        unallocated_surplus = surplus.remaining;
        contributions = surplus.contributions;
        surplus.assets
    } else if remaining < -ALLOCATION_EPSILON {
        let deficit = cover_deficit(&state.assets, -remaining, period.deficit_priority);
        remaining = -deficit.remaining_deficit;
        unmet_deficit = deficit.remaining_deficit;
        withdrawals = deficit.withdrawals;
        if unmet_deficit > 0.0 {
            debug!(year = period.year, unmet_deficit, "deficit not covered by assets");
        }
        deficit.assets
    } else {
        state.assets.clone()
    };

    let grown = apply_growth_and_yield(&assets_after_flows, &opening, period.fraction);
    state.assets = grown.assets;
    state.liabilities = amortization.liabilities;

    PeriodOutcome {
        income_total: cashflow.income_total,
        expense_total: cashflow.expense_total,
        income: cashflow.income,
        expenses: cashflow.expenses,
        remaining_cashflow: remaining,
        contributions,
        unallocated_surplus,
        withdrawals,
        unmet_deficit,
        growth: grown.growth,
        yields: grown.yields,
        liability_payments: amortization.history,
    }
}

pub(crate) fn summarize(starting_net_worth: f64, years: &[YearResult]) -> ProjectionSummary {
    let ending_net_worth = years
        .last()
        .map(|year| year.net_worth)
        .unwrap_or(starting_net_worth);
    let elapsed_years: f64 = years.iter().map(|year| year.fraction_of_year).sum();
    let average_annual_return =
        if starting_net_worth > 0.0 && ending_net_worth > 0.0 && elapsed_years > 0.0 {
            (ending_net_worth / starting_net_worth).powf(1.0 / elapsed_years) - 1.0
        } else {
            0.0
        };

    ProjectionSummary {
        starting_net_worth,
        ending_net_worth,
        total_growth: ending_net_worth - starting_net_worth,
        average_annual_return,
    }
}

pub fn horizon_years(start_year: i32, default_years: i32, profile: &UserProfile) -> i32 {
    match (profile.birth_date, profile.life_expectancy) {
        (Some(birth_date), Some(life_expectancy)) => {
            birth_date.year() + life_expectancy as i32 - start_year
        }
        _ => default_years,
    }
}

pub fn run_multi_year_projection(
    items: &[FinancialItem],
    start_year: i32,
    number_of_years: i32,
    profile: &UserProfile,
    surplus_priority: &[String],
    deficit_priority: &[String],
    inflation_rate: f64,
) -> Result<ProjectionResult, ProjectionError> {
    validate_items(items)?;
    validate_parameter("inflationRate", inflation_rate)?;

    let (flows, assets, liabilities) = split_items(items);
    let starting_net_worth = net_worth(&assets, &liabilities);
    let years = horizon_years(start_year, number_of_years, profile);
    if years <= 0 {
        debug!(start_year, years, "empty projection horizon");
        return Ok(ProjectionResult {
            years: Vec::new(),
            summary: summarize(starting_net_worth, &[]),
            real_values: false,
        });
    }

    let total_months = years as u32 * 12;
    let birth_month = profile.birth_date.map(|date| date.month());
    let birth_year = profile.birth_date.map(|date| date.year());
    let monthly_inflation = (1.0 + inflation_rate).powf(1.0 / MONTHS_PER_YEAR) - 1.0;
    debug!(
        items = items.len(),
        start_year,
        years,
        inflation_rate,
        "running projection"
    );

    let mut state = SimulationState {
        assets,
        liabilities,
        ledger: ContributionLedger::new(),
        inflation_factor: 1.0,
    };
    let (mut year, mut month) = (start_year, profile.start_month.clamp(1, 12));
    let mut bucket: Option<YearAccumulator> = None;
    let mut results = Vec::with_capacity(years as usize + 1);

    for _ in 0..total_months {
        if month == 1 {
            state.ledger.reset();
        }
        let position: AgeYearPosition = match birth_month {
            Some(birth_month) => age_year_position(year, month, birth_month),
            None => calendar_year_position(year, month),
        };
        let period = Period {
            year,
            base_year: start_year,
            inflation_rate,
            fraction: 1.0 / MONTHS_PER_YEAR,
            cap_scale: 1.0,
            surplus_priority,
            deficit_priority,
        };

        let outcome = step_period(&mut state, &flows, &period);
        state.inflation_factor *= 1.0 + monthly_inflation;

        let accumulator = bucket.get_or_insert_with(|| {
            YearAccumulator::new(
                position.label,
                birth_year.map(|birth_year| age_for_label(position.label, birth_year)),
            )
        });
        accumulator.absorb(&outcome);

        if position.is_boundary {
            if let Some(finished) = bucket.take() {
                trace!(label = finished.label, months = finished.months, "age year closed");
                results.push(finished.finish(&state));
            }
        }
        (year, month) = next_month(year, month);
    }

    if let Some(partial) = bucket.take() {
        trace!(label = partial.label, months = partial.months, "partial age year closed");
        results.push(partial.finish(&state));
    }

    let summary = summarize(starting_net_worth, &results);
    debug!(
        years = results.len(),
        ending_net_worth = summary.ending_net_worth,
        "projection finished"
    );
    Ok(ProjectionResult {
        years: results,
        summary,
        real_values: false,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn run_single_year(
    incomes: &[FinancialItem],
    expenses: &[FinancialItem],
    assets: &[FinancialItem],
    liabilities: &[FinancialItem],
    year: i32,
    fraction_of_year: f64,
    surplus_priority: &[String],
    deficit_priority: &[String],
) -> Result<YearResult, ProjectionError> {
    validate_parameter("fractionOfYear", fraction_of_year)?;
    for group in [incomes, expenses, assets, liabilities] {
        validate_items(group)?;
    }

    let fraction = fraction_of_year.max(0.0);
    let flows: Vec<FinancialItem> = incomes.iter().chain(expenses).cloned().collect();
    let mut state = SimulationState {
        assets: assets.to_vec(),
        liabilities: liabilities.to_vec(),
        ledger: ContributionLedger::new(),
        inflation_factor: 1.0,
    };
    // No inflation rate is known for an ad-hoc period.
    let period = Period {
        year,
        base_year: year,
        inflation_rate: 0.0,
        fraction,
        cap_scale: fraction,
        surplus_priority,
        deficit_priority,
    };

    let outcome = step_period(&mut state, &flows, &period);
    let mut accumulator = YearAccumulator::new(year, None);
    accumulator.absorb(&outcome);
    let mut result = accumulator.finish(&state);
    result.months = (fraction * MONTHS_PER_YEAR).round() as u32;
    result.fraction_of_year = fraction;
    Ok(result)
}
