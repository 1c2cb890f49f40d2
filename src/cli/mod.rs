use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{
    AssetTerms, Category, FinancialItem, Frequency, Growth, ItemKind, LiabilityTerms,
    ProjectionResult, Schedule, UserProfile, compare_financial_state, projected_year_for_date,
    run_multi_year_projection, run_single_year, transform_to_real_values,
};

const DEFAULT_HORIZON_YEARS: i32 = 30;
const DEFAULT_INFLATION_RATE: f64 = 0.025;

#[derive(Parser, Debug)]
#[command(
    name = "networth",
    about = "Month-by-month net worth projection over incomes, expenses, assets and liabilities"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Project a plan file forward and print every age year")]
    Project(ProjectArgs),
    #[command(about = "Recalculate a single ad-hoc period from a plan file's items")]
    Year(YearArgs),
    #[command(about = "Compare a dated snapshot of actual balances with the projection")]
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(long, help = "Path to the JSON plan file")]
    plan: PathBuf,
    #[arg(long, help = "Horizon in years, overrides the plan file")]
    years: Option<i32>,
    #[arg(
        long,
        help = "Expected annual inflation in percent, e.g. 2.5; overrides the plan file"
    )]
    inflation_rate: Option<f64>,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(long, help = "Report values in today's money")]
    real: bool,
}

#[derive(Args, Debug)]
struct YearArgs {
    #[arg(long, help = "Path to the JSON plan file")]
    plan: PathBuf,
    #[arg(long)]
    year: i32,
    #[arg(long, default_value_t = 1.0, help = "Length of the period in years")]
    fraction: f64,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(long, help = "Path to the JSON snapshot file")]
    snapshot: PathBuf,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Difference in percent still reported as on track"
    )]
    tolerance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiCategory {
    #[serde(alias = "incomes")]
    Income,
    #[serde(alias = "expenses")]
    Expense,
    #[serde(alias = "assets")]
    Asset,
    #[serde(alias = "liabilities", alias = "debt")]
    Liability,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiFrequency {
    Monthly,
    #[serde(alias = "yearly", alias = "annually")]
    Annual,
}

impl From<ApiFrequency> for Frequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Monthly => Frequency::Monthly,
            ApiFrequency::Annual => Frequency::Annual,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiGrowthMode {
    None,
    Inflation,
    #[serde(alias = "fixed")]
    Percentage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemPayload {
    id: String,
    name: Option<String>,
    category: ApiCategory,
    subcategory: Option<String>,
    value: f64,
    #[serde(default, alias = "start_year")]
    start_year: Option<i32>,
    #[serde(default, alias = "end_year")]
    end_year: Option<i32>,
    #[serde(default)]
    frequency: Option<ApiFrequency>,
    #[serde(default, alias = "growth_mode")]
    growth_mode: Option<ApiGrowthMode>,
    #[serde(default, alias = "growth_rate")]
    growth_rate: Option<f64>,
    #[serde(default, alias = "max_value")]
    max_value: Option<f64>,
    #[serde(default, alias = "is_adjusted_for_inflation")]
    is_adjusted_for_inflation: Option<bool>,
    #[serde(default, alias = "yield_rate")]
    yield_rate: Option<f64>,
    #[serde(default, alias = "max_annual_contribution")]
    max_annual_contribution: Option<f64>,
    #[serde(default, alias = "interest_rate")]
    interest_rate: Option<f64>,
    #[serde(default, alias = "minimum_payment")]
    minimum_payment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    #[serde(alias = "start_year")]
    start_year: Option<i32>,
    #[serde(alias = "start_month")]
    start_month: Option<u32>,
    #[serde(alias = "number_of_years", alias = "years")]
    number_of_years: Option<i32>,
    #[serde(alias = "birth_date")]
    birth_date: Option<NaiveDate>,
    #[serde(alias = "life_expectancy")]
    life_expectancy: Option<u32>,
    #[serde(alias = "inflation_rate")]
    inflation_rate: Option<f64>,
    #[serde(alias = "surplus_priority")]
    surplus_priority: Vec<String>,
    #[serde(alias = "deficit_priority")]
    deficit_priority: Vec<String>,
    items: Vec<ItemPayload>,
}

#[derive(Debug, Deserialize)]
struct SnapshotPayload {
    date: NaiveDate,
    items: Vec<ItemPayload>,
}

#[derive(Debug)]
struct PlanRequest {
    items: Vec<FinancialItem>,
    start_year: i32,
    number_of_years: i32,
    profile: UserProfile,
    surplus_priority: Vec<String>,
    deficit_priority: Vec<String>,
    inflation_rate: f64,
}

impl PlanRequest {
    fn project(&self) -> Result<ProjectionResult, String> {
        run_multi_year_projection(
            &self.items,
            self.start_year,
            self.number_of_years,
            &self.profile,
            &self.surplus_priority,
            &self.deficit_priority,
            self.inflation_rate,
        )
        .map_err(|e| e.to_string())
    }

    fn items_in(&self, category: Category) -> Vec<FinancialItem> {
        self.items
            .iter()
            .filter(|item| item.category() == category)
            .cloned()
            .collect()
    }
}

fn growth_from_payload(payload: &ItemPayload) -> Result<Growth, String> {
    match payload.growth_mode {
        Some(ApiGrowthMode::None) => Ok(Growth::None),
        Some(ApiGrowthMode::Inflation) => Ok(Growth::Inflation),
        Some(ApiGrowthMode::Percentage) => {
            payload.growth_rate.map(Growth::Percentage).ok_or_else(|| {
                format!(
                    "item '{}': growthMode 'percentage' requires growthRate",
                    payload.id
                )
            })
        }
        None if payload.is_adjusted_for_inflation == Some(true) => Ok(Growth::Inflation),
        None => Ok(Growth::None),
    }
}

fn item_from_payload(payload: ItemPayload) -> Result<FinancialItem, String> {
    if payload.id.trim().is_empty() {
        return Err("item id must not be empty".to_string());
    }
    if let (Some(start), Some(end)) = (payload.start_year, payload.end_year) {
        if end < start {
            return Err(format!(
                "item '{}': endYear must be >= startYear",
                payload.id
            ));
        }
    }

    let kind = match payload.category {
        ApiCategory::Income | ApiCategory::Expense => {
            let schedule = Schedule {
                start_year: payload.start_year,
                end_year: payload.end_year,
                frequency: payload.frequency.map(Frequency::from).unwrap_or(Frequency::Annual),
                growth: growth_from_payload(&payload)?,
                max_value: payload.max_value,
            };
            if payload.category == ApiCategory::Income {
                ItemKind::Income(schedule)
            } else {
                ItemKind::Expense(schedule)
            }
        }
        ApiCategory::Asset => ItemKind::Asset(AssetTerms {
            growth_rate: payload.growth_rate.unwrap_or(0.0),
            yield_rate: payload.yield_rate.unwrap_or(0.0),
            max_annual_contribution: payload.max_annual_contribution,
        }),
        ApiCategory::Liability => ItemKind::Liability(LiabilityTerms {
            interest_rate: payload.interest_rate.unwrap_or(0.0),
            minimum_payment: payload.minimum_payment.unwrap_or(0.0),
        }),
    };

    Ok(FinancialItem {
        name: payload.name.unwrap_or_else(|| payload.id.clone()),
        id: payload.id,
        subcategory: payload.subcategory,
        value: payload.value,
        kind,
    })
}

fn items_from_payload(payloads: Vec<ItemPayload>) -> Result<Vec<FinancialItem>, String> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(payloads.len());
    for payload in payloads {
        if !seen.insert(payload.id.clone()) {
            return Err(format!("duplicate item id '{}'", payload.id));
        }
        items.push(item_from_payload(payload)?);
    }
    Ok(items)
}

fn check_priority(field: &str, priority: &[String], items: &[FinancialItem]) -> Result<(), String> {
    for id in priority {
        let known_asset = items
            .iter()
            .any(|item| &item.id == id && item.category() == Category::Asset);
        if !known_asset {
            return Err(format!("{field} references unknown asset id '{id}'"));
        }
    }
    Ok(())
}

// `today` seeds the start year and month when the plan leaves them out.
fn build_request(
    payload: PlanPayload,
    years_override: Option<i32>,
    inflation_override_percent: Option<f64>,
    today: NaiveDate,
) -> Result<PlanRequest, String> {
    let start_month = payload.start_month.unwrap_or(today.month());
    if !(1..=12).contains(&start_month) {
        return Err("startMonth must be between 1 and 12".to_string());
    }

    let inflation_rate = match inflation_override_percent {
        Some(percent) => percent / 100.0,
        None => payload.inflation_rate.unwrap_or(DEFAULT_INFLATION_RATE),
    };
    if inflation_rate <= -1.0 {
        return Err("--inflation-rate must be > -100".to_string());
    }

    if let Some(life_expectancy) = payload.life_expectancy {
        if payload.birth_date.is_none() {
            return Err(format!(
                "lifeExpectancy {life_expectancy} needs a birthDate to set the horizon"
            ));
        }
    }

    let items = items_from_payload(payload.items)?;
    check_priority("surplusPriority", &payload.surplus_priority, &items)?;
    check_priority("deficitPriority", &payload.deficit_priority, &items)?;

    Ok(PlanRequest {
        items,
        start_year: payload.start_year.unwrap_or(today.year()),
        number_of_years: years_override
            .or(payload.number_of_years)
            .unwrap_or(DEFAULT_HORIZON_YEARS),
        profile: UserProfile {
            birth_date: payload.birth_date,
            // An explicit --years wins over the life-expectancy horizon.
            life_expectancy: if years_override.is_some() {
                None
            } else {
                payload.life_expectancy
            },
            start_month,
        },
        surplus_priority: payload.surplus_priority,
        deficit_priority: payload.deficit_priority,
        inflation_rate,
    })
}

fn parse_plan(json: &str) -> Result<PlanPayload, String> {
    serde_json::from_str::<PlanPayload>(json).map_err(|e| format!("Invalid plan JSON: {e}"))
}

fn parse_snapshot(json: &str) -> Result<SnapshotPayload, String> {
    serde_json::from_str::<SnapshotPayload>(json).map_err(|e| format!("Invalid snapshot JSON: {e}"))
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn load_request(args: &PlanArgs, today: NaiveDate) -> Result<PlanRequest, String> {
    let payload = parse_plan(&read_file(&args.plan)?)?;
    let request = build_request(payload, args.years, args.inflation_rate, today)?;
    debug!(
        plan = %args.plan.display(),
        items = request.items.len(),
        start_year = request.start_year,
        "plan loaded"
    );
    Ok(request)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize result: {e}"))
}

pub fn run(cli: Cli, today: NaiveDate) -> Result<String, String> {
    match cli.command {
        Command::Project(args) => {
            let request = load_request(&args.plan, today)?;
            let nominal = request.project()?;
            info!(years = nominal.years.len(), real = args.real, "projection complete");
            if args.real {
                to_json(&transform_to_real_values(&nominal))
            } else {
                to_json(&nominal)
            }
        }
        Command::Year(args) => {
            if !(args.fraction > 0.0 && args.fraction <= 1.0) {
                return Err("--fraction must be in (0, 1]".to_string());
            }
            let payload = parse_plan(&read_file(&args.plan)?)?;
            let request = build_request(payload, None, None, today)?;
            let result = run_single_year(
                &request.items_in(Category::Income),
                &request.items_in(Category::Expense),
                &request.items_in(Category::Asset),
                &request.items_in(Category::Liability),
                args.year,
                args.fraction,
                &request.surplus_priority,
                &request.deficit_priority,
            )
            .map_err(|e| e.to_string())?;
            to_json(&result)
        }
        Command::Compare(args) => {
            if !(0.0..=100.0).contains(&args.tolerance) {
                return Err("--tolerance must be between 0 and 100".to_string());
            }
            let request = load_request(&args.plan, today)?;
            let snapshot = parse_snapshot(&read_file(&args.snapshot)?)?;
            let actual = items_from_payload(snapshot.items)?;
            let projection = request.project()?;
            let birth_month = request.profile.birth_date.map(|date| date.month());
            let year = projected_year_for_date(&projection, snapshot.date, birth_month)
                .ok_or_else(|| format!("snapshot date {} is outside the projection", snapshot.date))?;
            let comparison = compare_financial_state(&actual, year, args.tolerance / 100.0)
                .map_err(|e| e.to_string())?;
            to_json(&comparison)
        }
    }
}
