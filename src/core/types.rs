use chrono::NaiveDate;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Expense,
    Asset,
    Liability,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Annual,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", content = "rate", rename_all = "lowercase")]
pub enum Growth {
    None,
    Inflation,
    Percentage(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub start_year: Option<i32>,
    // exclusive
    pub end_year: Option<i32>,
    pub frequency: Frequency,
    pub growth: Growth,
    pub max_value: Option<f64>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start_year: None,
            end_year: None,
            frequency: Frequency::Annual,
            growth: Growth::None,
            max_value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTerms {
    pub growth_rate: f64,
    pub yield_rate: f64,
    pub max_annual_contribution: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityTerms {
    pub interest_rate: f64,
    pub minimum_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ItemKind {
    Income(Schedule),
    Expense(Schedule),
    Asset(AssetTerms),
    Liability(LiabilityTerms),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialItem {
    pub id: String,
    pub name: String,
    pub subcategory: Option<String>,
    pub value: f64,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl FinancialItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: f64, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subcategory: None,
            value,
            kind,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub fn category(&self) -> Category {
        match self.kind {
            ItemKind::Income(_) => Category::Income,
            ItemKind::Expense(_) => Category::Expense,
            ItemKind::Asset(_) => Category::Asset,
            ItemKind::Liability(_) => Category::Liability,
        }
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match &self.kind {
            ItemKind::Income(schedule) | ItemKind::Expense(schedule) => Some(schedule),
            ItemKind::Asset(_) | ItemKind::Liability(_) => None,
        }
    }

    pub fn asset_terms(&self) -> Option<&AssetTerms> {
        match &self.kind {
            ItemKind::Asset(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn liability_terms(&self) -> Option<&LiabilityTerms> {
        match &self.kind {
            ItemKind::Liability(terms) => Some(terms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserProfile {
    pub birth_date: Option<NaiveDate>,
    pub life_expectancy: Option<u32>,
    pub start_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowEntry {
    pub id: String,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetChange {
    pub id: String,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityPayment {
    pub id: String,
    pub name: String,
    pub interest_charged: f64,
    pub principal_paid: f64,
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearHistory {
    pub income: Vec<CashflowEntry>,
    pub expenses: Vec<CashflowEntry>,
    pub asset_growth: Vec<AssetChange>,
    pub asset_yield: Vec<AssetChange>,
    pub contributions: Vec<AssetChange>,
    pub unallocated_surplus: f64,
    pub deficits: Vec<AssetChange>,
    pub unmet_deficit: f64,
    pub liabilities: Vec<LiabilityPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearResult {
    pub year: i32,
    pub age: Option<u32>,
    pub months: u32,
    pub fraction_of_year: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cashflow: f64,
    pub remaining_cashflow: f64,
    pub assets: Vec<FinancialItem>,
    pub liabilities: Vec<FinancialItem>,
    pub net_worth: f64,
    pub inflation_factor: f64,
    pub history: YearHistory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub starting_net_worth: f64,
    pub ending_net_worth: f64,
    pub total_growth: f64,
    pub average_annual_return: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: Vec<YearResult>,
    pub summary: ProjectionSummary,
    pub real_values: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    OnTrack,
    Ahead,
    Behind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonBucket {
    pub category: Category,
    pub subcategory: Option<String>,
    pub actual_value: f64,
    pub projected_value: f64,
    pub diff: f64,
    pub percent_diff: f64,
    pub status: ComparisonStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub actual_net_worth: f64,
    pub projected_net_worth: f64,
    pub diff: f64,
    pub percent_diff: f64,
    pub status: ComparisonStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub year: i32,
    pub tolerance: f64,
    pub buckets: Vec<ComparisonBucket>,
    pub summary: ComparisonSummary,
}
