use super::schedule::{is_active_in_year, monthly_amount};
use super::types::{CashflowEntry, FinancialItem, ItemKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashflowBreakdown {
    pub income_total: f64,
    pub expense_total: f64,
    pub income: Vec<CashflowEntry>,
    pub expenses: Vec<CashflowEntry>,
}

impl CashflowBreakdown {
    pub fn net(&self) -> f64 {
        self.income_total - self.expense_total
    }

    /// Rescales one month's figures to a period of `months` months.
    pub fn scale_period(mut self, months: f64) -> Self {
        self.income_total *= months;
        self.expense_total *= months;
        for entry in self.income.iter_mut().chain(self.expenses.iter_mut()) {
            entry.amount *= months;
        }
        self
    }
}

/// Monthly income and expense totals for `year`. Assets and liabilities
/// are ignored.
pub fn calculate_cashflow(
    items: &[FinancialItem],
    year: i32,
    base_year: i32,
    inflation_rate: f64,
) -> CashflowBreakdown {
    let mut breakdown = CashflowBreakdown::default();
    for item in items {
        let (schedule, is_income) = match &item.kind {
            ItemKind::Income(schedule) => (schedule, true),
            ItemKind::Expense(schedule) => (schedule, false),
            ItemKind::Asset(_) | ItemKind::Liability(_) => continue,
        };
        if !is_active_in_year(schedule, year) {
            continue;
        }

        let amount = monthly_amount(item.value, schedule, year, base_year, inflation_rate);
        let entry = CashflowEntry {
            id: item.id.clone(),
            name: item.name.clone(),
            amount,
        };
        if is_income {
            breakdown.income_total += amount;
            breakdown.income.push(entry);
        } else {
            breakdown.expense_total += amount;
            breakdown.expenses.push(entry);
        }
    }
    breakdown
}
