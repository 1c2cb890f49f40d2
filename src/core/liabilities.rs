use super::types::{FinancialItem, LiabilityPayment};

#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationOutcome {
    pub liabilities: Vec<FinancialItem>,
    pub total_paid: f64,
    pub history: Vec<LiabilityPayment>,
}

/// Accrues interest and pays each liability from `available_cashflow`.
/// Earlier liabilities get first claim on the cash.
pub fn amortize_liabilities(
    liabilities: &[FinancialItem],
    available_cashflow: f64,
    period_fraction: f64,
) -> AmortizationOutcome {
    let mut remaining_cash = available_cashflow;
    let mut total_paid = 0.0;
    let mut updated = Vec::with_capacity(liabilities.len());
    let mut history = Vec::with_capacity(liabilities.len());

    for item in liabilities {
        let Some(terms) = item.liability_terms() else {
            updated.push(item.clone());
            continue;
        };

        let balance = item.value;
        let interest_charged = balance * terms.interest_rate * period_fraction;
        let balance_after_interest = balance + interest_charged;
        let desired_payment = (terms.minimum_payment * period_fraction)
            .min(balance_after_interest)
            .max(0.0);
        let actual_payment = desired_payment.min(remaining_cash.max(0.0));
        remaining_cash -= actual_payment;
        total_paid += actual_payment;

        let remaining_balance = (balance_after_interest - actual_payment).max(0.0);
        history.push(LiabilityPayment {
            id: item.id.clone(),
            name: item.name.clone(),
            interest_charged,
            principal_paid: actual_payment,
            remaining_balance,
        });
        updated.push(item.with_value(remaining_balance));
    }

    AmortizationOutcome {
        liabilities: updated,
        total_paid,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ItemKind, LiabilityTerms};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn loan(id: &str, balance: f64, rate: f64, minimum: f64) -> FinancialItem {
        FinancialItem::new(
            id,
            id,
            balance,
            ItemKind::Liability(LiabilityTerms {
                interest_rate: rate,
                minimum_payment: minimum,
            }),
        )
    }

    #[test]
    fn full_period_accrues_then_pays_minimum() {
        let input = vec![loan("car", 10_000.0, 0.05, 1_000.0)];
        let outcome = amortize_liabilities(&input, 50_000.0, 1.0);

        assert_approx(outcome.liabilities[0].value, 9_500.0);
        assert_approx(outcome.total_paid, 1_000.0);
        assert_approx(outcome.history[0].interest_charged, 500.0);
        assert_approx(outcome.history[0].principal_paid, 1_000.0);
        assert_approx(outcome.history[0].remaining_balance, 9_500.0);
        assert_approx(input[0].value, 10_000.0);
    }

    #[test]
    fn payment_is_capped_at_balance() {
        let input = vec![loan("card", 300.0, 0.0, 1_200.0)];
        let outcome = amortize_liabilities(&input, 5_000.0, 1.0);
        assert_approx(outcome.total_paid, 300.0);
        assert_approx(outcome.liabilities[0].value, 0.0);
    }

    #[test]
    fn earlier_liabilities_get_first_claim_on_cash() {
        let input = vec![
            loan("mortgage", 100_000.0, 0.0, 12_000.0),
            loan("car", 5_000.0, 0.0, 6_000.0),
        ];
        let outcome = amortize_liabilities(&input, 1_500.0, 1.0 / 12.0);

        assert_approx(outcome.history[0].principal_paid, 1_000.0);
        assert_approx(outcome.history[1].principal_paid, 500.0);
        assert_approx(outcome.total_paid, 1_500.0);
        assert_approx(outcome.liabilities[1].value, 4_500.0);
    }

    #[test]
    fn negative_cashflow_pays_nothing_but_still_accrues() {
        let input = vec![loan("loan", 12_000.0, 0.12, 2_400.0)];
        let outcome = amortize_liabilities(&input, -300.0, 1.0 / 12.0);
        assert_approx(outcome.total_paid, 0.0);
        assert_approx(outcome.history[0].interest_charged, 120.0);
        assert_approx(outcome.liabilities[0].value, 12_120.0);
    }

    #[test]
    fn monthly_steps_over_a_year_pay_the_annual_minimum() {
        let mut liabilities = vec![loan("loan", 10_000.0, 0.0, 1_200.0)];
        let mut paid = 0.0;
        for _ in 0..12 {
            let outcome = amortize_liabilities(&liabilities, 10_000.0, 1.0 / 12.0);
            paid += outcome.total_paid;
            liabilities = outcome.liabilities;
        }
        assert_approx(paid, 1_200.0);
        assert_approx(liabilities[0].value, 8_800.0);
    }
}
