use super::error::ProjectionError;
use super::types::{FinancialItem, Growth, ItemKind};

pub fn validate_items(items: &[FinancialItem]) -> Result<(), ProjectionError> {
    items.iter().try_for_each(validate_item)
}

pub fn validate_item(item: &FinancialItem) -> Result<(), ProjectionError> {
    check(item, "value", item.value)?;
    match &item.kind {
        ItemKind::Income(schedule) | ItemKind::Expense(schedule) => {
            if let Growth::Percentage(rate) = schedule.growth {
                check(item, "growthRate", rate)?;
            }
            if let Some(max_value) = schedule.max_value {
                check(item, "maxValue", max_value)?;
            }
        }
        ItemKind::Asset(terms) => {
            check(item, "growthRate", terms.growth_rate)?;
            check(item, "yieldRate", terms.yield_rate)?;
            if let Some(cap) = terms.max_annual_contribution {
                check(item, "maxAnnualContribution", cap)?;
            }
        }
        ItemKind::Liability(terms) => {
            check(item, "interestRate", terms.interest_rate)?;
            check(item, "minimumPayment", terms.minimum_payment)?;
        }
    }
    Ok(())
}

pub fn validate_parameter(name: &'static str, value: f64) -> Result<(), ProjectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::InvalidParameter { name })
    }
}

fn check(item: &FinancialItem, field: &'static str, value: f64) -> Result<(), ProjectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::InvalidNumericInput {
            item_id: item.id.clone(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AssetTerms, LiabilityTerms, Schedule};

    #[test]
    fn nan_value_is_rejected_with_item_id_and_field() {
        let item = FinancialItem::new("acct-1", "Savings", f64::NAN, ItemKind::Asset(AssetTerms::default()));
        let err = validate_item(&item).expect_err("NaN must be rejected");
        assert_eq!(
            err,
            ProjectionError::InvalidNumericInput {
                item_id: "acct-1".to_string(),
                field: "value",
            }
        );
        assert!(err.to_string().contains("acct-1"));
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn infinite_rates_are_rejected_per_category() {
        let asset = FinancialItem::new(
            "a",
            "Stocks",
            100.0,
            ItemKind::Asset(AssetTerms {
                yield_rate: f64::INFINITY,
                ..AssetTerms::default()
            }),
        );
        let loan = FinancialItem::new(
            "l",
            "Loan",
            100.0,
            ItemKind::Liability(LiabilityTerms {
                interest_rate: 0.05,
                minimum_payment: f64::NEG_INFINITY,
            }),
        );
        let salary = FinancialItem::new(
            "s",
            "Salary",
            100.0,
            ItemKind::Income(Schedule {
                growth: Growth::Percentage(f64::NAN),
                ..Schedule::default()
            }),
        );

        assert!(matches!(
            validate_item(&asset),
            Err(ProjectionError::InvalidNumericInput { field: "yieldRate", .. })
        ));
        assert!(matches!(
            validate_item(&loan),
            Err(ProjectionError::InvalidNumericInput { field: "minimumPayment", .. })
        ));
        assert!(matches!(
            validate_item(&salary),
            Err(ProjectionError::InvalidNumericInput { field: "growthRate", .. })
        ));
    }

    #[test]
    fn finite_items_pass() {
        let items = vec![
            FinancialItem::new("s", "Salary", 5_000.0, ItemKind::Income(Schedule::default())),
            FinancialItem::new("a", "Cash", 0.0, ItemKind::Asset(AssetTerms::default())),
        ];
        assert!(validate_items(&items).is_ok());
        assert!(validate_parameter("inflationRate", 0.025).is_ok());
        assert_eq!(
            validate_parameter("inflationRate", f64::NAN),
            Err(ProjectionError::InvalidParameter {
                name: "inflationRate"
            })
        );
    }
}
