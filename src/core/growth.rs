use super::types::{AssetChange, FinancialItem};

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOutcome {
    pub assets: Vec<FinancialItem>,
    pub growth: Vec<AssetChange>,
    pub yields: Vec<AssetChange>,
}

pub fn mid_period_growth(opening: f64, current: f64, growth_rate: f64, period_fraction: f64) -> f64 {
    let flow = current - opening;
    let principal_growth = opening * ((1.0 + growth_rate).powf(period_fraction) - 1.0);
    let flow_growth = flow * ((1.0 + growth_rate).powf(period_fraction / 2.0) - 1.0);
    principal_growth + flow_growth
}

pub fn apply_growth_and_yield(
    assets: &[FinancialItem],
    opening_values: &[f64],
    period_fraction: f64,
) -> GrowthOutcome {
    let mut updated = Vec::with_capacity(assets.len());
    let mut growth = Vec::new();
    let mut yields = Vec::new();

    for (idx, asset) in assets.iter().enumerate() {
        let Some(terms) = asset.asset_terms() else {
            updated.push(asset.clone());
            continue;
        };
        let opening = opening_values.get(idx).copied().unwrap_or(asset.value);

        // Net flows since the opening compound for half the period.
        let total_growth = mid_period_growth(opening, asset.value, terms.growth_rate, period_fraction);
        let mut value = asset.value + total_growth;
        if total_growth != 0.0 {
            growth.push(AssetChange {
                id: asset.id.clone(),
                name: asset.name.clone(),
                amount: total_growth,
            });
        }

        let yield_amount = value * terms.yield_rate * period_fraction;
        value += yield_amount;
        if yield_amount != 0.0 {
            yields.push(AssetChange {
                id: asset.id.clone(),
                name: asset.name.clone(),
                amount: yield_amount,
            });
        }

        updated.push(asset.with_value(value));
    }

    GrowthOutcome {
        assets: updated,
        growth,
        yields,
    }
}
