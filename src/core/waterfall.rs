use std::collections::HashMap;

use super::types::{AssetChange, FinancialItem};

/// Amounts at or below this are treated as fully allocated.
pub const ALLOCATION_EPSILON: f64 = 0.01;

/// Contributions made to each asset in the current calendar year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionLedger {
    contributed: HashMap<String, f64>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contributed(&self, asset_id: &str) -> f64 {
        self.contributed.get(asset_id).copied().unwrap_or(0.0)
    }

    pub fn record(&mut self, asset_id: &str, amount: f64) {
        *self.contributed.entry(asset_id.to_string()).or_insert(0.0) += amount;
    }

    pub fn reset(&mut self) {
        self.contributed.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurplusOutcome {
    pub assets: Vec<FinancialItem>,
    pub contributions: Vec<AssetChange>,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeficitOutcome {
    pub assets: Vec<FinancialItem>,
    pub withdrawals: Vec<AssetChange>,
    pub remaining_deficit: f64,
}

/// Routes `surplus` into assets in priority order.
///
/// Only listed assets receive money unless `priority` is empty, in which
/// case every asset is offered the surplus in array order. Annual caps are
/// `max_annual_contribution * cap_scale` less what the ledger already holds
/// for the asset this calendar year.
pub fn allocate_surplus(
    assets: &[FinancialItem],
    surplus: f64,
    priority: &[String],
    ledger: &mut ContributionLedger,
    cap_scale: f64,
) -> SurplusOutcome {
    let mut updated = assets.to_vec();
    let mut contributions = Vec::new();
    let mut remaining = surplus.max(0.0);

    let order: Vec<usize> = if priority.is_empty() {
        (0..updated.len()).collect()
    } else {
        priority
            .iter()
            .filter_map(|id| updated.iter().position(|asset| &asset.id == id))
            .collect()
    };

    for idx in order {
        if remaining <= ALLOCATION_EPSILON {
            break;
        }
        let asset = &updated[idx];
        let Some(terms) = asset.asset_terms() else {
            continue;
        };

        let absorbed = match terms.max_annual_contribution {
            None => remaining,
            Some(cap) if cap <= 0.0 => 0.0,
            Some(cap) => {
                let room = (cap * cap_scale - ledger.contributed(&asset.id)).max(0.0);
                remaining.min(room)
            }
        };
        if absorbed <= 0.0 {
            continue;
        }

        ledger.record(&asset.id, absorbed);
        remaining -= absorbed;
        contributions.push(AssetChange {
            id: asset.id.clone(),
            name: asset.name.clone(),
            amount: absorbed,
        });
        updated[idx] = asset.with_value(asset.value + absorbed);
    }

    SurplusOutcome {
        assets: updated,
        contributions,
        remaining,
    }
}

/// Order in which assets are drained: listed ids first, then the rest in
/// their original order.
fn deficit_order(assets: &[FinancialItem], priority: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(assets.len());
    for id in priority {
        if let Some(idx) = assets.iter().position(|asset| &asset.id == id) {
            if !order.contains(&idx) {
                order.push(idx);
            }
        }
    }
    for idx in 0..assets.len() {
        if !order.contains(&idx) {
            order.push(idx);
        }
    }
    order
}

/// Withdraws `deficit` from assets in priority order without taking any
/// balance below zero.
pub fn cover_deficit(assets: &[FinancialItem], deficit: f64, priority: &[String]) -> DeficitOutcome {
    let mut updated = assets.to_vec();
    let mut withdrawals = Vec::new();
    let mut remaining = deficit.max(0.0);

    for idx in deficit_order(assets, priority) {
        if remaining <= 0.0 {
            break;
        }
        let asset = &updated[idx];
        if asset.asset_terms().is_none() || asset.value <= 0.0 {
            continue;
        }

        let withdrawn = remaining.min(asset.value);
        remaining -= withdrawn;
        withdrawals.push(AssetChange {
            id: asset.id.clone(),
            name: asset.name.clone(),
            amount: withdrawn,
        });
        updated[idx] = asset.with_value(asset.value - withdrawn);
    }

    DeficitOutcome {
        assets: updated,
        withdrawals,
        remaining_deficit: remaining,
    }
}
