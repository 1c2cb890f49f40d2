use super::types::{Frequency, Growth, Schedule};

pub fn is_active_in_year(schedule: &Schedule, year: i32) -> bool {
    let started = schedule.start_year.is_none_or(|start| start <= year);
    let not_ended = schedule.end_year.is_none_or(|end| year < end);
    started && not_ended
}

pub fn annualize_amount(value: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Monthly => value * 12.0,
        Frequency::Annual => value,
    }
}

/// Year the growth clock starts from.
///
/// Percentage growth (pay rises, contractual escalators) starts at the
/// item's own start year. Inflation matching is denominated in the
/// projection's base-year money, so it always counts from `base_year`.
fn growth_start_year(schedule: &Schedule, base_year: i32) -> i32 {
    match schedule.growth {
        Growth::Percentage(_) => schedule.start_year.unwrap_or(base_year),
        Growth::None | Growth::Inflation => base_year,
    }
}

pub fn growth_adjusted_annual_amount(
    value: f64,
    schedule: &Schedule,
    year: i32,
    base_year: i32,
    inflation_rate: f64,
) -> f64 {
    let annual = annualize_amount(value, schedule.frequency);
    let elapsed = (year - growth_start_year(schedule, base_year)).max(0);
    let grown = match schedule.growth {
        Growth::None => annual,
        Growth::Inflation => annual * (1.0 + inflation_rate).powi(elapsed),
        Growth::Percentage(rate) => annual * (1.0 + rate).powi(elapsed),
    };
    match schedule.max_value {
        Some(cap) => grown.min(cap),
        None => grown,
    }
}

pub fn monthly_amount(
    value: f64,
    schedule: &Schedule,
    year: i32,
    base_year: i32,
    inflation_rate: f64,
) -> f64 {
    growth_adjusted_annual_amount(value, schedule, year, base_year, inflation_rate) / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn bounded(start: Option<i32>, end: Option<i32>) -> Schedule {
        Schedule {
            start_year: start,
            end_year: end,
            ..Schedule::default()
        }
    }

    #[test]
    fn end_year_is_exclusive() {
        let schedule = bounded(Some(2020), Some(2030));
        assert!(!is_active_in_year(&schedule, 2019));
        assert!(is_active_in_year(&schedule, 2020));
        assert!(is_active_in_year(&schedule, 2029));
        assert!(!is_active_in_year(&schedule, 2030));
    }

    #[test]
    fn handover_year_never_double_counts() {
        let old_job = bounded(Some(2020), Some(2025));
        let new_job = bounded(Some(2025), None);
        for year in 2018..2035 {
            let active = [&old_job, &new_job]
                .iter()
                .filter(|s| is_active_in_year(s, year))
                .count();
            assert!(active <= 1, "year {year} counted {active} times");
        }
        assert!(is_active_in_year(&new_job, 2025));
        assert!(!is_active_in_year(&old_job, 2025));
    }

    #[test]
    fn missing_bounds_are_open() {
        let schedule = bounded(None, None);
        assert!(is_active_in_year(&schedule, -500));
        assert!(is_active_in_year(&schedule, 9_999));
        assert!(is_active_in_year(&bounded(None, Some(2000)), 1999));
        assert!(is_active_in_year(&bounded(Some(2000), None), 3000));
    }

    #[test]
    fn monthly_frequency_annualizes_by_twelve() {
        assert_approx(annualize_amount(1_000.0, Frequency::Monthly), 12_000.0);
        assert_approx(annualize_amount(1_000.0, Frequency::Annual), 1_000.0);
    }

    #[test]
    fn percentage_growth_counts_from_item_start() {
        let schedule = Schedule {
            start_year: Some(2030),
            growth: Growth::Percentage(0.10),
            ..Schedule::default()
        };
        assert_approx(
            growth_adjusted_annual_amount(1_000.0, &schedule, 2030, 2025, 0.0),
            1_000.0,
        );
        assert_approx(
            growth_adjusted_annual_amount(1_000.0, &schedule, 2032, 2025, 0.0),
            1_210.0,
        );
    }

    #[test]
    fn inflation_growth_counts_from_base_year() {
        let schedule = Schedule {
            start_year: Some(2039),
            growth: Growth::Inflation,
            ..Schedule::default()
        };
        let amount = growth_adjusted_annual_amount(10_000.0, &schedule, 2039, 2025, 0.03);
        assert_approx(amount, 10_000.0 * 1.03_f64.powi(14));
    }

    #[test]
    fn growth_before_start_is_clamped_to_zero_years() {
        let schedule = Schedule {
            start_year: Some(2030),
            growth: Growth::Percentage(0.05),
            ..Schedule::default()
        };
        assert_approx(
            growth_adjusted_annual_amount(500.0, &schedule, 2026, 2025, 0.0),
            500.0,
        );
    }

    #[test]
    fn max_value_caps_every_year_after_growth() {
        let schedule = Schedule {
            start_year: Some(2025),
            frequency: Frequency::Monthly,
            growth: Growth::Percentage(0.10),
            max_value: Some(13_000.0),
            ..Schedule::default()
        };
        assert_approx(
            growth_adjusted_annual_amount(1_000.0, &schedule, 2025, 2025, 0.0),
            12_000.0,
        );
        assert_approx(
            growth_adjusted_annual_amount(1_000.0, &schedule, 2026, 2025, 0.0),
            13_000.0,
        );
        assert_approx(
            growth_adjusted_annual_amount(1_000.0, &schedule, 2040, 2025, 0.0),
            13_000.0,
        );
        assert_approx(monthly_amount(1_000.0, &schedule, 2040, 2025, 0.0), 13_000.0 / 12.0);
    }

    #[test]
    fn no_growth_ignores_inflation() {
        let schedule = Schedule::default();
        assert_approx(
            growth_adjusted_annual_amount(2_400.0, &schedule, 2050, 2025, 0.05),
            2_400.0,
        );
    }
}
