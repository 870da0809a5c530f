//! Shapes `/stats` responses for display.

use api_types::stats::{CategoryStats, StatsResponse};

use crate::{Currency, Money, calendar::month_label};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendPoint {
    /// `"Mar 2026"`.
    pub label: String,
    pub income: Money,
    pub spent: Money,
    pub net: Money,
}

/// Month-over-month movement of a category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Change {
    /// Spending unchanged; nothing to show.
    Flat,
    Up(ChangeSize),
    Down(ChangeSize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChangeSize {
    /// Absolute percentage, when the server could compute one.
    Percent(f64),
    /// Absolute amount, when there was nothing to compare against.
    Amount(Money),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTrend {
    pub label: String,
    pub current: Money,
    pub previous: Money,
    pub change: Change,
}

impl CategoryTrend {
    pub fn from_wire(stats: &CategoryStats, currency: Currency) -> Self {
        let amount = Money::from_major(stats.change_amount, currency);
        let size = match stats.change_percent {
            Some(percent) if percent.is_finite() => ChangeSize::Percent(percent.abs()),
            _ => ChangeSize::Amount(amount.abs()),
        };
        let change = if amount.is_positive() {
            Change::Up(size)
        } else if amount.is_negative() {
            Change::Down(size)
        } else {
            Change::Flat
        };
        Self {
            label: stats.category_label.clone(),
            current: Money::from_major(stats.current_month_spent, currency),
            previous: Money::from_major(stats.previous_month_spent, currency),
            change,
        }
    }
}

/// Stats view model.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsView {
    /// Oldest month first.
    pub trend: Vec<TrendPoint>,
    pub categories: Vec<CategoryTrend>,
    pub average_spending: Money,
    pub average_income: Money,
}

impl StatsView {
    pub fn from_wire(stats: &StatsResponse, currency: Currency) -> Self {
        let trend = stats
            .monthly_trends
            .iter()
            .rev()
            .map(|m| TrendPoint {
                label: month_label(m.year, m.month),
                income: Money::from_major(m.total_income, currency),
                spent: Money::from_major(m.total_spent, currency),
                net: Money::from_major(m.net, currency),
            })
            .collect();
        let categories = stats
            .category_comparisons
            .iter()
            .map(|c| CategoryTrend::from_wire(c, currency))
            .collect();
        Self {
            trend,
            categories,
            average_spending: Money::from_major(stats.average_monthly_spending, currency),
            average_income: Money::from_major(stats.average_monthly_income, currency),
        }
    }

    /// Averages, charts and comparisons only make sense once there is more
    /// than one month to look at.
    #[must_use]
    pub fn has_history(&self) -> bool {
        self.trend.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use api_types::stats::MonthlyStats;

    use super::*;

    fn monthly(year: i32, month: u32, income: f64, spent: f64) -> MonthlyStats {
        MonthlyStats {
            year,
            month,
            total_income: income,
            total_spent: spent,
            total_fixed: 0.0,
            net: income - spent,
        }
    }

    fn category(change_amount: f64, change_percent: Option<f64>) -> CategoryStats {
        CategoryStats {
            category_id: 1,
            category_label: "Food".to_string(),
            current_month_spent: 120.0,
            previous_month_spent: 120.0 - change_amount,
            change_amount,
            change_percent,
        }
    }

    #[test]
    fn trend_is_chronological_and_labelled() {
        let stats = StatsResponse {
            category_comparisons: vec![],
            monthly_trends: vec![
                monthly(2026, 2, 2000.0, 800.0),
                monthly(2026, 1, 2000.0, 900.0),
                monthly(2025, 12, 1800.0, 1200.0),
            ],
            average_monthly_spending: 966.67,
            average_monthly_income: 1933.33,
        };
        let view = StatsView::from_wire(&stats, Currency::Eur);
        let labels: Vec<_> = view.trend.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Dec 2025", "Jan 2026", "Feb 2026"]);
        assert_eq!(view.trend[0].net, Money::new(600_00));
        assert_eq!(view.average_spending, Money::new(966_67));
        assert!(view.has_history());
    }

    #[test]
    fn single_month_has_no_history() {
        let stats = StatsResponse {
            category_comparisons: vec![],
            monthly_trends: vec![monthly(2026, 2, 2000.0, 800.0)],
            average_monthly_spending: 800.0,
            average_monthly_income: 2000.0,
        };
        assert!(!StatsView::from_wire(&stats, Currency::Eur).has_history());
    }

    #[test]
    fn change_prefers_percent() {
        let trend = CategoryTrend::from_wire(&category(20.0, Some(20.0)), Currency::Eur);
        assert_eq!(trend.change, Change::Up(ChangeSize::Percent(20.0)));

        let trend = CategoryTrend::from_wire(&category(-30.0, Some(-25.0)), Currency::Eur);
        assert_eq!(trend.change, Change::Down(ChangeSize::Percent(25.0)));
    }

    #[test]
    fn change_falls_back_to_amount() {
        let trend = CategoryTrend::from_wire(&category(120.0, None), Currency::Eur);
        assert_eq!(trend.change, Change::Up(ChangeSize::Amount(Money::new(120_00))));
    }

    #[test]
    fn zero_change_is_flat() {
        let trend = CategoryTrend::from_wire(&category(0.0, Some(0.0)), Currency::Eur);
        assert_eq!(trend.change, Change::Flat);
    }
}
