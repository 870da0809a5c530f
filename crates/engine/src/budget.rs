use api_types::{budget::MonthlyBudgetWithCategory, month::MonthSummary};

use crate::{Currency, Money};

/// Month-level totals as reported by the server, in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthTotals {
    pub income: Money,
    pub fixed: Money,
    pub budgeted: Money,
    pub spent: Money,
    /// `income - fixed - spent`; negative means a deficit.
    pub remaining: Money,
}

impl MonthTotals {
    pub fn from_summary(summary: &MonthSummary, currency: Currency) -> Self {
        Self {
            income: Money::from_major(summary.total_income, currency),
            fixed: Money::from_major(summary.total_fixed, currency),
            budgeted: Money::from_major(summary.total_budgeted, currency),
            spent: Money::from_major(summary.total_spent, currency),
            remaining: Money::from_major(summary.remaining, currency),
        }
    }
}

/// Budget lines of a month, in server order.
pub fn lines_from_summary(summary: &MonthSummary, currency: Currency) -> Vec<BudgetLine> {
    summary
        .budgets
        .iter()
        .map(|budget| BudgetLine::from_wire(budget, currency))
        .collect()
}

/// One category's allocated vs. spent amount for a month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetLine {
    pub label: String,
    pub allocated: Money,
    pub spent: Money,
}

/// Where a budget line lands in the variance breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClass {
    /// Spent more than allocated on a planned category.
    OverBudget,
    /// Spent on a category with no allocation at all.
    Unplanned,
    /// Spent less than allocated.
    UnderBudget,
}

impl BudgetLine {
    pub fn new(label: impl Into<String>, allocated: Money, spent: Money) -> Self {
        Self {
            label: label.into(),
            allocated,
            spent,
        }
    }

    /// Builds a line from the server's budget row.
    pub fn from_wire(budget: &MonthlyBudgetWithCategory, currency: Currency) -> Self {
        Self {
            label: budget.category_label.clone(),
            allocated: Money::from_major(budget.allocated_amount, currency),
            spent: Money::from_major(budget.spent_amount, currency),
        }
    }

    /// `spent - allocated`: positive means overspent.
    #[must_use]
    pub fn variance(&self) -> Money {
        self.spent - self.allocated
    }

    /// Returns the bucket for this line, or `None` when spending matches the
    /// allocation exactly (including the empty `0 / 0` line).
    #[must_use]
    pub fn classify(&self) -> Option<LineClass> {
        let variance = self.variance();
        if self.allocated.is_zero() && self.spent.is_positive() {
            Some(LineClass::Unplanned)
        } else if variance.is_positive() {
            Some(LineClass::OverBudget)
        } else if variance.is_negative() {
            Some(LineClass::UnderBudget)
        } else {
            None
        }
    }

    /// Share of the allocation already spent, in `0.0..=1.0`.
    ///
    /// Lines without an allocation report `1.0` as soon as anything is spent.
    #[must_use]
    pub fn usage_ratio(&self) -> f64 {
        if self.allocated.is_positive() {
            (self.spent.minor() as f64 / self.allocated.minor() as f64).clamp(0.0, 1.0)
        } else if self.spent.is_positive() {
            1.0
        } else {
            0.0
        }
    }
}
