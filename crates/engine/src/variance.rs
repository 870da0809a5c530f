//! Budget variance breakdown for a month.
//!
//! Lines are split into three disjoint buckets (see [`LineClass`]) and the
//! buckets are folded into the scalar figures shown in the analysis view.
//! Everything is recomputed from scratch for each month summary.

use api_types::month::MonthSummary;

use crate::{
    BudgetLine, Currency, LineClass, Money,
    budget::{MonthTotals, lines_from_summary},
};

/// A classified budget line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineVariance {
    pub label: String,
    pub allocated: Money,
    pub spent: Money,
    /// `spent - allocated`.
    pub variance: Money,
}

impl From<&BudgetLine> for LineVariance {
    fn from(line: &BudgetLine) -> Self {
        Self {
            label: line.label.clone(),
            allocated: line.allocated,
            spent: line.spent,
            variance: line.variance(),
        }
    }
}

/// The three buckets and their totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarianceReport {
    /// Largest overrun first.
    pub over_budget: Vec<LineVariance>,
    /// Largest spend first.
    pub unplanned: Vec<LineVariance>,
    /// Most negative variance (biggest saving) first.
    pub under_budget: Vec<LineVariance>,
    /// Sum of positive variances of planned categories.
    pub total_overspend: Money,
    /// Sum of spending on categories without allocation.
    pub total_unplanned: Money,
    /// Sum of the absolute value of negative variances.
    pub total_saved: Money,
}

impl VarianceReport {
    pub fn from_lines(lines: &[BudgetLine]) -> Self {
        let mut report = Self::default();

        for line in lines {
            match line.classify() {
                Some(LineClass::Unplanned) => report.unplanned.push(line.into()),
                Some(LineClass::OverBudget) => report.over_budget.push(line.into()),
                Some(LineClass::UnderBudget) => report.under_budget.push(line.into()),
                None => {}
            }
        }

        // Stable sorts: ties keep server order.
        report
            .over_budget
            .sort_by(|a, b| b.variance.cmp(&a.variance));
        report.unplanned.sort_by(|a, b| b.spent.cmp(&a.spent));
        report
            .under_budget
            .sort_by(|a, b| a.variance.cmp(&b.variance));

        report.total_overspend = report.over_budget.iter().map(|l| l.variance).sum();
        report.total_unplanned = report.unplanned.iter().map(|l| l.spent).sum();
        report.total_saved = report.under_budget.iter().map(|l| l.variance.abs()).sum();
        report
    }

    /// `total_overspend + total_unplanned - total_saved`.
    ///
    /// Positive means the month is running over plan overall.
    #[must_use]
    pub fn net_variance(&self) -> Money {
        self.total_overspend + self.total_unplanned - self.total_saved
    }
}

/// Whether income covers fixed expenses plus the planned budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncomeCheck {
    pub income: Money,
    /// `fixed + budgeted`.
    pub income_needed: Money,
    /// `max(0, income_needed - income)`.
    pub shortfall: Money,
}

impl IncomeCheck {
    pub fn new(income: Money, fixed: Money, budgeted: Money) -> Self {
        let income_needed = fixed + budgeted;
        Self {
            income,
            income_needed,
            shortfall: (income_needed - income).clamp_non_negative(),
        }
    }

    #[must_use]
    pub fn has_shortfall(&self) -> bool {
        self.shortfall.is_positive()
    }
}

/// Headline verdict of the analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outlook {
    /// On track and spending less than planned overall.
    Ahead { saved: Money },
    /// On track, spending exactly as planned.
    OnTrack,
    /// Overrun, unplanned spending or missing income.
    Over { amount: Money },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetAnalysis {
    pub report: VarianceReport,
    pub income: IncomeCheck,
    pub net_variance: Money,
    pub on_track: bool,
    pub outlook: Outlook,
}

impl BudgetAnalysis {
    pub fn new(lines: &[BudgetLine], totals: &MonthTotals) -> Self {
        let report = VarianceReport::from_lines(lines);
        let income = IncomeCheck::new(totals.income, totals.fixed, totals.budgeted);
        let net_variance = report.net_variance();
        let on_track = !net_variance.is_positive() && income.shortfall.is_zero();

        let outlook = if !on_track {
            Outlook::Over {
                amount: report.total_overspend + report.total_unplanned + income.shortfall,
            }
        } else if net_variance.is_negative() {
            Outlook::Ahead {
                saved: net_variance.abs(),
            }
        } else {
            Outlook::OnTrack
        };

        Self {
            report,
            income,
            net_variance,
            on_track,
            outlook,
        }
    }

    pub fn from_summary(summary: &MonthSummary, currency: Currency) -> Self {
        let lines = lines_from_summary(summary, currency);
        let totals = MonthTotals::from_summary(summary, currency);
        Self::new(&lines, &totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(label: &str, allocated: i64, spent: i64) -> BudgetLine {
        BudgetLine::new(label, Money::new(allocated), Money::new(spent))
    }

    fn totals(income: i64, fixed: i64, budgeted: i64) -> MonthTotals {
        MonthTotals {
            income: Money::new(income),
            fixed: Money::new(fixed),
            budgeted: Money::new(budgeted),
            ..MonthTotals::default()
        }
    }

    #[test]
    fn buckets_are_sorted() {
        let lines = vec![
            line("a", 100, 120),
            line("b", 100, 180),
            line("c", 0, 10),
            line("d", 0, 70),
            line("e", 100, 90),
            line("f", 100, 10),
        ];
        let report = VarianceReport::from_lines(&lines);

        fn labels(v: &[LineVariance]) -> Vec<&str> {
            v.iter().map(|l| l.label.as_str()).collect()
        }
        assert_eq!(labels(&report.over_budget), ["b", "a"]);
        assert_eq!(labels(&report.unplanned), ["d", "c"]);
        assert_eq!(labels(&report.under_budget), ["f", "e"]);

        assert_eq!(report.total_overspend, Money::new(100));
        assert_eq!(report.total_unplanned, Money::new(80));
        assert_eq!(report.total_saved, Money::new(100));
        assert_eq!(report.net_variance(), Money::new(80));
    }

    #[test]
    fn untouched_lines_are_excluded() {
        let report = VarianceReport::from_lines(&[line("idle", 0, 0), line("exact", 50, 50)]);
        assert!(report.over_budget.is_empty());
        assert!(report.unplanned.is_empty());
        assert!(report.under_budget.is_empty());
        assert_eq!(report.net_variance(), Money::ZERO);
    }

    #[test]
    fn shortfall_is_zero_when_income_covers_plan() {
        let check = IncomeCheck::new(Money::new(1000), Money::new(300), Money::new(600));
        assert_eq!(check.income_needed, Money::new(900));
        assert_eq!(check.shortfall, Money::ZERO);
        assert!(!check.has_shortfall());
    }

    #[test]
    fn shortfall_is_the_missing_income() {
        let check = IncomeCheck::new(Money::new(500), Money::new(300), Money::new(600));
        assert_eq!(check.income_needed, Money::new(900));
        assert_eq!(check.shortfall, Money::new(400));
    }

    #[test]
    fn saving_month_is_ahead() {
        let analysis = BudgetAnalysis::new(&[line("food", 100, 60)], &totals(1000, 300, 100));
        assert!(analysis.on_track);
        assert_eq!(
            analysis.outlook,
            Outlook::Ahead {
                saved: Money::new(40)
            }
        );
    }

    #[test]
    fn exact_month_is_on_track() {
        let analysis = BudgetAnalysis::new(&[line("food", 100, 100)], &totals(1000, 300, 100));
        assert!(analysis.on_track);
        assert_eq!(analysis.outlook, Outlook::OnTrack);
    }

    #[test]
    fn shortfall_alone_breaks_on_track() {
        let analysis = BudgetAnalysis::new(&[line("food", 600, 100)], &totals(500, 300, 600));
        assert!(analysis.net_variance.is_negative());
        assert!(!analysis.on_track);
        assert_eq!(
            analysis.outlook,
            Outlook::Over {
                amount: Money::new(400)
            }
        );
    }

    #[test]
    fn over_amount_adds_overspend_unplanned_and_shortfall() {
        let lines = [line("food", 100, 150), line("gifts", 0, 40), line("fun", 100, 0)];
        let analysis = BudgetAnalysis::new(&lines, &totals(250, 100, 200));
        // net = 50 + 40 - 100 < 0, but income is short by 50.
        assert_eq!(analysis.net_variance, Money::new(-10));
        assert_eq!(
            analysis.outlook,
            Outlook::Over {
                amount: Money::new(140)
            }
        );
    }
}
