//! JSON wire contract of the budgeting API.
//!
//! Amounts travel as JSON numbers in major units (e.g. `12.5` for 12.50).
//! Callers convert them to integer minor units before doing arithmetic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: i64,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsernameChange {
        pub new_username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub current_password: String,
        pub new_password: String,
    }

    /// Body of the wipe request; the password is checked again server-side.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClearData {
        pub password: String,
    }
}

pub mod month {
    use super::*;

    use crate::{
        budget::MonthlyBudgetWithCategory, fixed_expense::FixedExpense, income::IncomeEntry,
        item::ItemWithCategory,
    };

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Month {
        pub id: i64,
        pub user_id: i64,
        pub year: i32,
        /// Calendar month, 1-based.
        pub month: u32,
        pub is_closed: bool,
        pub closed_at: Option<DateTime<Utc>>,
    }

    /// Everything the dashboard needs for one month, totals included.
    ///
    /// `remaining` is `total_income - total_fixed - total_spent`, computed by
    /// the server.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthSummary {
        pub month: Month,
        pub income_entries: Vec<IncomeEntry>,
        pub fixed_expenses: Vec<FixedExpense>,
        pub budgets: Vec<MonthlyBudgetWithCategory>,
        pub items: Vec<ItemWithCategory>,
        pub total_income: f64,
        pub total_fixed: f64,
        pub total_budgeted: f64,
        pub total_spent: f64,
        pub remaining: f64,
    }
}

pub mod fixed_expense {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FixedExpense {
        pub id: i64,
        pub user_id: i64,
        pub label: String,
        pub amount: f64,
    }

    /// Create and update body.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FixedExpenseInput {
        pub label: String,
        pub amount: f64,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetCategory {
        pub id: i64,
        pub user_id: i64,
        pub label: String,
        pub default_amount: f64,
    }

    /// Create and update body. New categories get a budget in every open
    /// month.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryInput {
        pub label: String,
        pub default_amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyBudget {
        pub id: i64,
        pub month_id: i64,
        pub category_id: i64,
        pub allocated_amount: f64,
    }

    /// A monthly budget joined with its category label and the amount spent
    /// against it in that month.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyBudgetWithCategory {
        pub id: i64,
        pub month_id: i64,
        pub category_id: i64,
        pub category_label: String,
        pub allocated_amount: f64,
        pub spent_amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub allocated_amount: f64,
    }
}

pub mod income {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IncomeEntry {
        pub id: i64,
        pub month_id: i64,
        pub label: String,
        pub amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IncomeInput {
        pub label: String,
        pub amount: f64,
    }
}

pub mod item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Item {
        pub id: i64,
        pub month_id: i64,
        pub category_id: i64,
        pub description: String,
        pub amount: f64,
        pub spent_on: NaiveDate,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemWithCategory {
        pub id: i64,
        pub month_id: i64,
        pub category_id: i64,
        pub category_label: String,
        pub description: String,
        pub amount: f64,
        pub spent_on: NaiveDate,
    }

    /// Create and update body.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemInput {
        pub category_id: i64,
        pub description: String,
        pub amount: f64,
        pub spent_on: NaiveDate,
    }
}

pub mod stats {
    use super::*;

    /// Spending of one category in the current month versus the previous one.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryStats {
        pub category_id: i64,
        pub category_label: String,
        pub current_month_spent: f64,
        pub previous_month_spent: f64,
        pub change_amount: f64,
        /// `None` when the previous month had no spending to compare with.
        pub change_percent: Option<f64>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyStats {
        pub year: i32,
        pub month: u32,
        pub total_income: f64,
        pub total_spent: f64,
        pub total_fixed: f64,
        pub net: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct StatsResponse {
        pub category_comparisons: Vec<CategoryStats>,
        /// Newest month first.
        pub monthly_trends: Vec<MonthlyStats>,
        pub average_monthly_spending: f64,
        pub average_monthly_income: f64,
    }
}

pub mod savings {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Savings {
        pub savings: f64,
        /// `0` means no goal has been set.
        #[serde(default)]
        pub savings_goal: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsUpdate {
        pub savings: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsGoalUpdate {
        pub savings_goal: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RetirementSavings {
        pub retirement_savings: f64,
    }
}

pub mod export {
    use super::*;

    /// Portable dump of a user's data.
    ///
    /// Budgets and items reference categories by `category_label`, never by
    /// numeric id, so a dump can be imported into an account whose ids differ.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserExport {
        pub version: u32,
        pub fixed_expenses: Vec<FixedExpenseExport>,
        pub categories: Vec<CategoryExport>,
        pub months: Vec<MonthExport>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FixedExpenseExport {
        pub label: String,
        pub amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryExport {
        pub label: String,
        pub default_amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthExport {
        pub year: i32,
        pub month: u32,
        pub is_closed: bool,
        pub income_entries: Vec<IncomeExport>,
        pub budgets: Vec<BudgetExport>,
        pub items: Vec<ItemExport>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IncomeExport {
        pub label: String,
        pub amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetExport {
        pub category_label: String,
        pub allocated_amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemExport {
        pub category_label: String,
        pub description: String,
        pub amount: f64,
        pub spent_on: NaiveDate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_summary_parses_server_payload() {
        let payload = r#"{
            "month": {"id": 7, "user_id": 1, "year": 2026, "month": 3, "is_closed": false, "closed_at": null},
            "income_entries": [{"id": 1, "month_id": 7, "label": "Salary", "amount": 2500.0}],
            "fixed_expenses": [{"id": 2, "user_id": 1, "label": "Rent", "amount": 900}],
            "budgets": [{"id": 3, "month_id": 7, "category_id": 4, "category_label": "Food", "allocated_amount": 300, "spent_amount": 120.5}],
            "items": [{"id": 5, "month_id": 7, "category_id": 4, "category_label": "Food", "description": "Market", "amount": 120.5, "spent_on": "2026-03-02"}],
            "total_income": 2500.0,
            "total_fixed": 900.0,
            "total_budgeted": 300.0,
            "total_spent": 120.5,
            "remaining": 1479.5
        }"#;

        let summary: month::MonthSummary = serde_json::from_str(payload).unwrap();
        assert_eq!(summary.month.month, 3);
        assert_eq!(summary.budgets[0].category_label, "Food");
        assert_eq!(
            summary.items[0].spent_on,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[test]
    fn savings_goal_defaults_to_zero_when_missing() {
        let savings: savings::Savings = serde_json::from_str(r#"{"savings": 150.0}"#).unwrap();
        assert_eq!(savings.savings_goal, 0.0);
    }
}
