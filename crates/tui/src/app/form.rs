//! Modal forms for records that are edited field by field.
//!
//! A [`Form`] only holds text. [`Form::submit`] turns it into a typed
//! request body or a message for the user; nothing here talks to the server.

use api_types::{
    budget::{BudgetCategory, CategoryInput},
    fixed_expense::{FixedExpense, FixedExpenseInput},
    income::{IncomeEntry, IncomeInput},
    item::{ItemInput, ItemWithCategory},
};
use chrono::{Datelike, NaiveDate};
use engine::{Currency, Money};

use crate::quick_add;

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=32;
const PASSWORD_CHARS: std::ops::RangeInclusive<usize> = 6..=128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Income {
        month_id: i64,
        id: Option<i64>,
    },
    FixedExpense {
        id: Option<i64>,
    },
    Category {
        id: Option<i64>,
    },
    Item {
        month_id: i64,
        id: i64,
        year: i32,
        month: u32,
    },
    Retirement,
    Username,
    Password,
    ClearData,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Income { id: None, .. } => "New income",
            Self::Income { .. } => "Edit income",
            Self::FixedExpense { id: None } => "New fixed expense",
            Self::FixedExpense { .. } => "Edit fixed expense",
            Self::Category { id: None } => "New category",
            Self::Category { .. } => "Edit category",
            Self::Item { .. } => "Edit item",
            Self::Retirement => "Retirement savings",
            Self::Username => "Change username",
            Self::Password => "Change password",
            Self::ClearData => "Delete all data",
        }
    }

    /// Month the record lives in.
    pub fn month_id(self) -> Option<i64> {
        match self {
            Self::Income { month_id, .. } | Self::Item { month_id, .. } => Some(month_id),
            _ => None,
        }
    }

    /// Income, items and categories cannot change while a closed month is
    /// on screen.
    pub fn locked_by_closed_month(self) -> bool {
        matches!(
            self,
            Self::Income { .. } | Self::Item { .. } | Self::Category { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Rendered masked.
    pub secret: bool,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: true,
        }
    }
}

/// Validated form contents, ready to be sent. `id: None` creates a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmit {
    Income {
        month_id: i64,
        id: Option<i64>,
        input: IncomeInput,
    },
    FixedExpense {
        id: Option<i64>,
        input: FixedExpenseInput,
    },
    Category {
        id: Option<i64>,
        input: CategoryInput,
    },
    Item {
        month_id: i64,
        id: i64,
        input: ItemInput,
    },
    Retirement(Money),
    Username(String),
    Password { current: String, new: String },
    ClearData { password: String },
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn income(month_id: i64, entry: Option<&IncomeEntry>, currency: Currency) -> Self {
        let (label, amount) = entry.map_or((String::new(), String::new()), |entry| {
            (entry.label.clone(), amount_text(entry.amount, currency))
        });
        Self::new(
            FormKind::Income {
                month_id,
                id: entry.map(|entry| entry.id),
            },
            vec![
                FormField::text("Label", label),
                FormField::text("Amount", amount),
            ],
        )
    }

    pub fn fixed_expense(expense: Option<&FixedExpense>, currency: Currency) -> Self {
        let (label, amount) = expense.map_or((String::new(), String::new()), |expense| {
            (expense.label.clone(), amount_text(expense.amount, currency))
        });
        Self::new(
            FormKind::FixedExpense {
                id: expense.map(|expense| expense.id),
            },
            vec![
                FormField::text("Label", label),
                FormField::text("Amount", amount),
            ],
        )
    }

    pub fn category(category: Option<&BudgetCategory>, currency: Currency) -> Self {
        let (label, amount) = category.map_or((String::new(), String::new()), |category| {
            (
                category.label.clone(),
                amount_text(category.default_amount, currency),
            )
        });
        Self::new(
            FormKind::Category {
                id: category.map(|category| category.id),
            },
            vec![
                FormField::text("Label", label),
                FormField::text("Default amount", amount),
            ],
        )
    }

    pub fn item(item: &ItemWithCategory, year: i32, month: u32, currency: Currency) -> Self {
        Self::new(
            FormKind::Item {
                month_id: item.month_id,
                id: item.id,
                year,
                month,
            },
            vec![
                FormField::text("Category", item.category_label.clone()),
                FormField::text("Description", item.description.clone()),
                FormField::text("Amount", amount_text(item.amount, currency)),
                FormField::text("Date", item.spent_on.format("%Y-%m-%d").to_string()),
            ],
        )
    }

    pub fn retirement(current: Money, currency: Currency) -> Self {
        Self::new(
            FormKind::Retirement,
            vec![FormField::text(
                "Amount",
                format!("{:.2}", current.to_major(currency)),
            )],
        )
    }

    pub fn username(current: &str) -> Self {
        Self::new(
            FormKind::Username,
            vec![FormField::text("New username", current)],
        )
    }

    pub fn password() -> Self {
        Self::new(
            FormKind::Password,
            vec![
                FormField::secret("Current password"),
                FormField::secret("New password"),
                FormField::secret("Confirm password"),
            ],
        )
    }

    pub fn clear_data() -> Self {
        Self::new(FormKind::ClearData, vec![FormField::secret("Password")])
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(ch);
            self.error = None;
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
            self.error = None;
        }
    }

    fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map_or("", |field| field.value.as_str())
    }

    fn label(&self, idx: usize) -> Result<String, String> {
        let label = self.value(idx).trim();
        if label.is_empty() {
            return Err("Label is required.".to_string());
        }
        Ok(label.to_string())
    }

    fn amount(&self, idx: usize, currency: Currency) -> Result<Money, String> {
        let amount = Money::parse_major(self.value(idx), currency)
            .map_err(|_| "Invalid amount.".to_string())?;
        if amount.is_negative() {
            return Err("Amount must be >= 0.".to_string());
        }
        Ok(amount)
    }

    /// Checks every field and builds the request body.
    pub fn submit(
        &self,
        currency: Currency,
        categories: &[BudgetCategory],
    ) -> Result<FormSubmit, String> {
        match self.kind {
            FormKind::Income { month_id, id } => Ok(FormSubmit::Income {
                month_id,
                id,
                input: IncomeInput {
                    label: self.label(0)?,
                    amount: self.amount(1, currency)?.to_major(currency),
                },
            }),
            FormKind::FixedExpense { id } => Ok(FormSubmit::FixedExpense {
                id,
                input: FixedExpenseInput {
                    label: self.label(0)?,
                    amount: self.amount(1, currency)?.to_major(currency),
                },
            }),
            FormKind::Category { id } => Ok(FormSubmit::Category {
                id,
                input: CategoryInput {
                    label: self.label(0)?,
                    default_amount: self.amount(1, currency)?.to_major(currency),
                },
            }),
            FormKind::Item {
                month_id,
                id,
                year,
                month,
            } => {
                let tag = self.value(0).trim();
                let category = quick_add::resolve_category(tag, categories)
                    .ok_or_else(|| format!("Unknown category: {tag}"))?;
                let description = self.value(1).trim();
                if description.is_empty() {
                    return Err("Description is required.".to_string());
                }
                let amount = self.amount(2, currency)?;
                if !amount.is_positive() {
                    return Err("Amount must be > 0.".to_string());
                }
                let spent_on = NaiveDate::parse_from_str(self.value(3).trim(), "%Y-%m-%d")
                    .map_err(|_| "Date must be YYYY-MM-DD.".to_string())?;
                if spent_on.year() != year || spent_on.month() != month {
                    return Err("Date must fall inside the month.".to_string());
                }
                Ok(FormSubmit::Item {
                    month_id,
                    id,
                    input: ItemInput {
                        category_id: category.id,
                        description: description.to_string(),
                        amount: amount.to_major(currency),
                        spent_on,
                    },
                })
            }
            FormKind::Retirement => Ok(FormSubmit::Retirement(self.amount(0, currency)?)),
            FormKind::Username => {
                let username = self.value(0).trim();
                if !USERNAME_CHARS.contains(&username.chars().count()) {
                    return Err("Username must be 3-32 characters.".to_string());
                }
                Ok(FormSubmit::Username(username.to_string()))
            }
            FormKind::Password => {
                let (current, new, confirm) = (self.value(0), self.value(1), self.value(2));
                if current.is_empty() {
                    return Err("Enter your current password.".to_string());
                }
                if !PASSWORD_CHARS.contains(&new.chars().count()) {
                    return Err("Password must be 6-128 characters.".to_string());
                }
                if new != confirm {
                    return Err("Passwords do not match.".to_string());
                }
                Ok(FormSubmit::Password {
                    current: current.to_string(),
                    new: new.to_string(),
                })
            }
            FormKind::ClearData => {
                let password = self.value(0);
                if password.chars().count() < *PASSWORD_CHARS.start() {
                    return Err("Password must be at least 6 characters.".to_string());
                }
                Ok(FormSubmit::ClearData {
                    password: password.to_string(),
                })
            }
        }
    }
}

fn amount_text(major: f64, currency: Currency) -> String {
    format!("{:.2}", Money::from_major(major, currency).to_major(currency))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Income { month_id: i64, id: i64 },
    FixedExpense { id: i64 },
    Category { id: i64 },
    Item { month_id: i64, id: i64 },
}

impl DeleteTarget {
    pub fn month_id(self) -> Option<i64> {
        match self {
            Self::Income { month_id, .. } | Self::Item { month_id, .. } => Some(month_id),
            Self::FixedExpense { .. } | Self::Category { .. } => None,
        }
    }

    pub fn locked_by_closed_month(self) -> bool {
        !matches!(self, Self::FixedExpense { .. })
    }
}

/// A delete waiting for `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub target: DeleteTarget,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<BudgetCategory> {
        vec![BudgetCategory {
            id: 4,
            user_id: 1,
            label: "Dining out".to_string(),
            default_amount: 80.0,
        }]
    }

    fn item() -> ItemWithCategory {
        ItemWithCategory {
            id: 5,
            month_id: 7,
            category_id: 4,
            category_label: "Dining out".to_string(),
            description: "Pizza".to_string(),
            amount: 18.5,
            spent_on: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        }
    }

    fn fill(form: &mut Form, values: &[&str]) {
        for (field, value) in form.fields.iter_mut().zip(values) {
            field.value = value.to_string();
        }
    }

    #[test]
    fn income_form_requires_label_and_non_negative_amount() {
        let mut form = Form::income(7, None, Currency::Eur);
        assert_eq!(form.kind.title(), "New income");

        fill(&mut form, &["  ", "10"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Err("Label is required.".to_string())
        );

        fill(&mut form, &["Salary", "-1"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Err("Amount must be >= 0.".to_string())
        );

        fill(&mut form, &[" Salary ", "2500,50"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Ok(FormSubmit::Income {
                month_id: 7,
                id: None,
                input: IncomeInput {
                    label: "Salary".to_string(),
                    amount: 2500.5,
                },
            })
        );
    }

    #[test]
    fn editing_prefills_the_current_values() {
        let expense = FixedExpense {
            id: 3,
            user_id: 1,
            label: "Rent".to_string(),
            amount: 900.0,
        };
        let form = Form::fixed_expense(Some(&expense), Currency::Eur);
        assert_eq!(form.kind, FormKind::FixedExpense { id: Some(3) });
        assert_eq!(form.fields[0].value, "Rent");
        assert_eq!(form.fields[1].value, "900.00");

        let form = Form::item(&item(), 2026, 3, Currency::Eur);
        assert_eq!(form.fields[3].value, "2026-03-09");
        assert_eq!(form.kind.month_id(), Some(7));
    }

    #[test]
    fn item_form_resolves_category_and_keeps_date_in_month() {
        let mut form = Form::item(&item(), 2026, 3, Currency::Eur);
        fill(&mut form, &["diningout", "Sushi", "32", "2026-03-10"]);
        assert_eq!(
            form.submit(Currency::Eur, &categories()),
            Ok(FormSubmit::Item {
                month_id: 7,
                id: 5,
                input: ItemInput {
                    category_id: 4,
                    description: "Sushi".to_string(),
                    amount: 32.0,
                    spent_on: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                },
            })
        );

        fill(&mut form, &["Travel", "Sushi", "32", "2026-03-10"]);
        assert_eq!(
            form.submit(Currency::Eur, &categories()),
            Err("Unknown category: Travel".to_string())
        );

        fill(&mut form, &["Dining out", "Sushi", "0", "2026-03-10"]);
        assert_eq!(
            form.submit(Currency::Eur, &categories()),
            Err("Amount must be > 0.".to_string())
        );

        fill(&mut form, &["Dining out", "Sushi", "32", "10/03/2026"]);
        assert_eq!(
            form.submit(Currency::Eur, &categories()),
            Err("Date must be YYYY-MM-DD.".to_string())
        );

        fill(&mut form, &["Dining out", "Sushi", "32", "2026-04-01"]);
        assert_eq!(
            form.submit(Currency::Eur, &categories()),
            Err("Date must fall inside the month.".to_string())
        );
    }

    #[test]
    fn account_forms_check_lengths_and_confirmation() {
        let mut form = Form::username("ada");
        fill(&mut form, &["al"]);
        assert!(form.submit(Currency::Eur, &[]).is_err());
        fill(&mut form, &["  grace  "]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Ok(FormSubmit::Username("grace".to_string()))
        );

        let mut form = Form::password();
        assert!(form.fields.iter().all(|field| field.secret));
        fill(&mut form, &["old-secret", "short", "short"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Err("Password must be 6-128 characters.".to_string())
        );
        fill(&mut form, &["old-secret", "new-secret", "new-secrets"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Err("Passwords do not match.".to_string())
        );
        fill(&mut form, &["old-secret", "new-secret", "new-secret"]);
        assert_eq!(
            form.submit(Currency::Eur, &[]),
            Ok(FormSubmit::Password {
                current: "old-secret".to_string(),
                new: "new-secret".to_string(),
            })
        );

        let mut form = Form::clear_data();
        fill(&mut form, &["12345"]);
        assert!(form.submit(Currency::Eur, &[]).is_err());
    }

    #[test]
    fn focus_wraps_and_typing_clears_the_error() {
        let mut form = Form::password();
        form.prev_field();
        assert_eq!(form.focus, 2);
        form.next_field();
        assert_eq!(form.focus, 0);

        form.error = Some("Wrong password.".to_string());
        form.push('x');
        assert_eq!(form.fields[0].value, "x");
        assert!(form.error.is_none());
    }
}
