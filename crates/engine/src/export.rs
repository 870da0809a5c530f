//! Validation of a JSON data export before it is sent for import.
//!
//! Exports reference categories by label and the server resolves those
//! labels by exact match, silently skipping rows that miss. A dump is only
//! importable if every budget and item label names a declared category, and
//! [`prepare`] rewrites each of them to the declared spelling so none gets
//! dropped on the way in.

use std::collections::HashMap;

use api_types::export::UserExport;
use unicode_normalization::UnicodeNormalization;

use crate::EngineError;

/// Export format version this client understands.
pub const EXPORT_VERSION: u32 = 1;

/// Canonical form used to compare category labels: NFKC, trimmed,
/// lowercased.
pub fn normalize_label(label: &str) -> String {
    label.trim().nfkc().collect::<String>().to_lowercase()
}

/// Counts of what an export contains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub categories: usize,
    pub fixed_expenses: usize,
    pub months: usize,
    pub items: usize,
}

/// Validates `export` and rewrites every budget and item `category_label`
/// to the exact label of the category it refers to.
pub fn prepare(mut export: UserExport) -> Result<(UserExport, ExportStats), EngineError> {
    if export.version != EXPORT_VERSION {
        return Err(EngineError::UnsupportedExportVersion {
            found: export.version,
            expected: EXPORT_VERSION,
        });
    }

    let mut declared: HashMap<String, String> = HashMap::new();
    for category in &export.categories {
        check_amount(category.default_amount, &category.label)?;
        if declared
            .insert(normalize_label(&category.label), category.label.clone())
            .is_some()
        {
            return Err(EngineError::DuplicateCategory(category.label.clone()));
        }
    }
    for expense in &export.fixed_expenses {
        check_amount(expense.amount, &expense.label)?;
    }

    let mut items = 0;
    for month in &mut export.months {
        if !(1..=12).contains(&month.month) {
            return Err(EngineError::InvalidMonth(format!(
                "{}-{}",
                month.year, month.month
            )));
        }
        for income in &month.income_entries {
            check_amount(income.amount, &income.label)?;
        }
        for budget in &mut month.budgets {
            check_amount(budget.allocated_amount, &budget.category_label)?;
            budget.category_label = canonical(&declared, &budget.category_label)?;
        }
        for item in &mut month.items {
            check_amount(item.amount, &item.description)?;
            item.category_label = canonical(&declared, &item.category_label)?;
        }
        items += month.items.len();
    }

    let stats = ExportStats {
        categories: export.categories.len(),
        fixed_expenses: export.fixed_expenses.len(),
        months: export.months.len(),
        items,
    };
    Ok((export, stats))
}

fn canonical(declared: &HashMap<String, String>, label: &str) -> Result<String, EngineError> {
    declared
        .get(&normalize_label(label))
        .cloned()
        .ok_or_else(|| EngineError::UnknownCategory(label.to_string()))
}

fn check_amount(amount: f64, what: &str) -> Result<(), EngineError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidAmount(format!(
            "{what}: {amount} is not a valid amount"
        )))
    }
}
