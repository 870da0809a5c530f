//! One-line spending entry: `12.50 #category note`.

use api_types::budget::BudgetCategory;
use engine::{Currency, Money, normalize_label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAddParsed {
    pub amount: Money,
    pub category: Option<String>,
    pub note: Option<String>,
}

pub fn parse(input: &str, currency: Currency) -> Result<QuickAddParsed, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter an amount.".to_string());
    }

    let mut parts = trimmed.splitn(2, ' ');
    let amount_raw = parts.next().unwrap_or("").trim();
    if amount_raw.is_empty() {
        return Err("Missing amount.".to_string());
    }
    let note_raw = parts.next().unwrap_or("").trim();

    let amount =
        Money::parse_major(amount_raw, currency).map_err(|_| "Invalid amount.".to_string())?;
    if !amount.is_positive() {
        return Err("Amount must be > 0.".to_string());
    }

    let (category, note) = parse_tag(note_raw)?;

    Ok(QuickAddParsed {
        amount,
        category,
        note,
    })
}

/// Finds the category a `#tag` refers to. Spaces in labels can be left out
/// of the tag: `#diningout` matches "Dining out".
pub fn resolve_category<'a>(
    tag: &str,
    categories: &'a [BudgetCategory],
) -> Option<&'a BudgetCategory> {
    let tag = normalize_label(tag);
    categories.iter().find(|category| {
        let label = normalize_label(&category.label);
        label == tag || label.replace(' ', "") == tag
    })
}

fn parse_tag(note_raw: &str) -> Result<(Option<String>, Option<String>), String> {
    if note_raw.is_empty() {
        return Ok((None, None));
    }

    let mut tag: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();

    for token in note_raw.split_whitespace() {
        if let Some(rest) = token.strip_prefix('#') {
            if rest.is_empty() {
                kept.push(token);
                continue;
            }
            if tag.is_some() {
                return Err("Too many tags: at most 1.".to_string());
            }
            tag = Some(rest.to_string());
        } else {
            kept.push(token);
        }
    }

    let note = kept.join(" ");
    let note = if note.is_empty() { None } else { Some(note) };
    Ok((tag, note))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, label: &str) -> BudgetCategory {
        BudgetCategory {
            id,
            user_id: 1,
            label: label.to_string(),
            default_amount: 0.0,
        }
    }

    #[test]
    fn amount_tag_and_note() {
        let parsed = parse("12,50 #food weekly market", Currency::Eur).unwrap();
        assert_eq!(parsed.amount, Money::new(12_50));
        assert_eq!(parsed.category.as_deref(), Some("food"));
        assert_eq!(parsed.note.as_deref(), Some("weekly market"));
    }

    #[test]
    fn tag_can_sit_anywhere() {
        let parsed = parse("3 coffee #Cafe", Currency::Eur).unwrap();
        assert_eq!(parsed.category.as_deref(), Some("Cafe"));
        assert_eq!(parsed.note.as_deref(), Some("coffee"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("", Currency::Eur).is_err());
        assert!(parse("abc #food", Currency::Eur).is_err());
        assert!(parse("0 #food", Currency::Eur).is_err());
        assert!(parse("-4 #food", Currency::Eur).is_err());
        assert!(parse("4 #food #rent", Currency::Eur).is_err());
    }

    #[test]
    fn resolves_categories_loosely() {
        let categories = [category(1, "Groceries"), category(2, "Dining out")];
        assert_eq!(
            resolve_category("GROCERIES", &categories).map(|c| c.id),
            Some(1)
        );
        assert_eq!(
            resolve_category("diningout", &categories).map(|c| c.id),
            Some(2)
        );
        assert!(resolve_category("travel", &categories).is_none());
    }
}
