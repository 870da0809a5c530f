//! Savings goal projection and the savings/goal edit state machine.

use api_types::savings::Savings;

use crate::{Currency, EngineError, Money};

/// Current savings and the optional goal (`Money::ZERO` = unset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SavingsState {
    pub current: Money,
    pub goal: Money,
}

impl SavingsState {
    pub fn from_wire(savings: &Savings, currency: Currency) -> Self {
        Self {
            current: Money::from_major(savings.savings, currency),
            goal: Money::from_major(savings.savings_goal, currency),
        }
    }

    #[must_use]
    pub fn has_goal(&self) -> bool {
        self.goal.is_positive()
    }

    /// Savings at month end if the remaining budget is kept.
    #[must_use]
    pub fn projected(&self, remaining: Money) -> Money {
        self.current + remaining
    }

    /// Progress towards the goal, or towards the projection when no goal
    /// is set.
    #[must_use]
    pub fn projection(&self, remaining: Money) -> SavingsProjection {
        let target = if self.has_goal() {
            self.goal
        } else {
            self.projected(remaining)
        };

        let percentage = if target.is_positive() {
            self.current.minor() as f64 / target.minor() as f64 * 100.0
        } else {
            0.0
        };

        let difference = self.current - target;
        SavingsProjection {
            target,
            percentage,
            difference,
            is_ahead: !difference.is_negative(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavingsProjection {
    pub target: Money,
    /// `current / target * 100`, or `0.0` when the target is not positive.
    pub percentage: f64,
    /// `current - target`.
    pub difference: Money,
    pub is_ahead: bool,
}

/// Field of [`SavingsState`] being edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavingsField {
    Savings,
    Goal,
}

impl SavingsField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Savings => "Savings",
            Self::Goal => "Goal",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SavingsMode {
    #[default]
    Viewing,
    EditingSavings { buffer: String },
    EditingGoal { buffer: String },
}

/// A parsed edit waiting for the server to accept it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavingsCommit {
    pub field: SavingsField,
    pub value: Money,
}

/// Edit state machine for the savings card.
///
/// Only one field can be edited at a time and edits start from
/// [`SavingsMode::Viewing`]. Saving is two-phase: [`submit`] parses the
/// buffer, the caller sends the update, and [`complete`] applies the value
/// once the server accepted it. [`cancel`] drops the buffer and leaves the
/// state untouched.
///
/// [`submit`]: SavingsEditor::submit
/// [`complete`]: SavingsEditor::complete
/// [`cancel`]: SavingsEditor::cancel
#[derive(Clone, Debug, Default)]
pub struct SavingsEditor {
    mode: SavingsMode,
}

impl SavingsEditor {
    pub fn mode(&self) -> &SavingsMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode != SavingsMode::Viewing
    }

    pub fn editing_field(&self) -> Option<SavingsField> {
        match self.mode {
            SavingsMode::Viewing => None,
            SavingsMode::EditingSavings { .. } => Some(SavingsField::Savings),
            SavingsMode::EditingGoal { .. } => Some(SavingsField::Goal),
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.mode {
            SavingsMode::Viewing => None,
            SavingsMode::EditingSavings { buffer } | SavingsMode::EditingGoal { buffer } => {
                Some(buffer.as_str())
            }
        }
    }

    /// Enters edit mode for `field`, pre-filled with its current value.
    pub fn begin(
        &mut self,
        field: SavingsField,
        state: &SavingsState,
        currency: Currency,
    ) -> Result<(), EngineError> {
        if self.is_editing() {
            return Err(EngineError::EditInProgress);
        }
        let buffer = match field {
            SavingsField::Savings => plain_amount(state.current, currency),
            SavingsField::Goal => plain_amount(state.goal, currency),
        };
        self.mode = match field {
            SavingsField::Savings => SavingsMode::EditingSavings { buffer },
            SavingsField::Goal => SavingsMode::EditingGoal { buffer },
        };
        Ok(())
    }

    pub fn push(&mut self, ch: char) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.push(ch);
        }
    }

    pub fn pop(&mut self) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.pop();
        }
    }

    /// Parses the buffer. The editor stays in its edit state until
    /// [`SavingsEditor::complete`] is called.
    pub fn submit(&self, currency: Currency) -> Result<SavingsCommit, EngineError> {
        let field = self.editing_field().ok_or(EngineError::NotEditing)?;
        let buffer = self.buffer().unwrap_or_default();
        let value = Money::parse_major(buffer, currency)?;
        if value.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        Ok(SavingsCommit { field, value })
    }

    /// Applies an accepted commit and returns to viewing.
    pub fn complete(
        &mut self,
        commit: SavingsCommit,
        state: &mut SavingsState,
    ) -> Result<(), EngineError> {
        if self.editing_field() != Some(commit.field) {
            return Err(EngineError::NotEditing);
        }
        match commit.field {
            SavingsField::Savings => state.current = commit.value,
            SavingsField::Goal => state.goal = commit.value,
        }
        self.mode = SavingsMode::Viewing;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.mode = SavingsMode::Viewing;
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            SavingsMode::Viewing => None,
            SavingsMode::EditingSavings { buffer } | SavingsMode::EditingGoal { buffer } => {
                Some(buffer)
            }
        }
    }
}

/// Amount without symbol, suitable as an edit buffer (`"1250.00"`).
fn plain_amount(value: Money, currency: Currency) -> String {
    let formatted = value.format(currency);
    formatted
        .strip_suffix(currency.symbol())
        .unwrap_or(&formatted)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(current: i64, goal: i64) -> SavingsState {
        SavingsState {
            current: Money::new(current),
            goal: Money::new(goal),
        }
    }

    #[test]
    fn goal_is_the_target_when_set() {
        let projection = state(250_00, 1000_00).projection(Money::new(400_00));
        assert_eq!(projection.target, Money::new(1000_00));
        assert_eq!(projection.percentage, 25.0);
        assert_eq!(projection.difference, Money::new(-750_00));
        assert!(!projection.is_ahead);
    }

    #[test]
    fn projection_is_the_target_without_goal() {
        let projection = state(300_00, 0).projection(Money::new(100_00));
        assert_eq!(projection.target, Money::new(400_00));
        assert_eq!(projection.percentage, 75.0);
        assert!(!projection.is_ahead);
    }

    #[test]
    fn deficit_month_without_goal_is_ahead() {
        let projection = state(300_00, 0).projection(Money::new(-100_00));
        assert_eq!(projection.target, Money::new(200_00));
        assert!(projection.is_ahead);
        assert_eq!(projection.percentage, 150.0);
    }

    #[test]
    fn zero_target_yields_zero_percent() {
        let projection = state(0, 0).projection(Money::ZERO);
        assert_eq!(projection.percentage, 0.0);
        assert!(projection.percentage.is_finite());
        assert!(projection.is_ahead);
    }

    #[test]
    fn negative_target_yields_zero_percent() {
        let projection = state(0, 0).projection(Money::new(-50_00));
        assert_eq!(projection.percentage, 0.0);
    }

    #[test]
    fn editor_saves_goal_after_server_accepts() {
        let mut savings = state(100_00, 0);
        let mut editor = SavingsEditor::default();
        editor
            .begin(SavingsField::Goal, &savings, Currency::Eur)
            .unwrap();
        assert_eq!(editor.buffer(), Some("0.00"));

        for _ in 0..4 {
            editor.pop();
        }
        for ch in "5000".chars() {
            editor.push(ch);
        }
        let commit = editor.submit(Currency::Eur).unwrap();
        assert_eq!(commit.value, Money::new(5000_00));
        // Still editing until the update call succeeded.
        assert!(editor.is_editing());

        editor.complete(commit, &mut savings).unwrap();
        assert_eq!(savings.goal, Money::new(5000_00));
        assert_eq!(editor.mode(), &SavingsMode::Viewing);
    }

    #[test]
    fn cancel_discards_without_mutation() {
        let savings = state(100_00, 0);
        let mut editor = SavingsEditor::default();
        editor
            .begin(SavingsField::Savings, &savings, Currency::Eur)
            .unwrap();
        editor.push('9');
        editor.cancel();
        assert_eq!(editor.mode(), &SavingsMode::Viewing);
        assert_eq!(savings, state(100_00, 0));
    }

    #[test]
    fn second_edit_is_rejected() {
        let savings = state(0, 0);
        let mut editor = SavingsEditor::default();
        editor
            .begin(SavingsField::Savings, &savings, Currency::Eur)
            .unwrap();
        assert_eq!(
            editor.begin(SavingsField::Goal, &savings, Currency::Eur),
            Err(EngineError::EditInProgress)
        );
        assert_eq!(editor.editing_field(), Some(SavingsField::Savings));
    }

    #[test]
    fn invalid_buffer_keeps_editing() {
        let savings = state(0, 0);
        let mut editor = SavingsEditor::default();
        editor
            .begin(SavingsField::Savings, &savings, Currency::Eur)
            .unwrap();
        editor.push('x');
        assert!(editor.submit(Currency::Eur).is_err());
        assert!(editor.is_editing());
    }

    #[test]
    fn submit_while_viewing_fails() {
        let editor = SavingsEditor::default();
        assert_eq!(
            editor.submit(Currency::Eur),
            Err(EngineError::NotEditing)
        );
    }
}
