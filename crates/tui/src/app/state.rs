use std::time::{Duration, Instant};

use api_types::{
    auth::User,
    budget::{BudgetCategory, MonthlyBudgetWithCategory},
    fixed_expense::FixedExpense,
    item::ItemWithCategory,
    month::{Month, MonthSummary},
};
use chrono::{Datelike, NaiveDate};
use engine::{
    BudgetAnalysis, BudgetLine, Currency, LoadTicket, Money, MonthNav, MonthTotals, SavingsEditor,
    SavingsState, Snapshots, StatsView, can_close, last_day_of_month, lines_from_summary,
};

use super::form::{Form, PendingDelete};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Budget,
    Analysis,
    Stats,
    Settings,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Budget,
        Section::Analysis,
        Section::Stats,
        Section::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Budget => "Budget",
            Self::Analysis => "Analysis",
            Self::Stats => "Stats",
            Self::Settings => "Settings",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Section bound to a digit key, `1` being the first tab.
    pub fn from_digit(ch: char) -> Option<Self> {
        let idx = ch.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(idx as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
    Confirm,
}

#[derive(Debug)]
pub struct LoginState {
    pub mode: LoginMode,
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

impl LoginState {
    pub fn new(username: String) -> Self {
        Self {
            mode: LoginMode::Login,
            username,
            password: String::new(),
            confirm: String::new(),
            focus: LoginField::Username,
            message: None,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::Login => LoginMode::Register,
            LoginMode::Register => LoginMode::Login,
        };
        self.confirm.clear();
        self.message = None;
        if self.focus == LoginField::Confirm {
            self.focus = LoginField::Username;
        }
    }

    pub fn advance_focus(&mut self) {
        self.focus = match (self.focus, self.mode) {
            (LoginField::Username, _) => LoginField::Password,
            (LoginField::Password, LoginMode::Register) => LoginField::Confirm,
            (LoginField::Password, LoginMode::Login) | (LoginField::Confirm, _) => {
                LoginField::Username
            }
        };
    }

    pub fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
            LoginField::Confirm => &mut self.confirm,
        }
    }

    /// Checks done before anything is sent to the server.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("Fill in all fields.".to_string());
        }
        if self.mode == LoginMode::Register {
            if self.password != self.confirm {
                return Err("Passwords do not match.".to_string());
            }
            if self.password.chars().count() < 4 {
                return Err("Password must be at least 4 characters.".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

impl ToastState {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A loaded month with everything derived from it.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub summary: MonthSummary,
    pub totals: MonthTotals,
    /// Same order as `summary.budgets`.
    pub lines: Vec<BudgetLine>,
    pub analysis: BudgetAnalysis,
}

impl MonthView {
    pub fn new(summary: MonthSummary, currency: Currency) -> Self {
        let totals = MonthTotals::from_summary(&summary, currency);
        let lines = lines_from_summary(&summary, currency);
        let analysis = BudgetAnalysis::new(&lines, &totals);
        Self {
            summary,
            totals,
            lines,
            analysis,
        }
    }

    pub fn month(&self) -> &Month {
        &self.summary.month
    }

    pub fn budget_at(&self, idx: usize) -> Option<&MonthlyBudgetWithCategory> {
        self.summary.budgets.get(idx)
    }

    /// Closed months are read-only.
    pub fn is_closed(&self) -> bool {
        self.summary.month.is_closed
    }

    /// Order of the items list on screen.
    pub fn items_newest_first(&self) -> Vec<&ItemWithCategory> {
        let mut items: Vec<_> = self.summary.items.iter().collect();
        items.sort_by(|a, b| b.spent_on.cmp(&a.spent_on).then(b.id.cmp(&a.id)));
        items
    }
}

#[derive(Debug, Default)]
pub struct MonthState {
    /// Newest first, as returned by the server.
    pub months: Vec<Month>,
    pub selected_id: Option<i64>,
    pub view: Snapshots<MonthView>,
    pub error: Option<String>,
}

impl MonthState {
    /// Starts loading `target`, or the running month when `None`.
    pub fn start_load(&mut self, target: Option<i64>) -> LoadTicket {
        if target.is_some() {
            self.selected_id = target;
        }
        self.view.begin()
    }

    /// Applies a finished load. Returns `false` when a newer load has been
    /// started in the meantime and the result was dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<MonthSummary, String>,
        currency: Currency,
    ) -> bool {
        match result {
            Ok(summary) => {
                let id = summary.month.id;
                let committed = self.view.commit(ticket, MonthView::new(summary, currency));
                if committed {
                    self.selected_id = Some(id);
                    self.error = None;
                }
                committed
            }
            Err(message) => {
                let settled = self.view.abandon(ticket);
                if settled {
                    self.error = Some(message);
                }
                settled
            }
        }
    }

    pub fn current(&self) -> Option<&MonthView> {
        self.view.current()
    }

    pub fn nav(&self) -> MonthNav {
        self.selected_id
            .map(|id| MonthNav::new(&self.months, id))
            .unwrap_or_default()
    }

    pub fn knows(&self, id: i64) -> bool {
        self.months.iter().any(|m| m.id == id)
    }
}

#[derive(Debug, Default)]
pub struct SavingsUi {
    pub state: SavingsState,
    pub editor: SavingsEditor,
    pub retirement: Money,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BudgetMode {
    #[default]
    List,
    EditAllocation {
        buffer: String,
    },
    QuickAdd {
        buffer: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetPane {
    #[default]
    Categories,
    Items,
}

#[derive(Debug, Default)]
pub struct BudgetUi {
    pub pane: BudgetPane,
    /// Index into the month's budget lines.
    pub selected: usize,
    /// Index into [`MonthView::items_newest_first`].
    pub item: usize,
    pub mode: BudgetMode,
    pub message: Option<String>,
}

impl BudgetUi {
    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            BudgetPane::Categories => BudgetPane::Items,
            BudgetPane::Items => BudgetPane::Categories,
        };
    }

    pub fn selected_mut(&mut self) -> &mut usize {
        match self.pane {
            BudgetPane::Categories => &mut self.selected,
            BudgetPane::Items => &mut self.item,
        }
    }

    pub fn buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            BudgetMode::List => None,
            BudgetMode::EditAllocation { buffer } | BudgetMode::QuickAdd { buffer } => {
                Some(buffer)
            }
        }
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardPane {
    #[default]
    Income,
    Fixed,
}

#[derive(Debug, Default)]
pub struct DashboardUi {
    pub pane: DashboardPane,
    pub income: usize,
    pub fixed: usize,
}

impl DashboardUi {
    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            DashboardPane::Income => DashboardPane::Fixed,
            DashboardPane::Fixed => DashboardPane::Income,
        };
    }

    pub fn selected_mut(&mut self) -> &mut usize {
        match self.pane {
            DashboardPane::Income => &mut self.income,
            DashboardPane::Fixed => &mut self.fixed,
        }
    }
}

/// Moves a list cursor one row, staying inside a list of `len` rows.
pub fn step(cursor: &mut usize, len: usize, forward: bool) {
    *cursor = if len == 0 {
        0
    } else if forward {
        (*cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1).min(len - 1)
    };
}

fn clamp(cursor: &mut usize, len: usize) {
    *cursor = (*cursor).min(len.saturating_sub(1));
}

#[derive(Debug, Default)]
pub struct StatsUi {
    pub data: Option<StatsView>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub login: LoginState,
    pub user: Option<User>,
    pub currency: Currency,
    /// Calendar date in the configured timezone.
    pub today: NaiveDate,
    pub month: MonthState,
    pub categories: Vec<BudgetCategory>,
    pub fixed_expenses: Vec<FixedExpense>,
    pub savings: SavingsUi,
    pub dashboard: DashboardUi,
    pub budget: BudgetUi,
    pub stats: StatsUi,
    /// Open modal form; it takes every key while set.
    pub form: Option<Form>,
    pub confirm: Option<PendingDelete>,
    pub toast: Option<ToastState>,
    pub base_url: String,
    pub export_path: String,
}

impl AppState {
    pub fn new(
        username: String,
        currency: Currency,
        today: NaiveDate,
        base_url: String,
        export_path: String,
    ) -> Self {
        Self {
            screen: Screen::Login,
            section: Section::Dashboard,
            login: LoginState::new(username),
            user: None,
            currency,
            today,
            month: MonthState::default(),
            categories: Vec::new(),
            fixed_expenses: Vec::new(),
            savings: SavingsUi::default(),
            dashboard: DashboardUi::default(),
            budget: BudgetUi::default(),
            stats: StatsUi::default(),
            form: None,
            confirm: None,
            toast: None,
            base_url,
            export_path,
        }
    }

    /// Drops everything tied to the logged-in user. Month loads still in
    /// flight are invalidated so they cannot land in the next session.
    pub fn reset_session(&mut self) {
        let mut view = std::mem::take(&mut self.month.view);
        view.invalidate();
        let fresh = Self::new(
            std::mem::take(&mut self.login.username),
            self.currency,
            self.today,
            std::mem::take(&mut self.base_url),
            std::mem::take(&mut self.export_path),
        );
        *self = fresh;
        self.month.view = view;
    }

    pub fn notify(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toast = Some(ToastState::new(message, level));
    }

    /// Whether keystrokes currently go into a text buffer.
    pub fn is_typing(&self) -> bool {
        match self.screen {
            Screen::Login => true,
            Screen::Home => {
                self.form.is_some()
                    || self.confirm.is_some()
                    || self.savings.editor.is_editing()
                    || self.budget.mode != BudgetMode::List
            }
        }
    }

    /// Id of the month on screen, if records inside it may change.
    pub fn writable_month(&self) -> Result<i64, &'static str> {
        match self.month.current() {
            None => Err("No month loaded."),
            Some(view) if view.is_closed() => Err("Closed months are read-only."),
            Some(view) => Ok(view.month().id),
        }
    }

    /// Checks a write against the month on screen. `month_id` is the month
    /// the record lives in, if any.
    pub fn ensure_writable(&self, month_id: Option<i64>) -> Result<(), &'static str> {
        let open = self.writable_month()?;
        match month_id {
            Some(id) if id != open => Err("The selected month changed."),
            _ => Ok(()),
        }
    }

    /// Keeps every list cursor inside its list after a reload.
    pub fn clamp_selections(&mut self) {
        let (lines, items, income) = self.month.current().map_or((0, 0, 0), |view| {
            (
                view.lines.len(),
                view.summary.items.len(),
                view.summary.income_entries.len(),
            )
        });
        clamp(&mut self.budget.selected, lines);
        clamp(&mut self.budget.item, items);
        clamp(&mut self.dashboard.income, income);
        clamp(&mut self.dashboard.fixed, self.fixed_expenses.len());
    }

    pub fn can_close_selected(&self) -> bool {
        self.month
            .current()
            .is_some_and(|view| can_close(view.month(), self.today))
    }
}

/// Date recorded for an item added to `month`: today when today falls in
/// that month, its last day otherwise.
pub fn spent_on_for(month: &Month, today: NaiveDate) -> Option<NaiveDate> {
    if month.year == today.year() && month.month == today.month() {
        return Some(today);
    }
    let day = last_day_of_month(month.year, month.month).ok()?;
    NaiveDate::from_ymd_opt(month.year, month.month, day)
}

#[cfg(test)]
mod tests {
    use api_types::budget::MonthlyBudgetWithCategory;

    use super::*;

    fn month(id: i64, year: i32, month: u32) -> Month {
        Month {
            id,
            user_id: 1,
            year,
            month,
            is_closed: false,
            closed_at: None,
        }
    }

    fn summary(id: i64, spent: f64) -> MonthSummary {
        MonthSummary {
            month: month(id, 2026, 3),
            income_entries: vec![],
            fixed_expenses: vec![],
            budgets: vec![MonthlyBudgetWithCategory {
                id: 1,
                month_id: id,
                category_id: 1,
                category_label: "Food".to_string(),
                allocated_amount: 100.0,
                spent_amount: spent,
            }],
            items: vec![],
            total_income: 1000.0,
            total_fixed: 300.0,
            total_budgeted: 100.0,
            total_spent: spent,
            remaining: 700.0 - spent,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slow_month_load_cannot_overwrite_newer_selection() {
        let mut state = MonthState::default();
        let february = state.start_load(Some(6));
        let march = state.start_load(Some(7));

        assert!(state.finish_load(march, Ok(summary(7, 150.0)), Currency::Eur));
        assert!(!state.finish_load(february, Ok(summary(6, 10.0)), Currency::Eur));

        let view = state.current().unwrap();
        assert_eq!(view.month().id, 7);
        assert_eq!(state.selected_id, Some(7));
        assert_eq!(view.analysis.report.total_overspend, Money::new(50_00));
    }

    #[test]
    fn failed_load_shows_error_and_clears_old_month() {
        let mut state = MonthState::default();
        let first = state.start_load(None);
        assert!(state.finish_load(first, Ok(summary(7, 20.0)), Currency::Eur));
        assert_eq!(state.selected_id, Some(7));

        let second = state.start_load(Some(8));
        assert!(state.finish_load(second, Err("Not found.".to_string()), Currency::Eur));
        assert!(state.current().is_none());
        assert_eq!(state.error.as_deref(), Some("Not found."));
    }

    #[test]
    fn register_checks_confirmation_locally() {
        let mut login = LoginState::new("ada".to_string());
        login.password = "secret".to_string();
        assert!(login.validate().is_ok());

        login.toggle_mode();
        login.confirm = "secrets".to_string();
        assert_eq!(login.validate(), Err("Passwords do not match.".to_string()));

        login.password = "abc".to_string();
        login.confirm = "abc".to_string();
        assert!(login.validate().is_err());
    }

    #[test]
    fn confirm_field_only_in_register_mode() {
        let mut login = LoginState::new(String::new());
        login.advance_focus();
        login.advance_focus();
        assert_eq!(login.focus, LoginField::Username);

        login.toggle_mode();
        login.advance_focus();
        login.advance_focus();
        assert_eq!(login.focus, LoginField::Confirm);
    }

    #[test]
    fn sections_cycle_and_map_digits() {
        assert_eq!(Section::Settings.next(), Section::Dashboard);
        assert_eq!(Section::Dashboard.prev(), Section::Settings);
        assert_eq!(Section::from_digit('3'), Some(Section::Analysis));
        assert_eq!(Section::from_digit('0'), None);
        assert_eq!(Section::from_digit('9'), None);
    }

    #[test]
    fn reset_session_keeps_username_and_rejects_inflight_loads() {
        let mut state = AppState::new(
            "ada".to_string(),
            Currency::Eur,
            date(2026, 3, 31),
            "http://localhost/api/".to_string(),
            "out.json".to_string(),
        );
        state.screen = Screen::Home;
        let ticket = state.month.start_load(Some(7));

        state.reset_session();

        assert_eq!(state.screen, Screen::Login);
        assert_eq!(state.login.username, "ada");
        assert!(!state.month.finish_load(ticket, Ok(summary(7, 1.0)), Currency::Eur));
        assert!(state.month.current().is_none());
    }

    fn home_state() -> AppState {
        let mut state = AppState::new(
            "ada".to_string(),
            Currency::Eur,
            date(2026, 3, 31),
            "http://localhost/api/".to_string(),
            "out.json".to_string(),
        );
        state.screen = Screen::Home;
        state
    }

    #[test]
    fn closed_month_refuses_writes_inside_it() {
        let mut state = home_state();
        assert_eq!(state.writable_month(), Err("No month loaded."));

        let ticket = state.month.start_load(Some(7));
        state.month.finish_load(ticket, Ok(summary(7, 10.0)), Currency::Eur);
        assert_eq!(state.writable_month(), Ok(7));
        assert_eq!(state.ensure_writable(Some(7)), Ok(()));
        assert_eq!(
            state.ensure_writable(Some(6)),
            Err("The selected month changed.")
        );

        let mut closed = summary(7, 10.0);
        closed.month.is_closed = true;
        let ticket = state.month.start_load(Some(7));
        state.month.finish_load(ticket, Ok(closed), Currency::Eur);
        assert_eq!(state.ensure_writable(None), Err("Closed months are read-only."));
    }

    #[test]
    fn cursors_follow_their_pane_and_shrinking_lists() {
        let mut state = home_state();
        state.budget.toggle_pane();
        step(state.budget.selected_mut(), 3, true);
        step(state.budget.selected_mut(), 3, true);
        step(state.budget.selected_mut(), 3, true);
        assert_eq!((state.budget.selected, state.budget.item), (0, 2));

        state.dashboard.fixed = 4;
        state.clamp_selections();
        assert_eq!(state.budget.item, 0);
        assert_eq!(state.dashboard.fixed, 0);

        let mut cursor = 5;
        step(&mut cursor, 2, false);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn open_form_captures_typing() {
        let mut state = home_state();
        assert!(!state.is_typing());
        state.form = Some(Form::password());
        assert!(state.is_typing());
    }

    #[test]
    fn items_land_inside_the_selected_month() {
        let today = date(2026, 3, 14);
        assert_eq!(spent_on_for(&month(1, 2026, 3), today), Some(today));
        assert_eq!(
            spent_on_for(&month(1, 2026, 2), today),
            Some(date(2026, 2, 28))
        );
    }
}
