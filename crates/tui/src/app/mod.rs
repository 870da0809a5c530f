mod form;
mod state;

use std::{
    path::Path,
    time::{Duration, Instant},
};

use api_types::{export::UserExport, item::ItemInput, month::MonthSummary};
use chrono::Utc;
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent};
use engine::{
    Currency, LoadTicket, Money, SavingsField, SavingsState, StatsView, export as data_export,
};
use tokio::sync::mpsc;

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    quick_add,
    ui::{self, keymap::AppAction},
};

pub use form::{DeleteTarget, Form, FormKind, FormSubmit, PendingDelete};
pub use state::{
    AppState, BudgetMode, BudgetPane, DashboardPane, LoginField, LoginMode, MonthView, Screen,
    Section, ToastLevel, ToastState,
};

/// Result of a request that ran in the background.
#[derive(Debug)]
enum Loaded {
    Month {
        ticket: LoadTicket,
        result: std::result::Result<MonthSummary, ClientError>,
    },
}

pub struct App {
    config: AppConfig,
    client: Client,
    timezone: Tz,
    pub state: AppState,
    loaded_tx: mpsc::UnboundedSender<Loaded>,
    loaded_rx: mpsc::UnboundedReceiver<Loaded>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let currency = config.currency()?;
        let timezone = config.timezone()?;
        let today = Utc::now().with_timezone(&timezone).date_naive();
        let state = AppState::new(
            config.username.clone(),
            currency,
            today,
            config.base_url.clone(),
            config.export_path.clone(),
        );
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            client,
            timezone,
            state,
            loaded_tx,
            loaded_rx,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.tick();
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }

            while let Ok(loaded) = self.loaded_rx.try_recv() {
                self.apply_loaded(loaded).await;
            }
        }

        Ok(())
    }

    fn tick(&mut self) {
        self.state.today = Utc::now().with_timezone(&self.timezone).date_naive();
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Instant::now()))
        {
            self.state.toast = None;
        }
    }

    fn currency(&self) -> Currency {
        self.state.currency
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key, self.state.is_typing());
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.screen {
            Screen::Login => self.handle_login_key(action).await,
            Screen::Home => {
                if self.state.form.is_some() {
                    self.handle_form_key(action).await?;
                } else if self.state.confirm.is_some() {
                    self.handle_confirm_key(action).await;
                } else if self.state.savings.editor.is_editing() {
                    self.handle_savings_edit_key(action).await;
                } else if self.state.budget.mode != BudgetMode::List {
                    self.handle_budget_edit_key(action).await;
                } else {
                    self.handle_home_key(action).await?;
                }
                Ok(())
            }
        }
    }

    async fn handle_login_key(&mut self, action: AppAction) -> Result<()> {
        let login = &mut self.state.login;
        match action {
            AppAction::NextField | AppAction::Down => login.advance_focus(),
            AppAction::ToggleMode => login.toggle_mode(),
            AppAction::Backspace => {
                login.active_field_mut().pop();
            }
            AppAction::Input(ch) => login.active_field_mut().push(ch),
            AppAction::Submit => self.attempt_login().await?,
            _ => {}
        }
        Ok(())
    }

    async fn attempt_login(&mut self) -> Result<()> {
        if let Err(message) = self.state.login.validate() {
            self.state.login.message = Some(message);
            return Ok(());
        }

        let username = self.state.login.username.trim().to_string();
        let password = self.state.login.password.clone();
        let mode = self.state.login.mode;

        if mode == LoginMode::Register {
            if let Err(err) = self.client.register(&username, &password).await {
                tracing::warn!("register failed: {err:?}");
                self.state.login.message = Some(login_message_for_error(err, mode));
                return Ok(());
            }
            tracing::info!(%username, "registered");
        }

        match self.client.login(&username, &password).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "logged in");
                self.state.user = Some(user);
                self.state.screen = Screen::Home;
                self.state.section = Section::Dashboard;
                self.state.login.password.clear();
                self.state.login.confirm.clear();
                self.state.login.message = None;
                self.refresh_all().await;
            }
            Err(err) => {
                tracing::warn!("login failed: {err:?}");
                self.state.login.message = Some(login_message_for_error(err, mode));
            }
        }

        Ok(())
    }

    async fn handle_home_key(&mut self, action: AppAction) -> Result<()> {
        match action {
            AppAction::NextField => self.switch_section(self.state.section.next()).await,
            AppAction::PrevField => self.switch_section(self.state.section.prev()).await,
            AppAction::Up => self.move_selection(false),
            AppAction::Down => self.move_selection(true),
            AppAction::Left => self.select_older_month(),
            AppAction::Right => self.select_newer_month(),
            AppAction::Input(ch) => {
                if let Some(section) = Section::from_digit(ch) {
                    self.switch_section(section).await;
                } else {
                    self.handle_section_key(ch).await?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn switch_section(&mut self, section: Section) {
        self.state.section = section;
        if section == Section::Stats && self.state.stats.data.is_none() {
            self.load_stats().await;
        }
    }

    async fn handle_section_key(&mut self, ch: char) -> Result<()> {
        let shows_month = matches!(
            self.state.section,
            Section::Dashboard | Section::Budget | Section::Analysis
        );
        match ch {
            'p' | 'P' if shows_month => {
                self.select_older_month();
                return Ok(());
            }
            'n' | 'N' if shows_month => {
                self.select_newer_month();
                return Ok(());
            }
            'r' | 'R' => {
                if self.state.section == Section::Stats {
                    self.load_stats().await;
                } else {
                    self.refresh_all().await;
                }
                return Ok(());
            }
            _ => {}
        }

        match self.state.section {
            Section::Dashboard => match ch {
                's' | 'S' => self.begin_savings_edit(SavingsField::Savings),
                'g' | 'G' => self.begin_savings_edit(SavingsField::Goal),
                'c' | 'C' => self.close_selected_month().await,
                'd' | 'D' => self.download_pdf().await,
                't' | 'T' => {
                    let form = Form::retirement(self.state.savings.retirement, self.currency());
                    self.state.form = Some(form);
                }
                'w' | 'W' => self.state.dashboard.toggle_pane(),
                'j' | 'J' => self.move_selection(true),
                'k' | 'K' => self.move_selection(false),
                '+' => self.new_dashboard_record(),
                'm' | 'M' => self.edit_dashboard_record(),
                'x' => self.delete_dashboard_record(),
                _ => {}
            },
            Section::Budget => match (ch, self.state.budget.pane) {
                ('j' | 'J', _) => self.move_selection(true),
                ('k' | 'K', _) => self.move_selection(false),
                ('w' | 'W', _) => self.state.budget.toggle_pane(),
                ('a' | 'A', _) => self.begin_quick_add(),
                ('e' | 'E', BudgetPane::Categories) => self.begin_allocation_edit(),
                ('+', BudgetPane::Categories) => self.new_category(),
                ('m' | 'M', BudgetPane::Categories) => self.edit_category(),
                ('x', BudgetPane::Categories) => self.delete_category(),
                ('m' | 'M', BudgetPane::Items) => self.edit_item(),
                ('x', BudgetPane::Items) => self.delete_item(),
                _ => {}
            },
            Section::Analysis | Section::Stats => {}
            Section::Settings => match ch {
                'x' | 'X' => self.export_data().await,
                'i' | 'I' => self.import_data().await,
                'l' | 'L' => self.logout().await?,
                'u' | 'U' => {
                    let current = self
                        .state
                        .user
                        .as_ref()
                        .map_or("", |user| user.username.as_str());
                    self.state.form = Some(Form::username(current));
                }
                'w' | 'W' => self.state.form = Some(Form::password()),
                // Uppercase only, so a stray `d` cannot start a wipe.
                'D' => self.state.form = Some(Form::clear_data()),
                _ => {}
            },
        }
        Ok(())
    }

    // Months

    async fn refresh_all(&mut self) {
        match self.client.me().await {
            Ok(user) => self.state.user = Some(user),
            Err(ClientError::Unauthorized) => {
                tracing::info!("session expired");
                self.state.reset_session();
                self.state.login.message = Some("Session expired, log in again.".to_string());
                return;
            }
            Err(err) => tracing::warn!("session check failed: {err:?}"),
        }
        self.load_months().await;
        self.load_reference_data().await;
        self.load_savings().await;
        self.spawn_month_load(self.state.month.selected_id);
        if self.state.section == Section::Stats {
            self.load_stats().await;
        } else {
            self.state.stats.data = None;
        }
    }

    async fn load_months(&mut self) {
        match self.client.months().await {
            Ok(months) => {
                tracing::debug!(count = months.len(), "months loaded");
                self.state.month.months = months;
            }
            Err(err) => {
                tracing::warn!("months load failed: {err:?}");
                self.state.month.error = Some(message_for_error(err));
            }
        }
    }

    async fn load_reference_data(&mut self) {
        match self.client.categories().await {
            Ok(categories) => self.state.categories = categories,
            Err(err) => tracing::warn!("categories load failed: {err:?}"),
        }
        match self.client.fixed_expenses().await {
            Ok(expenses) => self.state.fixed_expenses = expenses,
            Err(err) => tracing::warn!("fixed expenses load failed: {err:?}"),
        }
        self.state.clamp_selections();
    }

    /// Loads `target` (or the running month) in the background. Only the
    /// newest load is ever applied.
    fn spawn_month_load(&mut self, target: Option<i64>) {
        let ticket = self.state.month.start_load(target);
        let client = self.client.clone();
        let tx = self.loaded_tx.clone();
        tracing::debug!(?target, ticket = ticket.version(), "month load started");

        tokio::spawn(async move {
            let result = match target {
                Some(id) => client.month(id).await,
                None => client.current_month().await,
            };
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(Loaded::Month { ticket, result });
        });
    }

    async fn apply_loaded(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Month { ticket, result } => {
                let result = result.map_err(|err| {
                    tracing::warn!("month load failed: {err:?}");
                    message_for_error(err)
                });
                let currency = self.currency();
                if !self.state.month.finish_load(ticket, result, currency) {
                    tracing::debug!(ticket = ticket.version(), "stale month load dropped");
                    return;
                }
                self.state.clamp_selections();

                // `months/current` creates the running month on first access.
                if let Some(id) = self.state.month.selected_id
                    && !self.state.month.knows(id)
                {
                    self.load_months().await;
                }
            }
        }
    }

    fn select_older_month(&mut self) {
        if let Some(id) = self.state.month.nav().prev {
            self.spawn_month_load(Some(id));
        }
    }

    fn select_newer_month(&mut self) {
        if let Some(id) = self.state.month.nav().next {
            self.spawn_month_load(Some(id));
        }
    }

    async fn close_selected_month(&mut self) {
        if !self.state.can_close_selected() {
            self.state.notify(
                "A month can only be closed on its last day.",
                ToastLevel::Info,
            );
            return;
        }
        let Some(id) = self.state.month.selected_id else {
            return;
        };
        match self.client.close_month(id).await {
            Ok(month) => {
                tracing::info!(month_id = month.id, "month closed");
                self.state.notify("Month closed.", ToastLevel::Success);
                self.load_months().await;
                self.spawn_month_load(Some(id));
            }
            Err(err) => {
                tracing::warn!("close month failed: {err:?}");
                self.state.notify(message_for_error(err), ToastLevel::Error);
            }
        }
    }

    async fn download_pdf(&mut self) {
        let Some(month) = self.state.month.current().map(|view| view.month().clone()) else {
            return;
        };
        if !month.is_closed {
            self.state
                .notify("PDF reports exist for closed months only.", ToastLevel::Info);
            return;
        }

        let bytes = match self.client.month_pdf(month.id).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("pdf download failed: {err:?}");
                self.state.notify(message_for_error(err), ToastLevel::Error);
                return;
            }
        };

        let path = Path::new(&self.config.pdf_dir)
            .join(format!("payme-{}-{:02}.pdf", month.year, month.month));
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "pdf saved");
                self.state
                    .notify(format!("Saved {}", path.display()), ToastLevel::Success);
            }
            Err(err) => {
                tracing::warn!("pdf write failed: {err}");
                self.state
                    .notify(format!("Cannot write PDF: {err}"), ToastLevel::Error);
            }
        }
    }

    // Savings

    async fn load_savings(&mut self) {
        let currency = self.currency();
        match self.client.savings().await {
            Ok(savings) => {
                self.state.savings.state = SavingsState::from_wire(&savings, currency);
                self.state.savings.error = None;
            }
            Err(err) => {
                tracing::warn!("savings load failed: {err:?}");
                self.state.savings.error = Some(message_for_error(err));
            }
        }
        match self.client.retirement_savings().await {
            Ok(retirement) => {
                self.state.savings.retirement =
                    Money::from_major(retirement.retirement_savings, currency);
            }
            Err(err) => tracing::warn!("retirement savings load failed: {err:?}"),
        }
    }

    fn begin_savings_edit(&mut self, field: SavingsField) {
        let currency = self.currency();
        let savings = &mut self.state.savings;
        if let Err(err) = savings.editor.begin(field, &savings.state, currency) {
            self.state.notify(err.to_string(), ToastLevel::Error);
            return;
        }
        savings.error = None;
    }

    async fn handle_savings_edit_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => {
                self.state.savings.editor.cancel();
                self.state.savings.error = None;
            }
            AppAction::Backspace => self.state.savings.editor.pop(),
            AppAction::Input(ch) => self.state.savings.editor.push(ch),
            AppAction::Submit => self.submit_savings_edit().await,
            _ => {}
        }
    }

    async fn submit_savings_edit(&mut self) {
        let currency = self.currency();
        let commit = match self.state.savings.editor.submit(currency) {
            Ok(commit) => commit,
            Err(err) => {
                self.state.savings.error = Some(err.to_string());
                return;
            }
        };

        let amount = commit.value.to_major(currency);
        let result = match commit.field {
            SavingsField::Savings => self.client.update_savings(amount).await,
            SavingsField::Goal => self.client.update_savings_goal(amount).await,
        };

        match result {
            Ok(savings) => {
                let savings_ui = &mut self.state.savings;
                if let Err(err) = savings_ui.editor.complete(commit, &mut savings_ui.state) {
                    tracing::warn!("savings edit out of sync: {err}");
                    savings_ui.editor.cancel();
                }
                savings_ui.state = SavingsState::from_wire(&savings, currency);
                savings_ui.error = None;
                self.state.notify(
                    format!("{} updated.", commit.field.label()),
                    ToastLevel::Success,
                );
            }
            Err(err) => {
                tracing::warn!("savings update failed: {err:?}");
                self.state.savings.error = Some(message_for_error(err));
            }
        }
    }

    // Lists

    fn move_selection(&mut self, forward: bool) {
        let state = &mut self.state;
        let view = state.month.current();
        let (cursor, len) = match state.section {
            Section::Dashboard => {
                let len = match state.dashboard.pane {
                    DashboardPane::Income => {
                        view.map_or(0, |view| view.summary.income_entries.len())
                    }
                    DashboardPane::Fixed => state.fixed_expenses.len(),
                };
                (state.dashboard.selected_mut(), len)
            }
            Section::Budget => {
                let len = view.map_or(0, |view| match state.budget.pane {
                    BudgetPane::Categories => view.lines.len(),
                    BudgetPane::Items => view.summary.items.len(),
                });
                (state.budget.selected_mut(), len)
            }
            Section::Analysis | Section::Stats | Section::Settings => return,
        };
        state::step(cursor, len, forward);
    }

    /// Id of the open month on screen, or a toast explaining why there is
    /// none.
    fn editable_month(&mut self) -> Option<i64> {
        match self.state.writable_month() {
            Ok(id) => Some(id),
            Err(message) => {
                self.state.notify(message, ToastLevel::Info);
                None
            }
        }
    }

    fn new_dashboard_record(&mut self) {
        let currency = self.currency();
        let form = match self.state.dashboard.pane {
            DashboardPane::Income => {
                let Some(month_id) = self.editable_month() else {
                    return;
                };
                Form::income(month_id, None, currency)
            }
            DashboardPane::Fixed => Form::fixed_expense(None, currency),
        };
        self.state.form = Some(form);
    }

    fn edit_dashboard_record(&mut self) {
        let currency = self.currency();
        let form = match self.state.dashboard.pane {
            DashboardPane::Income => {
                let Some(month_id) = self.editable_month() else {
                    return;
                };
                let entry = self.state.month.current().and_then(|view| {
                    view.summary
                        .income_entries
                        .get(self.state.dashboard.income)
                });
                let Some(entry) = entry else {
                    return;
                };
                Form::income(month_id, Some(entry), currency)
            }
            DashboardPane::Fixed => {
                let Some(expense) = self.state.fixed_expenses.get(self.state.dashboard.fixed)
                else {
                    return;
                };
                Form::fixed_expense(Some(expense), currency)
            }
        };
        self.state.form = Some(form);
    }

    fn delete_dashboard_record(&mut self) {
        let pending = match self.state.dashboard.pane {
            DashboardPane::Income => self
                .state
                .month
                .current()
                .and_then(|view| {
                    view.summary
                        .income_entries
                        .get(self.state.dashboard.income)
                })
                .map(|entry| PendingDelete {
                    target: DeleteTarget::Income {
                        month_id: entry.month_id,
                        id: entry.id,
                    },
                    label: entry.label.clone(),
                }),
            DashboardPane::Fixed => self
                .state
                .fixed_expenses
                .get(self.state.dashboard.fixed)
                .map(|expense| PendingDelete {
                    target: DeleteTarget::FixedExpense { id: expense.id },
                    label: expense.label.clone(),
                }),
        };
        if let Some(pending) = pending {
            self.ask_delete(pending);
        }
    }

    fn new_category(&mut self) {
        if self.editable_month().is_none() {
            return;
        }
        self.state.form = Some(Form::category(None, self.currency()));
    }

    fn selected_category_id(&self) -> Option<i64> {
        self.state
            .month
            .current()?
            .budget_at(self.state.budget.selected)
            .map(|budget| budget.category_id)
    }

    fn edit_category(&mut self) {
        if self.editable_month().is_none() {
            return;
        }
        let Some(category_id) = self.selected_category_id() else {
            return;
        };
        let Some(category) = self
            .state
            .categories
            .iter()
            .find(|category| category.id == category_id)
        else {
            return;
        };
        let form = Form::category(Some(category), self.currency());
        self.state.form = Some(form);
    }

    fn delete_category(&mut self) {
        let pending = self
            .state
            .month
            .current()
            .and_then(|view| view.budget_at(self.state.budget.selected))
            .map(|budget| PendingDelete {
                target: DeleteTarget::Category {
                    id: budget.category_id,
                },
                label: budget.category_label.clone(),
            });
        if let Some(pending) = pending {
            self.ask_delete(pending);
        }
    }

    fn edit_item(&mut self) {
        if self.editable_month().is_none() {
            return;
        }
        let currency = self.currency();
        let Some(view) = self.state.month.current() else {
            return;
        };
        let month = view.month();
        let Some(item) = view
            .items_newest_first()
            .get(self.state.budget.item)
            .copied()
        else {
            return;
        };
        let form = Form::item(item, month.year, month.month, currency);
        self.state.form = Some(form);
    }

    fn delete_item(&mut self) {
        let pending = self.state.month.current().and_then(|view| {
            view.items_newest_first()
                .get(self.state.budget.item)
                .map(|item| PendingDelete {
                    target: DeleteTarget::Item {
                        month_id: item.month_id,
                        id: item.id,
                    },
                    label: item.description.clone(),
                })
        });
        if let Some(pending) = pending {
            self.ask_delete(pending);
        }
    }

    // Forms

    async fn handle_form_key(&mut self, action: AppAction) -> Result<()> {
        let Some(form) = self.state.form.as_mut() else {
            return Ok(());
        };
        match action {
            AppAction::Cancel => self.state.form = None,
            AppAction::NextField | AppAction::Down => form.next_field(),
            AppAction::PrevField | AppAction::Up => form.prev_field(),
            AppAction::Backspace => form.pop(),
            AppAction::Input(ch) => form.push(ch),
            AppAction::Submit => self.submit_form().await?,
            _ => {}
        }
        Ok(())
    }

    async fn submit_form(&mut self) -> Result<()> {
        let Some(form) = self.state.form.as_ref() else {
            return Ok(());
        };
        let kind = form.kind;
        let submit = match form.submit(self.currency(), &self.state.categories) {
            Ok(submit) => submit,
            Err(message) => {
                self.set_form_error(message);
                return Ok(());
            }
        };

        // The month may have been closed or swapped since the form opened.
        if kind.locked_by_closed_month()
            && let Err(message) = self.state.ensure_writable(kind.month_id())
        {
            self.state.form = None;
            self.state.notify(message, ToastLevel::Info);
            return Ok(());
        }

        match self.send_form(submit).await {
            Ok(done) => {
                tracing::info!(form = kind.title(), "form saved");
                self.state.form = None;
                self.state.notify(done, ToastLevel::Success);
                self.reload_after_write(kind).await?;
            }
            Err(err) => {
                tracing::warn!(form = kind.title(), "form submit failed: {err:?}");
                self.set_form_error(form_message_for_error(kind, err));
            }
        }
        Ok(())
    }

    fn set_form_error(&mut self, message: String) {
        if let Some(form) = self.state.form.as_mut() {
            form.error = Some(message);
        }
    }

    /// Sends a validated form. Returns the confirmation shown to the user.
    async fn send_form(
        &mut self,
        submit: FormSubmit,
    ) -> std::result::Result<&'static str, ClientError> {
        let currency = self.currency();
        let client = &self.client;
        match submit {
            FormSubmit::Income {
                month_id,
                id: None,
                input,
            } => {
                client.create_income(month_id, &input).await?;
                Ok("Income added.")
            }
            FormSubmit::Income {
                month_id,
                id: Some(id),
                input,
            } => {
                client.update_income(month_id, id, &input).await?;
                Ok("Income updated.")
            }
            FormSubmit::FixedExpense { id: None, input } => {
                client.create_fixed_expense(&input).await?;
                Ok("Fixed expense added.")
            }
            FormSubmit::FixedExpense {
                id: Some(id),
                input,
            } => {
                client.update_fixed_expense(id, &input).await?;
                Ok("Fixed expense updated.")
            }
            FormSubmit::Category { id: None, input } => {
                client.create_category(&input).await?;
                Ok("Category added.")
            }
            FormSubmit::Category {
                id: Some(id),
                input,
            } => {
                client.update_category(id, &input).await?;
                Ok("Category updated.")
            }
            FormSubmit::Item {
                month_id,
                id,
                input,
            } => {
                client.update_item(month_id, id, &input).await?;
                Ok("Item updated.")
            }
            FormSubmit::Retirement(amount) => {
                let saved = client
                    .update_retirement_savings(amount.to_major(currency))
                    .await?;
                self.state.savings.retirement =
                    Money::from_major(saved.retirement_savings, currency);
                Ok("Retirement savings updated.")
            }
            FormSubmit::Username(username) => {
                let user = client.change_username(&username).await?;
                tracing::info!(username = %user.username, "username changed");
                self.state.login.username = user.username.clone();
                self.state.user = Some(user);
                Ok("Username changed.")
            }
            FormSubmit::Password { current, new } => {
                client.change_password(&current, &new).await?;
                Ok("Password changed.")
            }
            FormSubmit::ClearData { password } => {
                client.clear_all_data(&password).await?;
                tracing::info!("all data deleted");
                Ok("All data deleted.")
            }
        }
    }

    async fn reload_after_write(&mut self, kind: FormKind) -> Result<()> {
        match kind {
            FormKind::Income { month_id, .. } | FormKind::Item { month_id, .. } => {
                self.spawn_month_load(Some(month_id));
            }
            FormKind::FixedExpense { .. } | FormKind::Category { .. } => {
                self.load_reference_data().await;
                self.spawn_month_load(self.state.month.selected_id);
            }
            FormKind::ClearData => {
                self.logout().await?;
                self.state.login.message = Some("All data deleted.".to_string());
            }
            FormKind::Retirement | FormKind::Username | FormKind::Password => {}
        }
        Ok(())
    }

    fn ask_delete(&mut self, pending: PendingDelete) {
        if pending.target.locked_by_closed_month()
            && let Err(message) = self.state.ensure_writable(pending.target.month_id())
        {
            self.state.notify(message, ToastLevel::Info);
            return;
        }
        self.state.confirm = Some(pending);
    }

    /// `y` runs the pending delete, any other key drops it.
    async fn handle_confirm_key(&mut self, action: AppAction) {
        let Some(pending) = self.state.confirm.take() else {
            return;
        };
        if !matches!(action, AppAction::Input('y' | 'Y')) {
            self.state.notify("Nothing deleted.", ToastLevel::Info);
            return;
        }
        let target = pending.target;
        if target.locked_by_closed_month()
            && let Err(message) = self.state.ensure_writable(target.month_id())
        {
            self.state.notify(message, ToastLevel::Info);
            return;
        }

        let result = match target {
            DeleteTarget::Income { month_id, id } => self.client.delete_income(month_id, id).await,
            DeleteTarget::FixedExpense { id } => self.client.delete_fixed_expense(id).await,
            DeleteTarget::Category { id } => self.client.delete_category(id).await,
            DeleteTarget::Item { month_id, id } => self.client.delete_item(month_id, id).await,
        };
        match result {
            Ok(()) => {
                tracing::info!(?target, "deleted");
                self.state
                    .notify(format!("Deleted {}.", pending.label), ToastLevel::Success);
                if matches!(
                    target,
                    DeleteTarget::FixedExpense { .. } | DeleteTarget::Category { .. }
                ) {
                    self.load_reference_data().await;
                }
                let month_id = target.month_id().or(self.state.month.selected_id);
                self.spawn_month_load(month_id);
            }
            Err(err) => {
                tracing::warn!(?target, "delete failed: {err:?}");
                self.state.notify(message_for_error(err), ToastLevel::Error);
            }
        }
    }

    // Budget

    fn begin_allocation_edit(&mut self) {
        if self.editable_month().is_none() {
            return;
        }
        let currency = self.currency();
        let Some(line) = self
            .state
            .month
            .current()
            .and_then(|view| view.lines.get(self.state.budget.selected))
        else {
            return;
        };
        let buffer = format!("{:.2}", line.allocated.to_major(currency));
        self.state.budget.mode = BudgetMode::EditAllocation { buffer };
        self.state.budget.message = None;
    }

    fn begin_quick_add(&mut self) {
        if self.editable_month().is_none() {
            return;
        }
        self.state.budget.mode = BudgetMode::QuickAdd {
            buffer: String::new(),
        };
        self.state.budget.message = None;
    }

    async fn handle_budget_edit_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => {
                self.state.budget.mode = BudgetMode::List;
                self.state.budget.message = None;
            }
            AppAction::Backspace => {
                if let Some(buffer) = self.state.budget.buffer_mut() {
                    buffer.pop();
                }
            }
            AppAction::Input(ch) => {
                if let Some(buffer) = self.state.budget.buffer_mut() {
                    buffer.push(ch);
                }
            }
            AppAction::Submit => match self.state.budget.mode.clone() {
                BudgetMode::EditAllocation { buffer } => self.submit_allocation(&buffer).await,
                BudgetMode::QuickAdd { buffer } => self.submit_quick_add(&buffer).await,
                BudgetMode::List => {}
            },
            _ => {}
        }
    }

    async fn submit_allocation(&mut self, buffer: &str) {
        let currency = self.currency();
        let amount = match Money::parse_major(buffer, currency) {
            Ok(amount) if !amount.is_negative() => amount,
            Ok(_) => {
                self.state.budget.message = Some("Amount must be >= 0.".to_string());
                return;
            }
            Err(err) => {
                self.state.budget.message = Some(err.to_string());
                return;
            }
        };
        let Some((month_id, budget_id)) = self.state.month.current().and_then(|view| {
            view.budget_at(self.state.budget.selected)
                .map(|budget| (budget.month_id, budget.id))
        }) else {
            self.state.budget.mode = BudgetMode::List;
            return;
        };

        match self
            .client
            .update_budget(month_id, budget_id, amount.to_major(currency))
            .await
        {
            Ok(_) => {
                self.state.budget.mode = BudgetMode::List;
                self.state.budget.message = None;
                self.state.notify("Allocation updated.", ToastLevel::Success);
                self.spawn_month_load(Some(month_id));
            }
            Err(err) => {
                tracing::warn!("budget update failed: {err:?}");
                self.state.budget.message = Some(message_for_error(err));
            }
        }
    }

    async fn submit_quick_add(&mut self, buffer: &str) {
        let currency = self.currency();
        let parsed = match quick_add::parse(buffer, currency) {
            Ok(parsed) => parsed,
            Err(message) => {
                self.state.budget.message = Some(message);
                return;
            }
        };
        let Some(tag) = parsed.category.as_deref() else {
            self.state.budget.message = Some("Add a #category.".to_string());
            return;
        };
        let Some(category) = quick_add::resolve_category(tag, &self.state.categories) else {
            self.state.budget.message = Some(format!("Unknown category: {tag}"));
            return;
        };
        let Some(month) = self.state.month.current().map(|view| view.month().clone()) else {
            return;
        };
        let Some(spent_on) = state::spent_on_for(&month, self.state.today) else {
            return;
        };

        let item = ItemInput {
            category_id: category.id,
            description: parsed.note.unwrap_or_else(|| category.label.clone()),
            amount: parsed.amount.to_major(currency),
            spent_on,
        };

        match self.client.create_item(month.id, &item).await {
            Ok(created) => {
                tracing::info!(item_id = created.id, "item added");
                self.state.budget.mode = BudgetMode::List;
                self.state.budget.message = None;
                self.state.notify(
                    format!("Added {}", parsed.amount.format(currency)),
                    ToastLevel::Success,
                );
                self.spawn_month_load(Some(month.id));
            }
            Err(err) => {
                tracing::warn!("item create failed: {err:?}");
                self.state.budget.message = Some(message_for_error(err));
            }
        }
    }

    // Stats

    async fn load_stats(&mut self) {
        match self.client.stats().await {
            Ok(stats) => {
                tracing::debug!(months = stats.monthly_trends.len(), "stats loaded");
                self.state.stats.data = Some(StatsView::from_wire(&stats, self.currency()));
                self.state.stats.error = None;
            }
            Err(err) => {
                tracing::warn!("stats load failed: {err:?}");
                self.state.stats.error = Some(message_for_error(err));
            }
        }
    }

    // Settings

    async fn export_data(&mut self) {
        let export = match self.client.export_json().await {
            Ok(export) => export,
            Err(err) => {
                tracing::warn!("export failed: {err:?}");
                self.state.notify(message_for_error(err), ToastLevel::Error);
                return;
            }
        };
        let path = self.config.export_path.clone();
        let written = serde_json::to_string_pretty(&export)
            .map_err(AppError::from)
            .and_then(|json| std::fs::write(&path, json).map_err(AppError::from));
        match written {
            Ok(()) => {
                tracing::info!(%path, "data exported");
                self.state
                    .notify(format!("Exported to {path}"), ToastLevel::Success);
            }
            Err(err) => {
                tracing::warn!("export write failed: {err}");
                self.state
                    .notify(format!("Export failed: {err}"), ToastLevel::Error);
            }
        }
    }

    async fn import_data(&mut self) {
        let path = self.config.export_path.clone();
        let export = match read_export(&path) {
            Ok(export) => export,
            Err(err) => {
                tracing::warn!("import read failed: {err}");
                self.state
                    .notify(format!("Import failed: {err}"), ToastLevel::Error);
                return;
            }
        };

        if let Err(err) = self.client.import_json(&export).await {
            tracing::warn!("import failed: {err:?}");
            self.state.notify(message_for_error(err), ToastLevel::Error);
            return;
        }

        tracing::info!(%path, "data imported");
        self.state.notify("Import complete.", ToastLevel::Success);
        self.refresh_all().await;
    }

    async fn logout(&mut self) -> Result<()> {
        if let Err(err) = self.client.logout().await {
            tracing::warn!("logout failed, dropping session anyway: {err:?}");
        }
        // A fresh client drops the cookie even if the server never saw the
        // logout.
        self.client = Client::new(&self.config.base_url)?;
        self.state.reset_session();
        tracing::info!("logged out");
        Ok(())
    }
}

/// Reads and validates an export file before anything is sent. Category
/// references come back rewritten to the declared labels.
fn read_export(path: &str) -> Result<UserExport> {
    let raw = std::fs::read_to_string(path)?;
    let export: UserExport = serde_json::from_str(&raw)?;
    let (export, stats) = data_export::prepare(export)?;
    tracing::debug!(?stats, "export validated");
    Ok(export)
}

fn login_message_for_error(err: ClientError, mode: LoginMode) -> String {
    match (err, mode) {
        (ClientError::Conflict(_), LoginMode::Register) => "Username already exists.".to_string(),
        (ClientError::Unauthorized | ClientError::Forbidden, _) => {
            "Invalid username or password.".to_string()
        }
        (err, _) => message_for_error(err),
    }
}

fn form_message_for_error(kind: FormKind, err: ClientError) -> String {
    match (kind, err) {
        (FormKind::Password | FormKind::ClearData, ClientError::Unauthorized) => {
            "Wrong password.".to_string()
        }
        (FormKind::Username, ClientError::Server(_) | ClientError::Conflict(_)) => {
            "Username may already be taken.".to_string()
        }
        (_, err) => message_for_error(err),
    }
}

fn message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Unauthorized | ClientError::Forbidden => {
            "Session expired, log in again.".to_string()
        }
        ClientError::NotFound => "Not found.".to_string(),
        ClientError::Conflict(message) => format!("Conflict: {message}"),
        ClientError::Validation(message) => format!("Validation error: {message}"),
        ClientError::Server(message) => format!("Server error: {message}"),
        ClientError::Transport(err) => format!("Server unreachable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use api_types::{income::IncomeEntry, month::Month};
    use axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::{Method, StatusCode, Uri},
        response::{IntoResponse, Response},
    };
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::{Value, json};

    use super::*;

    type Requests = Arc<Mutex<Vec<(Method, String, Value)>>>;

    async fn record(
        State(requests): State<Requests>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> Response {
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        requests
            .lock()
            .unwrap()
            .push((method.clone(), uri.path().to_string(), body.clone()));
        match method {
            Method::POST => Json(json!({
                "id": 12, "month_id": 7, "label": body["label"], "amount": body["amount"]
            }))
            .into_response(),
            Method::DELETE => StatusCode::NO_CONTENT.into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    fn show_month(app: &mut App, closed: bool) {
        let summary = MonthSummary {
            month: Month {
                id: 7,
                user_id: 1,
                year: 2026,
                month: 3,
                is_closed: closed,
                closed_at: None,
            },
            income_entries: vec![IncomeEntry {
                id: 11,
                month_id: 7,
                label: "Salary".to_string(),
                amount: 2500.0,
            }],
            fixed_expenses: vec![],
            budgets: vec![],
            items: vec![],
            total_income: 2500.0,
            total_fixed: 0.0,
            total_budgeted: 0.0,
            total_spent: 0.0,
            remaining: 2500.0,
        };
        let ticket = app.state.month.start_load(Some(7));
        assert!(app.state.month.finish_load(ticket, Ok(summary), Currency::Eur));
    }

    async fn app_showing_month(closed: bool) -> (App, Requests) {
        let requests = Requests::default();
        let router = Router::new()
            .fallback(record)
            .with_state(requests.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = AppConfig {
            base_url: format!("http://{addr}/api/"),
            ..AppConfig::default()
        };
        let mut app = App::new(config).unwrap();
        app.state.screen = Screen::Home;
        show_month(&mut app, closed);
        (app, requests)
    }

    async fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .await
            .unwrap();
    }

    async fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch)).await;
        }
    }

    fn toast(app: &App) -> Option<&str> {
        app.state.toast.as_ref().map(|toast| toast.message.as_str())
    }

    #[tokio::test]
    async fn closed_month_refuses_income_changes_without_a_request() {
        let (mut app, requests) = app_showing_month(true).await;

        press(&mut app, KeyCode::Char('+')).await;
        assert!(app.state.form.is_none());
        assert_eq!(toast(&app), Some("Closed months are read-only."));

        press(&mut app, KeyCode::Char('m')).await;
        press(&mut app, KeyCode::Char('x')).await;
        assert!(app.state.form.is_none());
        assert!(app.state.confirm.is_none());

        // Fixed expenses belong to the user, not to the month.
        press(&mut app, KeyCode::Char('w')).await;
        press(&mut app, KeyCode::Char('+')).await;
        assert_eq!(
            app.state.form.as_ref().map(|form| form.kind),
            Some(FormKind::FixedExpense { id: None })
        );

        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn income_form_posts_to_the_open_month() {
        let (mut app, requests) = app_showing_month(false).await;

        press(&mut app, KeyCode::Char('+')).await;
        type_text(&mut app, "Bonus").await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "120").await;
        press(&mut app, KeyCode::Enter).await;

        assert!(app.state.form.is_none());
        assert_eq!(toast(&app), Some("Income added."));
        let sent = requests.lock().unwrap().clone();
        assert_eq!(sent[0].0, Method::POST);
        assert_eq!(sent[0].1, "/api/months/7/income");
        assert_eq!(sent[0].2, json!({"label": "Bonus", "amount": 120.0}));
    }

    #[tokio::test]
    async fn month_closed_while_editing_is_not_sent() {
        let (mut app, requests) = app_showing_month(false).await;

        press(&mut app, KeyCode::Char('m')).await;
        assert_eq!(
            app.state.form.as_ref().map(|form| form.fields[0].value.as_str()),
            Some("Salary")
        );
        show_month(&mut app, true);
        press(&mut app, KeyCode::Enter).await;

        assert!(app.state.form.is_none());
        assert_eq!(toast(&app), Some("Closed months are read-only."));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let (mut app, requests) = app_showing_month(false).await;

        press(&mut app, KeyCode::Char('x')).await;
        assert_eq!(
            app.state.confirm.as_ref().map(|pending| pending.label.as_str()),
            Some("Salary")
        );
        press(&mut app, KeyCode::Char('n')).await;
        assert!(app.state.confirm.is_none());
        assert!(requests.lock().unwrap().is_empty());

        press(&mut app, KeyCode::Char('x')).await;
        press(&mut app, KeyCode::Char('y')).await;
        assert_eq!(toast(&app), Some("Deleted Salary."));
        let sent = requests.lock().unwrap().clone();
        assert_eq!(
            (sent[0].0.clone(), sent[0].1.as_str()),
            (Method::DELETE, "/api/months/7/income/11")
        );
    }

    #[test]
    fn wrong_password_reads_as_such_in_account_forms() {
        assert_eq!(
            form_message_for_error(FormKind::ClearData, ClientError::Unauthorized),
            "Wrong password."
        );
        assert_eq!(
            form_message_for_error(FormKind::Username, ClientError::Server("boom".into())),
            "Username may already be taken."
        );
        assert_eq!(
            form_message_for_error(FormKind::Retirement, ClientError::NotFound),
            "Not found."
        );
    }

    #[test]
    fn register_conflict_reads_as_taken_username() {
        assert_eq!(
            login_message_for_error(ClientError::Conflict("dup".into()), LoginMode::Register),
            "Username already exists."
        );
        assert_eq!(
            login_message_for_error(ClientError::Unauthorized, LoginMode::Login),
            "Invalid username or password."
        );
        assert_eq!(
            message_for_error(ClientError::Validation("bad goal".into())),
            "Validation error: bad goal"
        );
    }

    #[test]
    fn invalid_export_file_is_rejected_before_sending() {
        let dir = std::env::temp_dir().join(format!("payme-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let garbage = dir.join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            read_export(garbage.to_str().unwrap()),
            Err(AppError::Json(_))
        ));

        let future = dir.join("future.json");
        std::fs::write(
            &future,
            r#"{"version": 9, "fixed_expenses": [], "categories": [], "months": []}"#,
        )
        .unwrap();
        assert!(matches!(
            read_export(future.to_str().unwrap()),
            Err(AppError::Engine(_))
        ));

        let ok = dir.join("ok.json");
        std::fs::write(
            &ok,
            r#"{"version": 1, "fixed_expenses": [], "categories": [], "months": []}"#,
        )
        .unwrap();
        assert!(read_export(ok.to_str().unwrap()).is_ok());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
