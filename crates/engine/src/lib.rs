//! Client-side derived state for the budgeting dashboard.
//!
//! The server computes month totals and per-category spending; this crate
//! turns those numbers into what the user looks at: the variance breakdown,
//! the income shortfall, the savings projection, month navigation and the
//! month-close rule. Everything here is pure and synchronous, and is
//! recomputed in full whenever a summary is reloaded.

pub use budget::{BudgetLine, LineClass, MonthTotals, lines_from_summary};
pub use calendar::{MonthNav, can_close, last_day_of_month, month_label, month_name};
pub use currency::Currency;
pub use error::EngineError;
pub use export::{EXPORT_VERSION, ExportStats, normalize_label};
pub use money::Money;
pub use savings::{
    SavingsCommit, SavingsEditor, SavingsField, SavingsMode, SavingsProjection, SavingsState,
};
pub use snapshot::{LoadTicket, Snapshots};
pub use trends::{CategoryTrend, Change, ChangeSize, StatsView, TrendPoint};
pub use variance::{BudgetAnalysis, IncomeCheck, LineVariance, Outlook, VarianceReport};

pub mod export;

mod budget;
mod calendar;
mod currency;
mod error;
mod money;
mod savings;
mod snapshot;
mod trends;
mod variance;
