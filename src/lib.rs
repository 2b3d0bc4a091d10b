// Expense Tracker - Core Library
// Ledger, aggregates and persistence shared by the TUI and the CLI

pub mod aggregate;
pub mod category;
pub mod config;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod transaction;

// Re-export commonly used types
pub use aggregate::{
    balance, category_breakdown, expenses_by_category, motivational_message, summarize,
    total_expense, total_income, CategoryTotal, Summary,
};
pub use category::{
    category_index, is_valid_category, Kind, EXPENSE_CATEGORIES, INCOME_CATEGORIES,
};
pub use config::Config;
pub use ledger::Ledger;
pub use session::{EditDraft, Session, DEFAULT_USER_NAME};
pub use storage::{
    KeyValueStore, MemoryStore, Persistence, SqliteStore, StoredState, TRANSACTIONS_KEY,
    USERNAME_KEY,
};
pub use transaction::{format_money, parse_amount, EditFields, NewTransaction, Transaction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
