// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use expense_tracker::{
    format_money, Config, EditFields, KeyValueStore, Kind, MemoryStore, NewTransaction, Session,
    SqliteStore, DEFAULT_USER_NAME,
};
use log::info;
use std::fs::OpenOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expense-tracker")]
#[command(about = "Personal income and expense tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite file holding the saved data
    #[arg(long, global = true, env = "EXPENSE_TRACKER_DB")]
    db: Option<PathBuf>,

    /// Keep data in memory only (nothing is saved)
    #[arg(long, global = true)]
    memory: bool,

    /// Display name used until one is saved
    #[arg(long, global = true, env = "EXPENSE_TRACKER_NAME", default_value = DEFAULT_USER_NAME)]
    name: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Ui,

    /// Record a transaction
    Add {
        /// income or expense
        #[arg(short, long)]
        kind: Kind,

        /// Category from the kind's set (see `categories`)
        #[arg(short, long)]
        category: String,

        /// Amount, e.g. 1500 or 12.50
        #[arg(short, long)]
        amount: String,

        description: String,
    },

    /// List transactions, newest first
    List,

    /// Totals, balance and expenses by category
    Summary,

    /// Change description, category and amount of a transaction
    Edit {
        id: i64,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Delete a transaction
    Delete { id: i64 },

    /// Change the display name
    Rename { name: String },

    /// Delete every transaction and restore the default name
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Show the categories available for each kind
    Categories,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config {
        db_path: cli.db.clone(),
        memory: cli.memory,
        initial_name: cli.name.clone(),
    };
    let command = cli.command.unwrap_or(Commands::Ui);

    init_logging(&config, matches!(command, Commands::Ui))?;

    let store: Box<dyn KeyValueStore> = if config.memory {
        info!("using in-memory store");
        Box::new(MemoryStore::new())
    } else {
        Box::new(SqliteStore::open(&config.resolve_db_path())?)
    };
    let mut session = Session::open(store, &config.initial_name)?;

    match command {
        Commands::Ui => run_ui_mode(session)?,
        Commands::Add {
            kind,
            category,
            amount,
            description,
        } => {
            let input = NewTransaction::new(description, amount, kind, category);
            match session.add_transaction(input) {
                Some(id) => println!("✓ Added transaction {}", id),
                None => {
                    return Err(anyhow!(
                        "Transaction not added: description, amount and a {} category are required (see `categories`)",
                        kind
                    ))
                }
            }
        }
        Commands::List => print_list(&session),
        Commands::Summary => print_summary(&session),
        Commands::Edit {
            id,
            description,
            category,
            amount,
        } => {
            let current = session
                .ledger()
                .get(id)
                .map(EditFields::from_transaction)
                .ok_or_else(|| anyhow!("No transaction with id {}", id))?;
            let fields = EditFields {
                description: description.unwrap_or(current.description),
                amount: amount.unwrap_or(current.amount),
                category: category.unwrap_or(current.category),
            };
            if session.save_edit(id, &fields) {
                println!("✓ Updated transaction {}", id);
            } else {
                return Err(anyhow!("Transaction {} not updated: invalid values", id));
            }
        }
        Commands::Delete { id } => {
            if session.delete_transaction(id) {
                println!("✓ Deleted transaction {}", id);
            } else {
                println!("⚠️  No transaction with id {}", id);
            }
        }
        Commands::Rename { name } => {
            if session.rename_user(&name) {
                println!("✓ Name set to {}", session.user_name());
            } else {
                println!("⚠️  Name unchanged");
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                eprintln!("❌ This deletes every transaction. Re-run with --yes to confirm.");
                std::process::exit(1);
            }
            session.reset_all();
            println!("🔄 All data reset");
        }
        Commands::Categories => print_categories(),
    }

    Ok(())
}

/// env_logger from RUST_LOG (default warn); the TUI logs to a file so the
/// alternate screen stays intact
fn init_logging(config: &Config, tui: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if tui && cfg!(feature = "tui") && !config.memory {
        let log_path = config.log_path();
        if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else if tui {
        // In-memory TUI runs have nowhere to write logs
        builder.filter_level(log::LevelFilter::Off);
    }

    builder.init();
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode<S: KeyValueStore>(session: Session<S>) -> Result<()> {
    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)?;
    println!("\n✅ Hasta luego, {}!", app.session.user_name());
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode<S: KeyValueStore>(_session: Session<S>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the subcommands: expense-tracker --help");
    std::process::exit(1);
}

fn print_list<S: KeyValueStore>(session: &Session<S>) {
    let transactions = session.transactions();
    if transactions.is_empty() {
        println!("¡Comienza agregando tu primera transacción!");
        return;
    }

    println!(
        "{:<15} {:<11} {:<8} {:<30} {:>14}  {}",
        "ID", "Fecha", "Tipo", "Categoría", "Monto", "Descripción"
    );
    println!("{}", "━".repeat(100));
    for tx in transactions {
        println!(
            "{:<15} {:<11} {:<8} {:<30} {:>14}  {}",
            tx.id,
            tx.date,
            tx.kind.label(),
            tx.category,
            tx.signed_display(),
            tx.description
        );
    }
}

fn print_summary<S: KeyValueStore>(session: &Session<S>) {
    let summary = session.summary();

    println!("💰 Control de Gastos de {}", session.user_name());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📈 Ingresos:       ${}", format_money(summary.total_income));
    println!("📉 Gastos:         ${}", format_money(summary.total_expense));
    println!("💵 Balance:        ${}", format_money(summary.balance));
    println!("🗓️  Transacciones:  {}", summary.transaction_count);
    println!("\n{}", session.motivational_message());

    if !summary.categories.is_empty() {
        println!("\n📊 Gastos por Categoría");
        for c in &summary.categories {
            println!(
                "   {:<30} ${:>12}  {:>5.1}% del total",
                c.category,
                format_money(c.amount),
                c.percentage
            );
        }
    }
}

fn print_categories() {
    for kind in [Kind::Income, Kind::Expense] {
        println!("{} ({}):", kind.label(), kind);
        for category in kind.categories() {
            println!("   {}", category);
        }
    }
}
