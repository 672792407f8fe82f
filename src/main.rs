use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use expense_tracker::{init_logging, parse_expense_id, Config, ExpenseRepository, NewExpense, Store};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "expense-tracker", version, about = "Record expenses and print summaries")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new expense
    Add {
        title: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        category: String,
        /// Date in YYYY-MM-DD format
        date: String,
    },
    /// Print every expense
    List,
    /// Print the number of stored expenses
    Count,
    /// Delete an expense by id
    Delete { id: String },
    /// Print totals grouped by category or month
    Summary {
        #[arg(value_enum)]
        by: SummaryKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SummaryKind {
    Category,
    Monthly,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.config.log_level, cli.config.log_json).map_err(|e| anyhow!(e))?;

    let store = Store::open(&cli.config.database)
        .with_context(|| format!("Failed to open database {}", cli.config.database))?;
    let repo = ExpenseRepository::new(store);

    match cli.command {
        Command::Add {
            title,
            amount,
            category,
            date,
        } => {
            let input = NewExpense::parse(&title, amount, &category, &date)
                .map_err(|errors| anyhow!("invalid expense: {}", errors))?;
            print_json(&repo.create(input)?)
        }
        Command::List => print_json(&repo.list()?),
        Command::Count => print_json(&repo.count()?),
        Command::Delete { id } => {
            let id = parse_expense_id(&id).map_err(|errors| anyhow!("{}", errors))?;
            print_json(&repo.delete(id)?)
        }
        Command::Summary { by } => match by {
            SummaryKind::Category => print_json(&repo.category_summary()?),
            SummaryKind::Monthly => print_json(&repo.monthly_summary()?),
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
