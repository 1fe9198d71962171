//! MiniBank CLI - Main entry point

use clap::{Parser, Subcommand};
use minibank_rpc::{commands, AppContext};

#[derive(Parser)]
#[command(name = "minibank")]
#[command(about = "MiniBank - demo banking ledger", long_about = None)]
struct Cli {
    /// Database URL (ignored with --memory)
    #[arg(short, long, default_value = "sqlite://minibank.db")]
    database: String,

    /// Run against an in-memory store instead of the database
    #[arg(long)]
    memory: bool,

    /// Print JSON envelopes instead of human-readable output
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new account
    Register {
        /// Account holder's full name
        full_name: String,
        /// Email, unique across accounts
        email: String,
        /// Password for the demo credential store
        password: String,
    },

    /// Verify credentials and show the account
    Login {
        email: String,
        password: String,
    },

    /// Deposit funds into an account
    Deposit {
        /// 10-digit account number
        number: String,
        /// Amount in major units, e.g. 12.34
        amount: String,
        /// Optional journal description
        #[arg(long)]
        description: Option<String>,
    },

    /// Withdraw funds from an account
    Withdraw {
        /// 10-digit account number
        number: String,
        /// Amount in major units, e.g. 12.34
        amount: String,
        /// Optional journal description
        #[arg(long)]
        description: Option<String>,
    },

    /// Transfer funds between two accounts
    Transfer {
        /// Sender's 10-digit account number
        from: String,
        /// Recipient's 10-digit account number
        to: String,
        /// Amount in major units, e.g. 12.34
        amount: String,
        /// Optional journal description
        #[arg(long)]
        description: Option<String>,
    },

    /// Show the current balance of an account
    Balance {
        /// 10-digit account number
        number: String,
    },

    /// List an account's journal, most recent first
    History {
        /// 10-digit account number
        number: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let ctx = if cli.memory {
        AppContext::in_memory()
    } else {
        AppContext::open(&cli.database).await?
    };

    match cli.command {
        Commands::Register {
            full_name,
            email,
            password,
        } => {
            commands::register(&ctx, &full_name, &email, &password, cli.json).await?;
        }

        Commands::Login { email, password } => {
            commands::login(&ctx, &email, &password, cli.json).await?;
        }

        Commands::Deposit {
            number,
            amount,
            description,
        } => {
            commands::deposit(&ctx, &number, &amount, description, cli.json).await?;
        }

        Commands::Withdraw {
            number,
            amount,
            description,
        } => {
            commands::withdraw(&ctx, &number, &amount, description, cli.json).await?;
        }

        Commands::Transfer {
            from,
            to,
            amount,
            description,
        } => {
            commands::transfer(&ctx, &from, &to, &amount, description, cli.json).await?;
        }

        Commands::Balance { number } => {
            commands::balance(&ctx, &number, cli.json).await?;
        }

        Commands::History { number } => {
            commands::history(&ctx, &number, cli.json).await?;
        }
    }

    Ok(())
}
