use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::error;

use taskboard::auth::{IdentityProvider, LocalIdentityProvider};
use taskboard::board::Board;
use taskboard::commands::*;
use taskboard::config::{AppConfig, GlobalArgs};
use taskboard::error::Result;
use taskboard::logging::init_logging;
use taskboard::models::{Category, TaskId};
use taskboard::storage::load_prefs;
use taskboard::store::{FileTaskStore, HttpTaskStore, TaskStore};
use taskboard::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Terminal task board: To-Do, In Progress, Done", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks grouped by category
    List,
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Category: todo, in-progress or done
        #[arg(short, long, default_value = "todo")]
        category: Category,
        /// Due date in YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<Category>,
        /// New due date (empty to clear)
        #[arg(long)]
        due: Option<String>,
    },
    /// Remove a task
    Remove { id: String },
    /// Move a task into a category
    Move {
        id: String,
        category: Category,
        /// Position in the target column (default: end)
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Move a task within its category
    Reorder {
        category: Category,
        /// Current position
        from: usize,
        /// New position
        to: usize,
    },
    /// Create an account and sign in
    Signup { email: String, password: String },
    /// Sign in
    Login {
        #[arg(required_unless_present = "federated")]
        email: Option<String>,
        #[arg(required_unless_present = "federated")]
        password: Option<String>,
        /// Use the federated identity provider instead of a password
        #[arg(long, conflicts_with_all = ["email", "password"])]
        federated: bool,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Send a password reset email
    ResetPassword { email: String },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn build_store(config: &AppConfig) -> Box<dyn TaskStore> {
    if config.offline {
        Box::new(FileTaskStore::open_default())
    } else {
        Box::new(HttpTaskStore::new(config.api_url.as_str()))
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let identity = Arc::new(LocalIdentityProvider::open_default()?);

    let command = match cli.command {
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskboard", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Signup { email, password }) => return cmd_signup(identity.as_ref(), &email, &password).await,
        Some(Commands::Login {
            email: Some(email),
            password: Some(password),
            federated: false,
        }) => return cmd_login(identity.as_ref(), &email, &password).await,
        Some(Commands::Login { .. }) => {
            let user = identity.sign_in_with_federated_provider().await?;
            println!("Signed in as {}.", user.email);
            return Ok(());
        }
        Some(Commands::Logout) => return cmd_logout(identity.as_ref()).await,
        Some(Commands::Whoami) => return cmd_whoami(identity.as_ref()),
        Some(Commands::ResetPassword { email }) => return cmd_reset_password(identity.as_ref(), &email).await,
        other => other,
    };

    let mut board = Board::new(build_store(&config), config.board_options());

    match command {
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(board, identity, load_prefs()).await {
                eprintln!("Error running TUI: {}", e);
            }
            return Ok(());
        }
        _ => {}
    }

    require_user(identity.as_ref())?;
    match command {
        Some(Commands::List) => cmd_list(&mut board).await,
        Some(Commands::Add { title, description, category, due }) => {
            let fields = TaskFields {
                title: Some(title),
                description: Some(description),
                category: Some(category),
                due,
            };
            cmd_add(&mut board, fields).await.map(|_| ())
        }
        Some(Commands::Edit { id, title, description, category, due }) => {
            let fields = TaskFields { title, description, category, due };
            cmd_edit(&mut board, &TaskId::from(id), fields).await.map(|_| ())
        }
        Some(Commands::Remove { id }) => cmd_remove(&mut board, &TaskId::from(id)).await,
        Some(Commands::Move { id, category, index }) => cmd_move(&mut board, &TaskId::from(id), category, index).await,
        Some(Commands::Reorder { category, from, to }) => cmd_reorder(&mut board, category, from, to).await,
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
