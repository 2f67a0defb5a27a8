use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use collegium::config::database::init_storage;
use collegium::logging::init_logging;
use collegium::modules::IdentityService;
use collegium::state::{AppState, init_app_state};
use collegium_store::run_migrations;

#[derive(Parser)]
#[command(name = "collegium")]
#[command(about = "Collegium - administrative tools for the records core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create an administrator account
    CreateAdmin {
        /// Username for the new administrator
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => handle_migrate().await,
        Commands::CreateAdmin { username, password } => {
            handle_create_admin(username, password).await
        }
    }
}

async fn handle_migrate() {
    let storage = match init_storage().await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match run_migrations(storage.pool()).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("❌ Error applying migrations: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(username: Option<String>, password: Option<String>) {
    let state: AppState = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Use provided values or prompt interactively
    let username = username.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Username")
            .interact_text()
            .expect("Failed to read username")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match IdentityService::create_admin_account(
        state.storage.as_ref(),
        state.hasher.as_ref(),
        &state.credentials,
        &username,
        &password,
    )
    .await
    {
        Ok(account) => {
            println!("\n✅ Administrator account created!");
            println!("   Username: {}", account.username);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating administrator: {}", e);
            std::process::exit(1);
        }
    }
}
