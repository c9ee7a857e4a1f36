// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use shell::Shell;
use siteadmin_core::models::RegisterRequest;

mod cli;
mod logging;
mod shell;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();
    let config = args.client_config();

    let start = match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Login { .. } | Commands::Logout => "/login",
        Commands::ForgotPassword { .. } => "/forgot-password",
        Commands::ChangePassword { .. } => "/change-password",
        _ => "/",
    };
    let shell = Shell::open(&config, start)?;

    let result = match args.command {
        Commands::Login { email, password } => shell.login(&email, &password).await,
        Commands::Logout => shell.logout().await,
        Commands::Whoami => shell.whoami().await,
        Commands::Check { path } => shell.check(&path).await,
        Commands::Dashboard => shell.dashboard().await,
        Commands::List { resource } => shell.list(resource).await,
        Commands::Delete { resource, id } => shell.delete(resource, &id).await,
        Commands::MarkViewed { id, unread } => shell.mark_viewed(&id, !unread).await,
        Commands::Register {
            full_name,
            email,
            password,
            phone,
            role,
        } => {
            shell
                .register(RegisterRequest {
                    full_name,
                    email,
                    password,
                    phone,
                    role,
                })
                .await
        }
        Commands::ForgotPassword { email } => shell.forgot_password(&email).await,
        Commands::ChangePassword {
            email,
            otp,
            new_password,
        } => shell.change_password(&email, &otp, &new_password).await,
        Commands::Version => Ok(()),
    };

    shell.finish(result)
}
