use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use siteadmin_core::ClientConfig;
use siteadmin_core::models::Role;

#[derive(Parser)]
#[command(name = "siteadmin", version, about = "Site administration panel from the terminal")]
pub struct Cli {
    /// API base URL (overrides `API_URL`).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for persisted credentials (overrides `SITEADMIN_STORAGE_DIR`).
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.storage_dir {
            config.storage_dir = dir.clone();
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SITEADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear persisted credentials.
    Logout,
    /// Show the signed-in administrator.
    Whoami,
    /// Check whether the session may open a screen path.
    Check { path: String },
    /// Project and application counters.
    Dashboard,
    /// Print a content collection as JSON.
    List { resource: ResourceKind },
    /// Delete a record by id.
    Delete { resource: ResourceKind, id: String },
    /// Mark a visitor application as read.
    MarkViewed {
        id: String,
        /// Mark as unread instead.
        #[arg(long)]
        unread: bool,
    },
    /// Create an administrator account (super admin only).
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SITEADMIN_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        /// `admin` or `superAdmin`.
        #[arg(long)]
        role: Option<Role>,
    },
    /// Mail a one-time password reset code.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Reset the password with a one-time code.
    ChangePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long, env = "SITEADMIN_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Print version.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Hero,
    About,
    Services,
    Stats,
    Projects,
    Workflow,
    Partners,
    Testimonials,
    ContactInfo,
    Socials,
    MapUrl,
    Applications,
    Languages,
    Users,
}

impl ResourceKind {
    /// Panel screen that manages this resource.
    pub fn screen(self) -> &'static str {
        match self {
            ResourceKind::Hero => "/hero",
            ResourceKind::About => "/about",
            ResourceKind::Services => "/services",
            ResourceKind::Stats => "/stats",
            ResourceKind::Projects => "/projects",
            ResourceKind::Workflow => "/workflow",
            ResourceKind::Partners => "/partners",
            ResourceKind::Testimonials => "/testimonials",
            ResourceKind::ContactInfo => "/contact-info",
            ResourceKind::Socials => "/socials",
            ResourceKind::MapUrl => "/map-url",
            ResourceKind::Applications => "/applications",
            ResourceKind::Languages => "/languages",
            ResourceKind::Users => "/users",
        }
    }
}
