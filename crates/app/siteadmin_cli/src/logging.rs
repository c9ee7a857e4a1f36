use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::Error;

const DEFAULT_FILTER: &str = "warn,siteadmin_core=info,siteadmin_cli=info";

/// Log to stderr; stdout carries command output.
pub fn init() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .finish()
        .try_init()?;

    Ok(())
}
