use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use issuesmith::cli::{self, Cli};
use issuesmith::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Cli::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Override repository path if specified on command line
  if let Some(repo_path) = args.repo_path {
    config.repo_path = Some(repo_path);
  }

  let _guard = init_logging(args.verbose, config.log_file.as_deref())?;

  cli::run(args.command, config).await
}

/// RUST_LOG wins over `-v`. Logs go to stderr, or to `log_file` when set.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
    0 => EnvFilter::new("issuesmith=warn"),
    1 => EnvFilter::new("issuesmith=info"),
    _ => EnvFilter::new("issuesmith=debug"),
  });

  let Some(path) = log_file else {
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_target(false)
      .with_writer(std::io::stderr)
      .init();
    return Ok(None);
  };

  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_ansi(false)
    .with_writer(writer)
    .init();

  Ok(Some(guard))
}
