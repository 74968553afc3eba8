//! nfcpath CLI Entry Point

use clap::Parser;

use nfcpath_cli::{config_path, execute, load_config, log_config, Cli};
use nfcpath_core::observe::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(config_path(&cli.command))?;
    init_logging(&log_config(&cli, &config));
    tracing::debug!(?config, "configuration resolved");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, config, &mut out)
}
