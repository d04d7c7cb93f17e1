use clap::Parser;

use pollcast::cli::{self, Cli, Command, ConfigCommand};
use pollcast::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let command = cli.command.unwrap_or(Command::Console);

    match command {
        Command::Version => {
            cli::handle_version();
            return Ok(());
        }
        Command::Config(ConfigCommand::Path) => {
            cli::handle_config_path(cli.config.as_deref());
            return Ok(());
        }
        Command::Config(ConfigCommand::Schema) => return cli::handle_config_schema(),
        _ => {}
    }

    let cfg = cli::load_config(cli.config.as_deref())?;
    logging::init_logging(&cfg.logging)?;

    match command {
        Command::Console => cli::handle_console(&cfg).await,
        Command::Demo { window } => cli::handle_demo(&cfg, window).await,
        Command::Config(ConfigCommand::Show) => cli::handle_config_show(&cfg),
        Command::Config(_) | Command::Version => Ok(()),
    }
}
