//! avalon - a source-based package manager

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use avalon_cli::ui::Console;
use avalon_cli::{Cli, Commands, cmd, ops};
use avalon_core::{MetadataResolver, Paths};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; --debug raises the filter over the environment.
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = Paths::resolve()
        .context("could not determine home directory; set AVALON_HOME to override")?;
    paths.ensure()?;

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(avalon_core::USER_AGENT)
        .build()?;

    let mut ctx = ops::Context::new(
        paths,
        MetadataResolver::new(client),
        Console::new(cli.quiet),
        ops::Flags {
            fresh: cli.fresh,
            force: cli.force,
            update: cli.update,
            noinstall: cli.noinstall,
        },
    );

    match cli.command {
        Commands::Install { targets } => cmd::install::install(&mut ctx, &targets),
        Commands::Uninstall { packages } => cmd::uninstall::uninstall(&mut ctx, &packages),
        Commands::Update { packages } => cmd::update::update(&mut ctx, &packages),
        Commands::Redobin { package } => cmd::redobin::redobin(&mut ctx, &package),
        Commands::List => {
            cmd::list::list(&ctx);
            Ok(())
        }
        Commands::Refresh => cmd::refresh::refresh(&ctx),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
