use clap::Parser;
use fmtd::cli::{Cli, Commands};
use fmtd::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("fmtd={}", log_level)
            .parse()
            .unwrap_or_else(|_| "fmtd=info".parse().expect("fallback directive is valid")),
    );

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!("Configuration loaded from: {}", config_path.display());

    match cli.command {
        Commands::Init { path } => {
            fmtd::cli::commands::init(path)?;
        }
        Commands::Format { project_dir, args } => {
            fmtd::cli::commands::format(project_dir, args, &config)?;
        }
        Commands::Status => {
            fmtd::cli::commands::status(&config)?;
        }
        Commands::Version => {
            fmtd::cli::commands::version();
        }
    }

    Ok(())
}
