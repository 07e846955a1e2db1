//! Implementação dos comandos CLI do fmtd.

use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::engine::CommandLoader;
use crate::pipeline::{Daemon, ParsedRequestOptions};
use crate::types::config::Config;
use crate::FmtdResult;

/// Writes the default configuration file.
pub fn init(path: Option<PathBuf>) -> FmtdResult<()> {
    let config_path = path.unwrap_or_else(Config::default_path);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("fmtd initialized successfully!");
    println!("Configuration created at: {}", config_path.display());

    Ok(())
}

/// Executa uma requisição única pelo pipeline do daemon.
///
/// O texto vem de stdin (ou do arquivo posicional, quando informado sem
/// `--stdin`); o resultado formatado vai para stdout. O mtime informado
/// ao pipeline é o do diretório do projeto - num processo one-shot o
/// cache está sempre frio, mas o contrato de invalidação é o mesmo.
pub fn format(project_dir: Option<PathBuf>, args: Vec<String>, config: &Config) -> FmtdResult<()> {
    let project_dir = match project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let parsed = ParsedRequestOptions::parse(&args)?;
    let text = match parsed.target_path(&project_dir) {
        Some(path) if !parsed.stdin => std::fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mtime_ms = std::fs::metadata(&project_dir)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let loader = CommandLoader::new(config.engine.command.clone(), config.engine.args.clone());
    let mut daemon = Daemon::new(config, Arc::new(loader));

    let formatted = daemon.invoke(&project_dir, &args, &text, mtime_ms)?;
    print!("{}", formatted);

    Ok(())
}

/// Mostra o status do daemon e a disponibilidade do engine configurado.
pub fn status(config: &Config) -> FmtdResult<()> {
    let loader = CommandLoader::new(config.engine.command.clone(), config.engine.args.clone());
    let daemon = Daemon::new(config, Arc::new(loader));

    println!("fmtd: {}", daemon.status());
    println!("engine: {}", config.engine.command);

    match engine_version(&config.engine.command) {
        Some(version) => println!("engine version: {}", version),
        None => println!("engine version: not available on PATH"),
    }

    Ok(())
}

/// Versão do engine global, se disponível.
fn engine_version(command: &str) -> Option<String> {
    let output = Command::new(command).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
}

/// Mostra a versão do fmtd.
pub fn version() {
    println!("fmtd {}", env!("CARGO_PKG_VERSION"));
}
