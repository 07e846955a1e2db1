//! Interface de linha de comando do fmtd.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fmtd - daemon de formatação com cache por projeto.
#[derive(Parser, Debug)]
#[command(name = "fmtd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Escreve a configuração padrão.
    Init {
        /// Destino (padrão: local de configuração do usuário).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Formata uma requisição única pelo pipeline do daemon.
    Format {
        /// Diretório do projeto (padrão: diretório atual).
        #[arg(short, long)]
        project_dir: Option<PathBuf>,

        /// Argumentos repassados ao pipeline, no vocabulário da ferramenta.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Mostra o status do daemon e do engine configurado.
    Status,

    /// Mostra versão.
    Version,
}
