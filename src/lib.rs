//! # fmtd
//!
//! Daemon de formatação com cache por projeto.
//!
//! O fmtd mantém, por diretório de projeto, um engine de formatação caro
//! de inicializar e sua configuração resolvida, para que requisições
//! repetidas (um editor formatando a cada save) não redescubram arquivos
//! de configuração nem recarreguem o engine do disco a cada chamada.
//!
//! ## Módulos
//!
//! - [`cache`] - Cache LRU de projetos
//! - [`engine`] - Seam do engine de formatação e registro de módulos
//! - [`pipeline`] - Pipeline de requisições (staleness, merge, delegação)
//! - [`status`] - Relatório de status
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

pub mod cache;
pub mod cli;
pub mod engine;
pub mod pipeline;
pub mod status;
pub mod types;

pub use pipeline::Daemon;
pub use types::config::Config;
pub use types::errors::{FmtdError, FmtdResult};
