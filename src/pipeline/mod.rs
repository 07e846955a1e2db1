//! Pipeline de requisições do daemon.
//!
//! - [`Daemon`] - ponto de entrada por chamada ([`Daemon::invoke`])
//! - [`EntryBuilder`] - construção de entradas do cache
//! - [`ParsedRequestOptions`] / [`merge_options`] - opções por requisição

mod builder;
mod daemon;
mod options;

pub use builder::EntryBuilder;
pub use daemon::Daemon;
pub use options::{merge_options, ParsedRequestOptions, CLI_OVERRIDE, FILE_OVERRIDE};
