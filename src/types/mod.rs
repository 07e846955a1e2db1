//! Tipos compartilhados do fmtd.

pub mod config;
pub mod errors;
