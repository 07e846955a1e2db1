//! Tipos de erro do fmtd.

use thiserror::Error;

/// Tipo de resultado padrão do fmtd.
pub type FmtdResult<T> = Result<T, FmtdError>;

/// Erros possíveis no fmtd.
#[derive(Error, Debug)]
pub enum FmtdError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Falha ao carregar o engine '{0}': {1}")]
    EngineLoad(String, String),

    #[error("Engine '{0}' falhou: {1}")]
    EngineFailed(String, String),

    #[error("Requisição inválida: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl FmtdError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de requisição inválida.
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
