//! Seam do engine de formatação.
//!
//! O engine é tratado como uma capability opaca com quatro operações
//! ([`FormatEngine`]); o cache e o pipeline nunca dependem de um engine
//! concreto, então engines alternativos ou dublês de teste podem ser
//! substituídos sem tocar na lógica de cache/invalidação.
//!
//! - [`FormatEngine`] - as quatro operações consumidas pelo pipeline
//! - [`EngineLoader`] - resolução de módulo por projeto, com fallback global
//! - [`ModuleRegistry`] - tabela process-wide de módulos carregados
//! - [`CommandEngine`] - engine concreto sobre uma CLI externa

mod command;
mod registry;

pub use command::{CommandEngine, CommandLoader};
pub use registry::ModuleRegistry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::FmtdResult;

/// Mapa de opções nome canônico → valor.
pub type OptionMap = serde_json::Map<String, serde_json::Value>;

/// Opções da resolução de configuração.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Permite ao engine cachear arquivos de configuração já lidos.
    pub use_cache: bool,

    /// Integra opções de um `.editorconfig`, quando presente.
    pub editorconfig: bool,
}

/// Parâmetros da consulta de informações de arquivo.
#[derive(Debug, Clone, Default)]
pub struct FileInfoRequest {
    /// Ignore-file a considerar (pode não existir).
    pub ignore_path: PathBuf,

    /// Diretórios de busca de plugins informados na requisição.
    pub plugin_search_dirs: Vec<String>,

    /// Plugins informados na requisição.
    pub plugins: Vec<String>,
}

/// Informações sobre um arquivo alvo.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// O arquivo é coberto pelo ignore-file.
    pub ignored: bool,

    /// Parser inferido a partir do caminho, se algum.
    pub inferred_parser: Option<String>,
}

/// As quatro operações do engine de formatação.
///
/// Todas as operações são bloqueantes: o pipeline é síncrono por design
/// e não suspende internamente.
pub trait FormatEngine: Send + Sync {
    /// Resolve o arquivo de configuração mais próximo de `dir`.
    ///
    /// `Ok(None)` significa "nenhuma configuração encontrada" - um estado
    /// válido, não uma falha.
    fn resolve_config_file(&self, dir: &Path) -> FmtdResult<Option<PathBuf>>;

    /// Resolve o conjunto de opções mesclado para `dir`.
    fn resolve_config(&self, dir: &Path, opts: &ResolveOptions) -> FmtdResult<Option<OptionMap>>;

    /// Consulta informações do arquivo alvo (no mínimo, se está ignorado).
    fn file_info(&self, path: &Path, req: &FileInfoRequest) -> FmtdResult<FileInfo>;

    /// Formata `text` com as opções mescladas.
    ///
    /// Erros do engine propagam ao caller sem tradução.
    fn format(&self, text: &str, options: &OptionMap) -> FmtdResult<String>;
}

/// Módulo de engine resolvido, antes do carregamento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineModule {
    /// Caminho do módulo resolvido localmente; `None` para o fallback
    /// global (resolvido pelo processo, fora de qualquer projeto).
    pub path: Option<PathBuf>,

    /// Nome da ferramenta.
    pub tool: String,
}

impl EngineModule {
    /// Módulo resolvido localmente sob um diretório de projeto.
    pub fn local(path: impl Into<PathBuf>, tool: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            tool: tool.into(),
        }
    }

    /// Módulo do fallback global.
    pub fn global(tool: impl Into<String>) -> Self {
        Self {
            path: None,
            tool: tool.into(),
        }
    }
}

/// Resolução e carregamento de módulos de engine.
pub trait EngineLoader: Send + Sync {
    /// Tenta resolver o engine instalado sob `project_dir`.
    ///
    /// `None` é o caso esperado e recuperável de módulo não instalado
    /// localmente; nunca deve virar erro.
    fn resolve(&self, project_dir: &Path) -> Option<EngineModule>;

    /// Resolve o engine visível ao próprio processo do daemon.
    fn resolve_global(&self) -> EngineModule;

    /// Carrega um módulo resolvido.
    ///
    /// Efeito colateral: registra os caminhos do módulo em `registry`,
    /// para que a invalidação por projeto saiba o que purgar.
    fn load(
        &self,
        module: &EngineModule,
        registry: &ModuleRegistry,
    ) -> FmtdResult<Arc<dyn FormatEngine>>;
}
