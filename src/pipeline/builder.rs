//! Construção de entradas do cache de projetos.

use std::path::Path;
use std::sync::Arc;

use crate::cache::CacheEntry;
use crate::engine::{EngineLoader, ModuleRegistry, ResolveOptions};
use crate::FmtdResult;

/// Constrói uma [`CacheEntry`] fresca para um diretório de projeto.
pub struct EntryBuilder {
    loader: Arc<dyn EngineLoader>,
    registry: Arc<ModuleRegistry>,
    ignore_file_name: String,
}

impl EntryBuilder {
    /// Cria um builder sobre o loader e o registro de módulos do daemon.
    pub fn new(
        loader: Arc<dyn EngineLoader>,
        registry: Arc<ModuleRegistry>,
        ignore_file_name: String,
    ) -> Self {
        Self {
            loader,
            registry,
            ignore_file_name,
        }
    }

    /// Resolve e carrega o engine do projeto e sua configuração.
    ///
    /// A resolução local pode falhar - é o caso esperado de módulo não
    /// instalado no projeto, recuperado pelo fallback global, nunca um
    /// erro. Carregar o módulo registra seus caminhos no
    /// [`ModuleRegistry`], e pode puxar código adicional (plugins); é
    /// exatamente por isso que a invalidação purga por prefixo antes de
    /// reconstruir.
    pub fn build(&self, project_dir: &Path) -> FmtdResult<Arc<CacheEntry>> {
        let module = self
            .loader
            .resolve(project_dir)
            .unwrap_or_else(|| self.loader.resolve_global());

        let engine = self.loader.load(&module, &self.registry)?;

        let config_file = engine.resolve_config_file(project_dir)?;
        let has_config = config_file.is_some();

        // Sempre relê a configuração do disco; integra .editorconfig
        let resolved_options = engine
            .resolve_config(
                project_dir,
                &ResolveOptions {
                    use_cache: false,
                    editorconfig: true,
                },
            )?
            .unwrap_or_default();

        // A existência do ignore-file não é verificada aqui
        let ignore_path = project_dir.join(&self.ignore_file_name);

        tracing::debug!(
            project_dir = %project_dir.display(),
            has_config,
            config_file = ?config_file,
            options = resolved_options.len(),
            local_module = module.path.is_some(),
            "Built cache entry"
        );

        Ok(Arc::new(CacheEntry::new(
            engine,
            resolved_options,
            ignore_path,
            has_config,
        )))
    }
}
