//! O pipeline de requisições do daemon.
//!
//! Ponto de entrada por chamada: busca ou constrói a entrada do cache,
//! decide staleness, decide se deve formatar (sem configuração ou arquivo
//! ignorado → devolve o texto intocado), mescla opções por precedência e
//! delega ao engine.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::builder::EntryBuilder;
use super::options::{merge_options, ParsedRequestOptions};
use crate::cache::ProjectCache;
use crate::engine::{EngineLoader, FileInfoRequest, ModuleRegistry};
use crate::types::config::Config;
use crate::FmtdResult;

/// Daemon de formatação: cache de projetos + pipeline de requisições.
pub struct Daemon {
    cache: ProjectCache,
    builder: EntryBuilder,
    registry: Arc<ModuleRegistry>,
}

impl Daemon {
    /// Cria um daemon sobre o loader de engine informado.
    pub fn new(config: &Config, loader: Arc<dyn EngineLoader>) -> Self {
        let registry = Arc::new(ModuleRegistry::new());
        let builder = EntryBuilder::new(
            loader,
            registry.clone(),
            config.engine.ignore_file_name(),
        );

        Self {
            cache: ProjectCache::new(config.cache.capacity),
            builder,
            registry,
        }
    }

    /// Atende uma requisição de formatação.
    ///
    /// `mtime_ms` é o sinal de invalidação do caller: o momento em que os
    /// arquivos do projeto (configuração, plugins) podem ter mudado pela
    /// última vez. O daemon confia nesse sinal e nunca consulta o
    /// filesystem por mudanças entre requisições. Um `mtime_ms`
    /// estritamente maior que a última invocação da entrada dispara purge
    /// dos módulos do projeto e reconstrução.
    ///
    /// Erros do engine propagam intactos; os únicos retornos "sem formato"
    /// são os dois curto-circuitos documentados (sem configuração, arquivo
    /// ignorado), que devolvem o texto de entrada inalterado.
    pub fn invoke<S: AsRef<str>>(
        &mut self,
        project_dir: &Path,
        args: &[S],
        text: &str,
        mtime_ms: i64,
    ) -> FmtdResult<String> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "invoke",
            %request_id,
            project_dir = %project_dir.display(),
        );
        let _guard = span.enter();

        // A resolução de configuração/ignore do engine é sensível ao
        // diretório de trabalho
        std::env::set_current_dir(project_dir)?;

        let key = project_dir.to_string_lossy().into_owned();
        let entry = match self.cache.get(&key) {
            Some(entry) if entry.is_stale(mtime_ms) => {
                let purged = self.registry.purge_prefix(project_dir);
                tracing::debug!(
                    mtime_ms,
                    last_invocation_ms = entry.last_invocation_ms(),
                    purged,
                    "Entry stale; rebuilding"
                );
                let rebuilt = self.builder.build(project_dir)?;
                self.cache.insert(key, rebuilt)
            }
            Some(entry) => {
                tracing::debug!("Cache hit");
                entry
            }
            None => {
                tracing::debug!("Cache miss; building entry");
                let built = self.builder.build(project_dir)?;
                self.cache.insert(key, built)
            }
        };

        // Recência de uso para o bookkeeping do cache, não frescor de
        // configuração: atualiza antes de qualquer curto-circuito
        entry.touch(Utc::now().timestamp_millis());

        // Sem arquivo de configuração, o projeto não optou por formatação
        if !entry.has_config {
            tracing::debug!("No configuration file; returning input unchanged");
            return Ok(text.to_string());
        }

        let parsed = ParsedRequestOptions::parse(args)?;
        tracing::debug!(
            precedence = %parsed.config_precedence,
            options = parsed.options.len(),
            "Parsed request options"
        );

        if let Some(target) = parsed.target_path(project_dir) {
            let info = entry.engine.file_info(
                &target,
                &FileInfoRequest {
                    ignore_path: entry.ignore_path.clone(),
                    plugin_search_dirs: parsed.plugin_search_dirs.clone(),
                    plugins: parsed.plugins.clone(),
                },
            )?;
            tracing::debug!(
                target = %target.display(),
                ignored = info.ignored,
                parser = ?info.inferred_parser,
                "Resolved file info"
            );

            if info.ignored {
                return Ok(text.to_string());
            }
        }

        let mut merged = merge_options(
            &parsed.config_precedence,
            &entry.resolved_options,
            &parsed.options,
        );

        // Com stdin + caminho explícito, a inferência de linguagem do
        // engine deve usar o caminho real, vença quem vencer o merge
        if parsed.stdin {
            if let Some(path) = parsed.stdin_filepath.as_ref().or(parsed.file.as_ref()) {
                merged.insert(
                    "filepath".to_string(),
                    Value::String(path.to_string_lossy().into_owned()),
                );
            }
        }

        tracing::debug!(merged = merged.len(), "Delegating to engine");
        entry.engine.format(text, &merged)
    }

    /// Frase de status derivada apenas do número de projetos em cache.
    pub fn status(&self) -> String {
        crate::status::report(&self.cache)
    }

    /// Acesso de leitura ao cache de projetos, para diagnóstico do host.
    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    /// Acesso de leitura ao registro de módulos, para diagnóstico do host.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}
