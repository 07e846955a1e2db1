//! Registro process-wide de módulos carregados.
//!
//! Substitui o estado global oculto de um cache de módulos do runtime por
//! uma tabela explícita e injetável, com remoção por prefixo de caminho.
//! É o mecanismo por trás da invalidação: antes de reconstruir a entrada
//! de um projeto possivelmente alterado, o pipeline purga os módulos
//! carregados sob aquele diretório para que a resolução seguinte carregue
//! cópias frescas (engine local e plugins).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Tabela de módulos carregados, indexada pelo caminho resolvido.
///
/// O valor é a geração do carregamento: cresce a cada `record`, o que
/// permite distinguir um módulo recarregado de um nunca purgado.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Mutex<HashMap<PathBuf, u64>>,
    generation: Mutex<u64>,
}

impl ModuleRegistry {
    /// Cria um registro vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um módulo carregado. Retorna a geração do carregamento.
    pub fn record(&self, path: impl Into<PathBuf>) -> u64 {
        let mut gen = self.lock_generation();
        *gen += 1;
        let current = *gen;
        drop(gen);

        self.lock_modules().insert(path.into(), current);
        current
    }

    /// Verifica se um caminho está registrado.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock_modules().contains_key(path)
    }

    /// Geração registrada para um caminho, se carregado.
    pub fn generation_of(&self, path: &Path) -> Option<u64> {
        self.lock_modules().get(path).copied()
    }

    /// Número de módulos registrados.
    pub fn len(&self) -> usize {
        self.lock_modules().len()
    }

    /// Verifica se o registro está vazio.
    pub fn is_empty(&self) -> bool {
        self.lock_modules().is_empty()
    }

    /// Remove todo módulo cujo caminho esteja sob `project_dir`.
    ///
    /// Módulos de fora do diretório (runtime do daemon, fallbacks globais)
    /// não são afetados: purgá-los descartaria estado de projetos não
    /// relacionados que compartilham o processo. A comparação é por
    /// componentes de caminho, então `/proj` não casa com `/proj2`.
    ///
    /// Retorna quantos módulos foram removidos.
    pub fn purge_prefix(&self, project_dir: &Path) -> usize {
        let mut modules = self.lock_modules();
        let before = modules.len();
        modules.retain(|path, _| !path.starts_with(project_dir));
        before - modules.len()
    }

    fn lock_modules(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, u64>> {
        self.modules.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }
}
