//! Cache LRU de entradas por diretório de projeto.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use lru::LruCache;

use crate::engine::{FormatEngine, OptionMap};

/// Capacidade padrão do cache de projetos.
pub const CACHE_CAPACITY: usize = 10;

/// Entrada do cache: engine carregado + configuração resolvida de um projeto.
///
/// Entradas são imutáveis após a construção, exceto pelo timestamp da
/// última invocação.
pub struct CacheEntry {
    /// Handle do engine de formatação carregado para este projeto.
    pub engine: Arc<dyn FormatEngine>,

    /// Opções resolvidas do arquivo de configuração mais próximo.
    pub resolved_options: OptionMap,

    /// Caminho do ignore-file esperado na raiz do projeto.
    /// A existência não é verificada na construção.
    pub ignore_path: PathBuf,

    /// Se um arquivo de configuração foi encontrado na construção.
    pub has_config: bool,

    /// Última invocação bem-sucedida, em millis desde a epoch (0 = nunca).
    last_invocation_ms: AtomicI64,
}

impl CacheEntry {
    /// Cria uma nova entrada, com o timestamp de invocação zerado.
    pub fn new(
        engine: Arc<dyn FormatEngine>,
        resolved_options: OptionMap,
        ignore_path: PathBuf,
        has_config: bool,
    ) -> Self {
        Self {
            engine,
            resolved_options,
            ignore_path,
            has_config,
            last_invocation_ms: AtomicI64::new(0),
        }
    }

    /// Timestamp da última invocação (0 = nunca usada).
    pub fn last_invocation_ms(&self) -> i64 {
        self.last_invocation_ms.load(Ordering::Relaxed)
    }

    /// Registra o uso da entrada.
    pub fn touch(&self, now_ms: i64) {
        self.last_invocation_ms.store(now_ms, Ordering::Relaxed);
    }

    /// Verifica staleness: o mtime informado pelo caller é estritamente
    /// posterior à última invocação registrada.
    pub fn is_stale(&self, mtime_ms: i64) -> bool {
        mtime_ms > self.last_invocation_ms()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("resolved_options", &self.resolved_options)
            .field("ignore_path", &self.ignore_path)
            .field("has_config", &self.has_config)
            .field("last_invocation_ms", &self.last_invocation_ms())
            .finish_non_exhaustive()
    }
}

/// Cache LRU de diretório de projeto → [`CacheEntry`].
///
/// Invariante: no máximo uma entrada viva por chave; o tamanho nunca
/// excede a capacidade (inserções além dela removem a entrada menos
/// recentemente usada).
pub struct ProjectCache {
    cache: LruCache<String, Arc<CacheEntry>>,
}

impl ProjectCache {
    /// Cria um novo cache com a capacidade informada.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(CACHE_CAPACITY).expect("capacity is non-zero"));
        Self {
            cache: LruCache::new(cap),
        }
    }

    /// Busca uma entrada, atualizando a ordem de recência.
    pub fn get(&mut self, key: &str) -> Option<Arc<CacheEntry>> {
        self.cache.get(key).cloned()
    }

    /// Insere ou substitui uma entrada, retornando-a para encadeamento.
    ///
    /// Na capacidade máxima, a entrada menos recentemente usada é
    /// descartada (o handle do engine dela fica elegível para teardown).
    pub fn insert(&mut self, key: String, entry: Arc<CacheEntry>) -> Arc<CacheEntry> {
        self.cache.put(key, entry.clone());
        entry
    }

    /// Verifica presença sem alterar a ordem de recência.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.peek(key).is_some()
    }

    /// Número de projetos atualmente em cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Verifica se o cache está vazio.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Capacidade máxima.
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Chaves em cache, da mais para a menos recentemente usada.
    pub fn keys(&self) -> Vec<String> {
        self.cache.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl fmt::Debug for ProjectCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("keys", &self.keys())
            .finish()
    }
}
