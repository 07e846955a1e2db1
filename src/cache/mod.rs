//! Cache LRU de projetos.
//!
//! Este módulo implementa um cache Least Recently Used (LRU) mapeando
//! diretório de projeto para o engine carregado e sua configuração
//! resolvida, evitando redescobrir arquivos de configuração e recarregar
//! o engine a cada requisição.

mod project;

pub use project::{CacheEntry, ProjectCache, CACHE_CAPACITY};

#[cfg(test)]
pub(crate) use project::test_support::entry as project_test_entry;
