//! Relatório de status do daemon.

use crate::cache::ProjectCache;

/// Frase legível derivada só da contagem de projetos em cache.
///
/// Puro e infalível; nenhum formato estruturado é garantido.
pub fn report(cache: &ProjectCache) -> String {
    match cache.len() {
        0 => "no instances cached".to_string(),
        1 => "1 instance cached".to_string(),
        n => format!("{} instances cached", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::project_test_entry;

    #[test]
    fn test_report_phrasing() {
        let mut cache = ProjectCache::new(10);
        assert_eq!(report(&cache), "no instances cached");

        cache.insert("/a".to_string(), project_test_entry());
        assert_eq!(report(&cache), "1 instance cached");

        cache.insert("/b".to_string(), project_test_entry());
        assert_eq!(report(&cache), "2 instances cached");

        cache.insert("/c".to_string(), project_test_entry());
        assert!(report(&cache).contains('3'));
    }
}
