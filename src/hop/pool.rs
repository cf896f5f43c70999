//! Host pool and next-hop selection.

use std::sync::Arc;

/// Ordered, read-only set of peers a hop may be forwarded to.
///
/// Built once at startup and shared across requests. Selection is a uniform
/// random pick with no exclusions: the current instance, repeats and
/// unreachable peers are all eligible.
#[derive(Debug, Clone)]
pub struct HostPool {
    hosts: Arc<[String]>,
}

impl HostPool {
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts: hosts.into(),
        }
    }

    /// Pick the next host, or `None` if the pool is empty.
    pub fn select(&self) -> Option<&str> {
        match self.hosts.len() {
            0 => None,
            1 => Some(self.hosts[0].as_str()),
            len => Some(self.hosts[fastrand::usize(..len)].as_str()),
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_empty_pool() {
        let pool = HostPool::new(Vec::new());
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.select(), None);
    }

    #[test]
    fn test_single_host() {
        let pool = HostPool::new(vec!["only:1".into()]);
        for _ in 0..10 {
            assert_eq!(pool.select(), Some("only:1"));
        }
    }

    #[test]
    fn test_uniform_selection() {
        let hosts: Vec<String> = (0..4).map(|i| format!("h{}:80", i)).collect();
        let pool = HostPool::new(hosts.clone());

        let rounds = 40_000;
        let mut hits: HashMap<&str, usize> = HashMap::new();
        for _ in 0..rounds {
            *hits.entry(pool.select().unwrap()).or_default() += 1;
        }

        // Expected 10_000 each; allow a wide margin.
        for host in &hosts {
            let count = hits.get(host.as_str()).copied().unwrap_or(0);
            assert!(
                (8_500..=11_500).contains(&count),
                "{} selected {} times",
                host,
                count
            );
        }
    }

    #[test]
    fn test_duplicate_entries_weight_selection() {
        let pool = HostPool::new(vec!["a:1".into(), "a:1".into(), "b:1".into()]);
        let a_hits = (0..30_000).filter(|_| pool.select() == Some("a:1")).count();
        assert!((18_000..=22_000).contains(&a_hits), "a selected {} times", a_hits);
    }
}
