use std::collections::HashSet;

/// Keeps URLs that mention one of the allowed domains.
///
/// Matching is plain substring containment, so a domain appearing in a path or query
/// string also passes.
#[derive(Debug, Clone)]
pub struct AllowlistFilter {
    domains: Vec<String>,
    max_urls: usize,
}

impl AllowlistFilter {
    pub fn new(domains: Vec<String>, max_urls: usize) -> Self {
        Self { domains, max_urls }
    }

    pub fn max_urls(&self) -> usize {
        self.max_urls
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.domains.iter().any(|domain| url.contains(domain.as_str()))
    }

    /// Distinct allowed URLs in input order, at most `max_urls` of them.
    pub fn filter<S: AsRef<str>>(&self, urls: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for url in urls.iter().map(AsRef::as_ref) {
            if kept.len() >= self.max_urls {
                break;
            }
            if self.is_allowed(url) && seen.insert(url) {
                kept.push(url.to_string());
            }
        }

        kept
    }
}
