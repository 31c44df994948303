//! Same-collection link filter
//!
//! A link stays inside the collection when its path starts with the
//! configured prefix (`/wiki/` for Wikipedia) and contains no `:`, which
//! rules out namespaced pages such as `Category:` or `File:`. Links are
//! either relative to the collection root or absolute under its base URL.
//! Accepted links are turned into absolute URLs by prefixing the base URL;
//! no other normalization is applied.

use crate::config::CrawlerConfig;

/// Predicate deciding which discovered links belong to the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkScope {
    base_url: String,
    path_prefix: String,
}

impl LinkScope {
    pub fn new(base_url: &str, path_prefix: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefix: path_prefix.to_string(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(&config.base_url(), &config.link_prefix)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the absolute URL for `href` if it is a same-collection link
    pub fn resolve(&self, href: &str) -> Option<String> {
        let path = match href.strip_prefix(self.base_url.as_str()) {
            Some(rest) if rest.starts_with('/') => rest,
            Some(_) => return None,
            None => href,
        };

        if path.starts_with(self.path_prefix.as_str()) && !path.contains(':') {
            Some(format!("{}{}", self.base_url, path))
        } else {
            None
        }
    }

    /// Resolves every in-scope link, dropping the rest
    pub fn filter<I, S>(&self, hrefs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hrefs
            .into_iter()
            .filter_map(|href| self.resolve(href.as_ref()))
            .collect()
    }
}
