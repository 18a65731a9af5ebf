//! Expander with a parsed-template cache
//!
//! The free functions in the crate root parse on every call. An `Expander`
//! keeps parsed templates in a concurrent map, shared as `Arc<Template>`,
//! for callers that expand the same templates over and over (one set of
//! search templates per package, many queries).

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::encoding::{Encoder, PercentEncoder};
use crate::error::Result;
use crate::params::Params;
use crate::template::{Mode, Template};

/// Template expander with caching
pub struct Expander<E = PercentEncoder> {
    encoder: E,
    /// Cache of parsed templates
    cache: DashMap<String, Arc<Template>>,
}

impl Default for Expander<PercentEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl Expander<PercentEncoder> {
    /// Expander using percent-encoding
    pub fn new() -> Self {
        Self::with_encoder(PercentEncoder)
    }
}

impl<E: Encoder> Expander<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self {
            encoder,
            cache: DashMap::new(),
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Parse template (with caching). Failed parses are not cached.
    pub fn parse(&self, template: &str) -> Result<Arc<Template>> {
        if let Some(cached) = self.cache.get(template) {
            debug!(template, "template cache hit");
            return Ok(Arc::clone(&cached));
        }

        debug!(template, "template cache miss");
        let parsed = Arc::new(Template::parse(template)?);
        self.cache.insert(template.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    #[instrument(level = "debug", skip(self, params), fields(params = params.len()))]
    pub fn expand_with_mode(&self, template: &str, params: &Params, mode: Mode) -> Result<String> {
        self.parse(template)?.expand(params, &self.encoder, mode)
    }

    pub fn expand(&self, template: &str, params: &Params) -> Result<String> {
        self.expand_with_mode(template, params, Mode::Full)
    }

    pub fn expand_partial(&self, template: &str, params: &Params) -> Result<String> {
        self.expand_with_mode(template, params, Mode::Partial)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Verbatim;

    #[test]
    fn cache_reuse() {
        let expander = Expander::new();
        let first = expander.parse("/a/{b}").unwrap();
        let second = expander.parse("/a/{b}").unwrap();

        // Should be the same Arc
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(expander.cache_len(), 1);
    }

    #[test]
    fn failed_parse_not_cached() {
        let expander = Expander::new();
        assert!(expander.parse("{-nope|x|y}").is_err());
        assert_eq!(expander.cache_len(), 0);
    }

    #[test]
    fn clear_cache_empties() {
        let expander = Expander::new();
        expander.expand("{a}", &Params::new()).unwrap();
        expander.clear_cache();
        assert_eq!(expander.cache_len(), 0);
    }

    #[test]
    fn expands_with_configured_encoder() {
        let params = Params::new().with("q", "a b");
        assert_eq!(Expander::new().expand("?q={q}", &params).unwrap(), "?q=a%20b");
        assert_eq!(
            Expander::with_encoder(Verbatim).expand("?q={q}", &params).unwrap(),
            "?q=a b"
        );
    }

    #[test]
    fn closure_encoder() {
        let expander = Expander::with_encoder(|s: &str| s.replace(' ', "+"));
        let params = Params::new().with("q", "a b");
        assert_eq!(expander.expand("?q={q}", &params).unwrap(), "?q=a+b");
    }

    #[test]
    fn staged_expansion_through_cache() {
        let expander = Expander::new();
        let template = "/search{-opt|?|q,page}{-join|&|q,page}";
        let stage = expander
            .expand_partial(template, &Params::new().with("page", "2"))
            .unwrap();
        assert_eq!(stage, "/search?{-join|&|q}{-opt|&|q}page=2");
        let done = expander
            .expand(&stage, &Params::new().with("q", "rust"))
            .unwrap();
        assert_eq!(done, "/search?q=rust&page=2");
        assert_eq!(expander.cache_len(), 2);
    }

    #[test]
    fn expander_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Expander>();
        assert_send_sync::<Template>();
        assert_send_sync::<Params>();
    }
}
