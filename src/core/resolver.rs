//! Secret resolution.
//!
//! Turns a document containing `ENC[handle]` references into one with every
//! reference replaced by its plaintext:
//!
//! 1. Parse the document.
//! 2. Walk it once, substituting cache hits and collecting the misses.
//! 3. Fetch all misses from the backend in a single batch.
//! 4. Walk it again, substituting the freshly fetched secrets.
//! 5. Serialize.
//!
//! Any error aborts the whole call; the caller gets no partially resolved
//! output, and the cache only gains entries once a fetch fully succeeds.

use std::collections::HashSet;
use std::sync::Arc;

use serde_yaml::Value;
use tracing::debug;

use crate::core::backend::{Client, Process, SecretFetcher};
use crate::core::cache::HandleCache;
use crate::core::config::Config;
use crate::core::{document, reference, walker};
use crate::error::{Error, Result};

/// Resolver backed by the configured subprocess.
pub type BackendResolver = Resolver<Client<Process>>;

/// Resolves secret references in documents through a [`SecretFetcher`].
#[derive(Debug)]
pub struct Resolver<F> {
    fetcher: F,
    cache: Arc<HandleCache>,
}

impl BackendResolver {
    /// Build a resolver that runs the backend described by `config`.
    pub fn from_config(config: &Config, cache: Arc<HandleCache>) -> Self {
        Self::new(Client::new(Process::from_config(config)), cache)
    }
}

impl<F: SecretFetcher> Resolver<F> {
    pub fn new(fetcher: F, cache: Arc<HandleCache>) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &Arc<HandleCache> {
        &self.cache
    }

    /// Resolve every secret reference in `input`.
    ///
    /// Empty input, a disabled backend, or a document without references is
    /// returned byte-for-byte unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be parsed or
    /// serialized, any error from the fetcher, and `Error::Consistency` if
    /// the fetcher reported success without resolving a requested handle.
    pub fn resolve(&self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() || !self.fetcher.is_configured() {
            return Ok(input.to_vec());
        }

        let mut doc = document::parse(input)?;

        // Held until the end so concurrent calls never fetch the same handle twice.
        let mut cache = self.cache.lock();

        // Walk order is stable, so a scalar's position identifies it across
        // both passes. Positions filled from the cache are skipped in pass 2.
        let mut found = false;
        let mut position = 0usize;
        let mut substituted = HashSet::new();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        walker::walk(&mut doc, &mut |value: &str| {
            position += 1;
            let Some(handle) = reference::parse(value)? else {
                return Ok(value.to_string());
            };
            found = true;
            if let Some(secret) = cache.lookup(handle) {
                debug!(handle, "secret retrieved from cache");
                substituted.insert(position);
                return Ok(secret.to_string());
            }
            if seen.insert(handle.to_string()) {
                pending.push(handle.to_string());
            }
            Ok(value.to_string())
        })?;

        if !found {
            debug!("document has no secret references");
            return Ok(input.to_vec());
        }

        if !pending.is_empty() {
            let mut secrets = self.fetcher.fetch(&pending)?;
            if let Some(missing) = pending.iter().find(|h| !secrets.contains_key(*h)) {
                return Err(Error::Consistency(missing.clone()));
            }
            for handle in &pending {
                if let Some(secret) = secrets.remove(handle) {
                    cache.store(handle.clone(), secret);
                }
            }

            position = 0;
            walker::walk(&mut doc, &mut |value: &str| {
                position += 1;
                if substituted.contains(&position) {
                    return Ok(value.to_string());
                }
                let Some(handle) = reference::parse(value)? else {
                    return Ok(value.to_string());
                };
                match cache.lookup(handle) {
                    Some(secret) => {
                        debug!(handle, "secret retrieved from backend");
                        Ok(secret.to_string())
                    }
                    None => Err(Error::Consistency(handle.to_string())),
                }
            })?;
        }

        document::serialize(&doc)
    }
}

/// List the distinct handles referenced by a document, in order of first
/// appearance, without contacting any backend.
///
/// # Errors
///
/// Returns `DocumentError` if the document cannot be parsed or contains an
/// empty reference.
pub fn referenced_handles(input: &[u8]) -> Result<Vec<String>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut doc: Value = document::parse(input)?;
    let mut handles: Vec<String> = Vec::new();
    walker::walk(&mut doc, &mut |value: &str| {
        if let Some(handle) = reference::parse(value)? {
            if !handles.iter().any(|h| h == handle) {
                handles.push(handle.to_string());
            }
        }
        Ok(value.to_string())
    })?;
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::SecretMap;
    use crate::error::{BackendError, DocumentError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use zeroize::Zeroizing;

    /// Fetcher serving secrets from a fixed table and recording every batch.
    struct Fake {
        secrets: HashMap<&'static str, &'static str>,
        failing: Option<&'static str>,
        configured: bool,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Fake {
        fn new(secrets: &[(&'static str, &'static str)]) -> Self {
            Self {
                secrets: secrets.iter().copied().collect(),
                failing: None,
                configured: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl SecretFetcher for Fake {
        fn fetch(&self, handles: &[String]) -> Result<SecretMap> {
            self.calls.borrow_mut().push(handles.to_vec());
            let mut out = SecretMap::new();
            for handle in handles {
                if self.failing == Some(handle.as_str()) {
                    return Err(BackendError::Rejected {
                        handle: handle.clone(),
                        message: "denied".to_string(),
                    }
                    .into());
                }
                let value = self
                    .secrets
                    .get(handle.as_str())
                    .ok_or_else(|| BackendError::MissingHandle(handle.clone()))?;
                out.insert(handle.clone(), Zeroizing::new(value.to_string()));
            }
            Ok(out)
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn yaml(bytes: &[u8]) -> Value {
        serde_yaml::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_resolves_concrete_scenario() {
        let fake = Fake::new(&[("db_pass", "s3cr3t")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        let out = resolver
            .resolve(b"password: ENC[db_pass]\nhost: db.internal\n")
            .unwrap();

        assert_eq!(yaml(&out), yaml(b"password: s3cr3t\nhost: db.internal\n"));
        assert_eq!(*fake.calls.borrow(), vec![vec!["db_pass".to_string()]]);
    }

    #[test]
    fn test_disabled_backend_is_noop() {
        let mut fake = Fake::new(&[]);
        fake.configured = false;
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        let input = b"password: ENC[db_pass]\n  weird:   spacing\n";
        assert_eq!(resolver.resolve(input).unwrap(), input.to_vec());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let fake = Fake::new(&[]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));
        assert!(resolver.resolve(b"").unwrap().is_empty());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_no_references_returns_input_unchanged() {
        let fake = Fake::new(&[]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        let input = b"# comment kept\nhost:   db.internal\nport: 5432\n";
        assert_eq!(resolver.resolve(input).unwrap(), input.to_vec());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_batches_all_handles_once() {
        let fake = Fake::new(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        let out = resolver
            .resolve(b"x: ENC[a]\nlist:\n  - ENC[b]\n  - nested:\n      deep: ENC[c]\ndup: ENC[a]\n")
            .unwrap();

        assert_eq!(fake.calls(), 1);
        assert_eq!(fake.calls.borrow()[0], vec!["a", "b", "c"]);
        assert_eq!(
            yaml(&out),
            yaml(b"x: '1'\nlist:\n  - '2'\n  - nested:\n      deep: '3'\ndup: '1'\n")
        );
    }

    #[test]
    fn test_cache_hit_avoids_backend() {
        let fake = Fake::new(&[("h", "secret1")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        resolver.resolve(b"first: ENC[h]\n").unwrap();
        let out = resolver.resolve(b"second:\n  - ENC[h]\n").unwrap();

        assert_eq!(fake.calls(), 1);
        assert_eq!(yaml(&out), yaml(b"second:\n  - secret1\n"));
    }

    #[test]
    fn test_only_misses_are_fetched() {
        let fake = Fake::new(&[("old", "1"), ("new", "2")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));

        resolver.resolve(b"a: ENC[old]\n").unwrap();
        let out = resolver.resolve(b"a: ENC[old]\nb: ENC[new]\n").unwrap();

        assert_eq!(fake.calls.borrow()[1], vec!["new"]);
        assert_eq!(yaml(&out), yaml(b"a: '1'\nb: '2'\n"));
    }

    #[test]
    fn test_backend_failure_stores_nothing() {
        let mut fake = Fake::new(&[("a", "1"), ("b", "2")]);
        fake.failing = Some("b");
        let cache = Arc::new(HandleCache::new());
        let resolver = Resolver::new(&fake, Arc::clone(&cache));

        let err = resolver.resolve(b"a: ENC[a]\nb: ENC[b]\n").unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::Rejected { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fetcher_that_skips_a_handle_is_inconsistent() {
        struct Forgetful;
        impl SecretFetcher for Forgetful {
            fn fetch(&self, handles: &[String]) -> Result<SecretMap> {
                let mut out = SecretMap::new();
                if handles.iter().any(|h| h == "a") {
                    out.insert("a".to_string(), Zeroizing::new("1".to_string()));
                }
                Ok(out)
            }
        }
        let cache = Arc::new(HandleCache::new());
        let resolver = Resolver::new(Forgetful, Arc::clone(&cache));

        let err = resolver.resolve(b"a: ENC[a]\nb: ENC[b]\n").unwrap_err();

        assert!(matches!(err, Error::Consistency(h) if h == "b"));
        assert!(cache.is_empty(), "cached {:?}", cache.handles());
    }

    #[test]
    fn test_cached_secret_that_looks_like_a_reference_is_kept() {
        let fake = Fake::new(&[("h", "ENC[zzz]"), ("other", "2")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));
        resolver.resolve(b"a: ENC[h]\n").unwrap();

        let out = resolver.resolve(b"a: ENC[h]\nb: ENC[other]\n").unwrap();

        assert_eq!(yaml(&out), yaml(b"a: ENC[zzz]\nb: '2'\n"));
        assert_eq!(fake.calls.borrow()[1], vec!["other"]);
    }

    #[test]
    fn test_parse_error() {
        let resolver = Resolver::new(Fake::new(&[]), Arc::new(HandleCache::new()));
        let err = resolver.resolve(b"a: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Document(DocumentError::Parse(_))));
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let fake = Fake::new(&[]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));
        let err = resolver.resolve(b"a: ENC[]\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Document(DocumentError::InvalidReference(_))
        ));
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_cache_only_document_is_reserialized() {
        let fake = Fake::new(&[("h", "v")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));
        resolver.resolve(b"a: ENC[h]\n").unwrap();

        let out = resolver.resolve(b"b: ENC[h]\nport: 1\n").unwrap();
        assert_eq!(yaml(&out), yaml(b"b: v\nport: 1\n"));
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_keys_are_not_resolved() {
        let fake = Fake::new(&[("v", "plain")]);
        let resolver = Resolver::new(&fake, Arc::new(HandleCache::new()));
        let out = resolver.resolve(b"ENC[k]: ENC[v]\n").unwrap();
        assert_eq!(yaml(&out), yaml(b"ENC[k]: plain\n"));
        assert_eq!(fake.calls.borrow()[0], vec!["v"]);
    }

    #[test]
    fn test_referenced_handles() {
        let handles =
            referenced_handles(b"a: ENC[x]\nb: ['ENC[y]', 'ENC[x]', plain]\nc: {d: ' ENC[ z ] '}\n")
                .unwrap();
        assert_eq!(handles, vec!["x", "y", "z"]);
    }
}
