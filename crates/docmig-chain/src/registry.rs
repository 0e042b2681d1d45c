//! Registry of migration chains by schema family

use std::collections::BTreeMap;

use docmig_tree::Document;

use crate::chain::{MigrationChain, MigrationOutcome};
use crate::error::{ChainError, ChainResult};
use crate::version::Version;

/// Immutable-after-construction map of schema family name to chain
///
/// Built once at startup and passed to whatever runs migrations, typically
/// behind an `Arc`. Chains are validated when registered.
#[derive(Debug, Default, Clone)]
pub struct MigrationRegistry {
    chains: BTreeMap<String, MigrationChain>,
}

impl MigrationRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `chain` under `family`, replacing any previous chain
    ///
    /// # Errors
    /// - [`ChainError::EmptyChain`] if the chain has no steps
    /// - any error of [`MigrationChain::validate`]
    pub fn register(&mut self, family: impl Into<String>, chain: MigrationChain) -> ChainResult<()> {
        let family = family.into();
        if chain.is_empty() {
            return Err(ChainError::EmptyChain(family));
        }
        chain.validate()?;
        self.chains.insert(family, chain);
        Ok(())
    }

    /// Builder form of [`Self::register`]
    ///
    /// # Errors
    /// As [`Self::register`]
    pub fn with(mut self, family: impl Into<String>, chain: MigrationChain) -> ChainResult<Self> {
        self.register(family, chain)?;
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, family: &str) -> Option<&MigrationChain> {
        self.chains.get(family)
    }

    /// Chain for `family`
    ///
    /// # Errors
    /// [`ChainError::UnknownFamily`] if nothing is registered under it
    pub fn chain(&self, family: &str) -> ChainResult<&MigrationChain> {
        self.get(family)
            .ok_or_else(|| ChainError::UnknownFamily(family.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, family: &str) -> bool {
        self.chains.contains_key(family)
    }

    /// Registered family names, sorted
    #[must_use]
    pub fn families(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Latest version of `family`
    ///
    /// # Errors
    /// [`ChainError::UnknownFamily`] if nothing is registered under it
    pub fn latest(&self, family: &str) -> ChainResult<Version> {
        let chain = self.chain(family)?;
        chain
            .latest()
            .ok_or_else(|| ChainError::EmptyChain(family.to_string()))
    }

    /// Migrate `doc` with the chain of `family` to `target`, or to the
    /// chain's latest version when `target` is `None`
    ///
    /// # Errors
    /// [`ChainError::UnknownFamily`], or any error of [`MigrationChain::migrate_to`]
    pub fn migrate(
        &self,
        family: &str,
        doc: Document,
        target: Option<Version>,
    ) -> ChainResult<MigrationOutcome> {
        let chain = self.chain(family)?;
        let target = match target {
            Some(target) => target,
            None => self.latest(family)?,
        };
        chain.migrate_to(doc, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{bump_version, MigrationStep};

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn bumping(from: &str, to: &str) -> MigrationStep {
        let to = v(to);
        MigrationStep::new(v(from), to, "", "", move |mut user, _, _| {
            bump_version(&mut user, to)?;
            Ok(user)
        })
    }

    #[test]
    fn registry_new_empty() {
        let registry = MigrationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = MigrationRegistry::new()
            .with("context", MigrationChain::new(vec![bumping("0.0.1", "0.0.2")]))
            .unwrap()
            .with("avs", MigrationChain::new(vec![bumping("1.0.0", "1.1.0")]))
            .unwrap();

        assert!(registry.contains("context"));
        assert_eq!(registry.families(), vec!["avs", "context"]);
        assert_eq!(registry.latest("avs").unwrap(), v("1.1.0"));
        assert_eq!(
            registry.chain("nope").unwrap_err(),
            ChainError::UnknownFamily("nope".into())
        );
    }

    #[test]
    fn registry_rejects_defective_chains() {
        let mut registry = MigrationRegistry::new();
        assert_eq!(
            registry.register("empty", MigrationChain::default()),
            Err(ChainError::EmptyChain("empty".into()))
        );
        assert!(matches!(
            registry.register(
                "gappy",
                MigrationChain::new(vec![bumping("0.0.1", "0.0.2"), bumping("0.0.3", "0.0.4")])
            ),
            Err(ChainError::Gap { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_migrates_to_latest_by_default() {
        let registry = MigrationRegistry::new()
            .with(
                "context",
                MigrationChain::new(vec![bumping("0.0.1", "0.0.2"), bumping("0.0.2", "0.0.3")]),
            )
            .unwrap();

        let doc = Document::parse("version: 0.0.1\n").unwrap();
        let outcome = registry.migrate("context", doc.clone(), None).unwrap();
        assert_eq!(outcome.document().version(), Some("0.0.3"));

        let partial = registry.migrate("context", doc, Some(v("0.0.2"))).unwrap();
        assert_eq!(partial.steps_applied(), 1);
    }
}
