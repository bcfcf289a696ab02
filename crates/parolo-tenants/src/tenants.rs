//! Tenant/agent prompts with semantic version tags.
//!
//! Each (tenant, agent) pair maps to one store prompt named by [`key`]. A
//! semver string is recorded in every version's custom metadata; versions
//! saved without one read back as `1.0.<index>`.

use std::sync::Arc;

use parolo_core::clock::now_utc_iso;
use parolo_core::{ParoloError, Result};
use parolo_store::{CustomMetadata, PromptStore, VersionEntry};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::TokenCache;

/// Prefix of synthesized semvers.
pub const DEFAULT_SEMVER_BASE: &str = "1.0.";

/// Semver given to [`TenantPrompts::ensure_initial`] callers that have none.
pub const INITIAL_SEMVER: &str = "1.0.0";

const SEMVER_KEY: &str = "semver";

/// Store prompt name for a tenant/agent pair.
pub fn key(tenant_id: &str, agent_id: &str) -> String {
    format!("{tenant_id}_{agent_id}")
}

fn synthesized_semver(index: usize) -> String {
    format!("{DEFAULT_SEMVER_BASE}{index}")
}

/// Result of [`TenantPrompts::save`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SaveInfo {
    /// Semver recorded (or that would have been recorded on a no-op).
    pub semver: String,
    /// Store version id (`v0003`).
    pub version: String,
    /// Whether a new store version was minted.
    pub created: bool,
}

/// Tenant-keyed view over a shared [`PromptStore`].
#[derive(Debug)]
pub struct TenantPrompts {
    store: Arc<PromptStore>,
    cache: TokenCache,
}

impl TenantPrompts {
    /// Tenant layer over `store`.
    pub fn new(store: Arc<PromptStore>) -> Self {
        Self {
            store,
            cache: TokenCache::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<PromptStore> {
        &self.store
    }

    /// Save `text` for the pair, tagging it with `semver`.
    ///
    /// Without a semver, `1.0.<n>` is used where `n` is the number of
    /// existing versions, counted under the store's name lock. `extra` keys
    /// are merged over the standard `tenant_id`, `agent_id`, `created_at`,
    /// and `semver` entries.
    pub fn save(
        &self,
        tenant_id: &str,
        agent_id: &str,
        text: &str,
        semver: Option<&str>,
        extra: Option<CustomMetadata>,
    ) -> Result<SaveInfo> {
        let pid = key(tenant_id, agent_id);
        let mut recorded = String::new();
        let outcome = self.store.put_with(&pid, text, |existing| {
            let semver = semver.map_or_else(|| synthesized_semver(existing), str::to_owned);
            let mut meta = CustomMetadata::new();
            let _ = meta.insert("tenant_id".into(), Value::from(tenant_id));
            let _ = meta.insert("agent_id".into(), Value::from(agent_id));
            let _ = meta.insert("created_at".into(), Value::from(now_utc_iso()));
            let _ = meta.insert(SEMVER_KEY.into(), Value::from(semver.as_str()));
            if let Some(extra) = extra {
                meta.extend(extra);
            }
            recorded = semver;
            meta
        })?;

        if outcome.created {
            info!(
                tenant = tenant_id,
                agent = agent_id,
                semver = %recorded,
                version = %outcome.version,
                "tenant prompt saved"
            );
        }
        Ok(SaveInfo {
            semver: recorded,
            version: outcome.version.to_string(),
            created: outcome.created,
        })
    }

    /// Semver of every version, oldest first.
    pub fn list_semvers(&self, tenant_id: &str, agent_id: &str) -> Result<Vec<String>> {
        let entries = self
            .store
            .list_versions_with_meta(&key(tenant_id, agent_id))?;
        Ok(entries
            .iter()
            .enumerate()
            .map(|(i, entry)| entry_semver(entry).map_or_else(|| synthesized_semver(i), str::to_owned))
            .collect())
    }

    /// Semver of the newest version.
    pub fn latest_semver(&self, tenant_id: &str, agent_id: &str) -> Result<Option<String>> {
        Ok(self.list_semvers(tenant_id, agent_id)?.pop())
    }

    /// Save `text` as the first version unless one exists.
    ///
    /// Returns the recorded semver, or `None` when versions already exist and
    /// `overwrite` is false. With `overwrite`, a new save happens even when
    /// the semver tag is already taken.
    pub fn ensure_initial(
        &self,
        tenant_id: &str,
        agent_id: &str,
        text: &str,
        semver: &str,
        overwrite: bool,
    ) -> Result<Option<String>> {
        let existing = self.store.list_versions(&key(tenant_id, agent_id))?;
        if !existing.is_empty() && !overwrite {
            debug!(tenant = tenant_id, agent = agent_id, "initial prompt already present");
            return Ok(None);
        }
        let info = self.save(tenant_id, agent_id, text, Some(semver), None)?;
        Ok(Some(info.semver))
    }

    /// Current text, or the text of the first version tagged `semver`.
    pub fn read(&self, tenant_id: &str, agent_id: &str, semver: Option<&str>) -> Result<String> {
        let pid = key(tenant_id, agent_id);
        let Some(semver) = semver else {
            return self.store.get(&pid);
        };
        let entries = self.store.list_versions_with_meta(&pid)?;
        let found = entries
            .iter()
            .find(|entry| entry_semver(entry) == Some(semver))
            .ok_or_else(|| ParoloError::version_not_found(&pid, semver))?;
        self.store.get_version(&pid, &found.file)
    }

    /// [`read`](Self::read), substituting `fallback()` when the read fails.
    ///
    /// If the fallback yields nothing, the original error is returned.
    pub fn read_or_else<F>(
        &self,
        tenant_id: &str,
        agent_id: &str,
        semver: Option<&str>,
        fallback: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Option<String>,
    {
        match self.read(tenant_id, agent_id, semver) {
            Ok(text) => Ok(text),
            Err(err) => match fallback() {
                Some(text) => {
                    debug!(tenant = tenant_id, agent = agent_id, error = %err, "using fallback prompt");
                    Ok(text)
                }
                None => Err(err),
            },
        }
    }

    /// Current text, served from cache while the change token is unchanged.
    pub fn read_cached(&self, tenant_id: &str, agent_id: &str) -> Result<String> {
        let pid = key(tenant_id, agent_id);
        let token = self.store.token(&pid)?;
        if let Some(text) = self.cache.get(&pid, token) {
            return Ok(text);
        }
        let text = self.store.get(&pid)?;
        self.cache.insert(&pid, token, text.clone());
        Ok(text)
    }
}

fn entry_semver(entry: &VersionEntry) -> Option<&str> {
    entry
        .metadata
        .as_ref()?
        .get(SEMVER_KEY)?
        .as_str()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parolo_store::StoreConfig;
    use serde_json::json;

    fn tenants() -> (tempfile::TempDir, TenantPrompts) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PromptStore::new(StoreConfig::new(dir.path())));
        (dir, TenantPrompts::new(store))
    }

    #[test]
    fn key_joins_with_underscore() {
        assert_eq!(key("acme", "support"), "acme_support");
    }

    #[test]
    fn save_auto_increments_semver() {
        let (_dir, t) = tenants();
        let first = t.save("t1", "a1", "V1", Some("1.0.0"), None).unwrap();
        assert_eq!(first.semver, "1.0.0");
        assert_eq!(first.version, "v0001");

        let second = t.save("t1", "a1", "V2", None, None).unwrap();
        assert_eq!(second.semver, "1.0.1");
        assert!(second.created);
        assert_eq!(t.latest_semver("t1", "a1").unwrap().as_deref(), Some("1.0.1"));
    }

    #[test]
    fn concurrent_saves_get_distinct_semvers() {
        let (_dir, t) = tenants();
        std::thread::scope(|scope| {
            for i in 0..16 {
                let t = &t;
                let _ = scope.spawn(move || {
                    t.save("t", "a", &format!("body {i}"), None, None).unwrap()
                });
            }
        });

        let semvers = t.list_semvers("t", "a").unwrap();
        let expected: Vec<String> = (0..16).map(|i| format!("1.0.{i}")).collect();
        assert_eq!(semvers, expected);
        assert_eq!(t.read("t", "a", Some("1.0.15")).unwrap(), t.read("t", "a", None).unwrap());
    }

    #[test]
    fn save_records_standard_and_extra_metadata() {
        let (_dir, t) = tenants();
        let extra = json!({"owner": "ops", "semver": "9.9.9"});
        let _ = t
            .save("acme", "bot", "hi", Some("2.0.0"), extra.as_object().cloned())
            .unwrap();

        let meta = t.store().meta_version("acme_bot", "v0001").unwrap();
        assert_eq!(meta.custom_str("tenant_id"), Some("acme"));
        assert_eq!(meta.custom_str("agent_id"), Some("bot"));
        assert_eq!(meta.custom_str("owner"), Some("ops"));
        assert_eq!(meta.custom_str("semver"), Some("9.9.9"));
        assert!(meta.custom_str("created_at").is_some());
    }

    #[test]
    fn list_semvers_synthesizes_missing_tags() {
        let (_dir, t) = tenants();
        let _ = t.store().put("org_bot", "untagged", None).unwrap();
        let _ = t.save("org", "bot", "tagged", Some("2.0.0"), None).unwrap();
        let _ = t.store().put("org_bot", "untagged again", None).unwrap();

        assert_eq!(
            t.list_semvers("org", "bot").unwrap(),
            ["1.0.0", "2.0.0", "1.0.2"]
        );
    }

    #[test]
    fn semvers_of_unknown_pair_are_empty() {
        let (_dir, t) = tenants();
        assert!(t.list_semvers("no", "one").unwrap().is_empty());
        assert_eq!(t.latest_semver("no", "one").unwrap(), None);
    }

    #[test]
    fn read_by_semver() {
        let (_dir, t) = tenants();
        let _ = t.save("t1", "a1", "V1", Some("1.0.0"), None).unwrap();
        let _ = t.save("t1", "a1", "V2", None, None).unwrap();

        assert_eq!(t.read("t1", "a1", Some("1.0.0")).unwrap(), "V1");
        assert_eq!(t.read("t1", "a1", None).unwrap(), "V2");
        assert_matches!(
            t.read("t1", "a1", Some("3.0.0")),
            Err(ParoloError::NotFound { version: Some(v), .. }) if v == "3.0.0"
        );
    }

    #[test]
    fn ensure_initial_respects_existing_versions() {
        let (_dir, t) = tenants();
        let created = t
            .ensure_initial("t2", "x", "initial", INITIAL_SEMVER, false)
            .unwrap();
        assert_eq!(created.as_deref(), Some("1.0.0"));

        let again = t
            .ensure_initial("t2", "x", "ignored", INITIAL_SEMVER, false)
            .unwrap();
        assert_eq!(again, None);
        assert_eq!(t.read("t2", "x", None).unwrap(), "initial");

        let forced = t
            .ensure_initial("t2", "x", "overwritten", INITIAL_SEMVER, true)
            .unwrap();
        assert_eq!(forced.as_deref(), Some("1.0.0"));
        assert_eq!(t.read("t2", "x", None).unwrap(), "overwritten");
    }

    #[test]
    fn fallback_only_when_it_yields() {
        let (_dir, t) = tenants();
        let text = t
            .read_or_else("no", "such", None, || Some("fallback-text".into()))
            .unwrap();
        assert_eq!(text, "fallback-text");

        let err = t.read_or_else("no", "such", None, || None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn fallback_not_called_on_success() {
        let (_dir, t) = tenants();
        let _ = t.save("a", "b", "stored", None, None).unwrap();
        let text = t
            .read_or_else("a", "b", None, || panic!("fallback invoked"))
            .unwrap();
        assert_eq!(text, "stored");
    }

    #[test]
    fn read_cached_follows_writes() {
        let (_dir, t) = tenants();
        let _ = t.save("t3", "a", "one", Some("1.0.0"), None).unwrap();
        assert_eq!(t.read_cached("t3", "a").unwrap(), "one");
        assert_eq!(t.read_cached("t3", "a").unwrap(), "one");

        let _ = t.save("t3", "a", "two", Some("1.0.1"), None).unwrap();
        assert_eq!(t.read_cached("t3", "a").unwrap(), "two");
    }

    #[test]
    fn read_cached_missing_is_not_found() {
        let (_dir, t) = tenants();
        assert!(t.read_cached("ghost", "x").unwrap_err().is_not_found());
    }
}
