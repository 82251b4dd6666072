//! Registry of named domains
//!
//! The registry owns every [`DomainRecord`]. Records live behind their own
//! `RwLock` inside a sharded map, so updating one domain never blocks requests
//! against another, and a request always observes a domain either entirely
//! before or entirely after an update.
//!
//! ```rust
//! use domain_rewrite::{ConflictPolicy, DomainRegistry};
//!
//! let registry = DomainRegistry::new();
//! registry.initialize("https://api.example.com/")?;
//! registry.set_domain("search", "https://search.example.com/v2/")?;
//! registry.add_header("search", "x-client", "app", ConflictPolicy::Replace)?;
//! # Ok::<(), domain_rewrite::Error>(())
//! ```

use crate::config::{DomainSettings, Settings};
use crate::domain::policy::{ConflictPolicy, DefaultHeader};
use crate::domain::record::{DomainRecord, DomainSnapshot};
use crate::domain::types::{BaseUrl, DomainName};
use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use http::header::HeaderName;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// A record shared between the registry and in-flight rewrites
pub type SharedRecord = Arc<RwLock<DomainRecord>>;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Name-keyed collection of domain records
#[derive(Debug)]
pub struct DomainRegistry {
    id: u64,
    records: DashMap<DomainName, SharedRecord>,
    /// Main base URL passed to the first `initialize`/`bind`
    bound_base_url: OnceLock<BaseUrl>,
    enabled: AtomicBool,
}

impl DomainRegistry {
    /// Create an empty, uninitialized registry with rewriting enabled
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            records: DashMap::new(),
            bound_base_url: OnceLock::new(),
            enabled: AtomicBool::new(true),
        }
    }

    /// Build an initialized registry from configuration
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let registry = Self::new();
        registry.initialize(&settings.main.base_url)?;
        registry.apply_headers(&DomainName::main(), &settings.main)?;

        let mut names: Vec<&String> = settings.domains.keys().collect();
        names.sort();
        for name in names {
            let domain = &settings.domains[name];
            registry.set_domain(name, &domain.base_url)?;
            registry.apply_headers(&DomainName::parse(name)?, domain)?;
        }

        registry.set_enabled(settings.enabled);
        info!(
            domains = registry.records.len(),
            enabled = settings.enabled,
            "Domain registry loaded from settings"
        );
        Ok(registry)
    }

    fn apply_headers(&self, name: &DomainName, domain: &DomainSettings) -> Result<()> {
        for header in &domain.headers {
            self.add_header(name, &header.key, &header.value, header.policy)?;
        }
        Ok(())
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Create the main domain record
    ///
    /// Fails with [`Error::AlreadyInitialized`] on every call after the first.
    pub fn initialize(&self, main_base_url: &str) -> Result<()> {
        let url = BaseUrl::parse(main_base_url)?;
        match self.records.entry(DomainName::main()) {
            Entry::Occupied(_) => Err(Error::AlreadyInitialized),
            Entry::Vacant(entry) => {
                // Set while the shard is held so no caller sees the main record without it
                let _ = self.bound_base_url.set(url.clone());
                entry.insert(Arc::new(RwLock::new(DomainRecord::new(
                    DomainName::main(),
                    url.clone(),
                ))));
                info!(base_url = %url, "Domain registry initialized");
                Ok(())
            }
        }
    }

    /// Bind the registry to a client with the given main base URL
    ///
    /// The first bind initializes the registry. Binding again with the same URL
    /// is a no-op; binding with a different URL is rejected.
    pub fn bind(&self, main_base_url: &str) -> Result<()> {
        let url = BaseUrl::parse(main_base_url)?;
        match self.initialize(&url) {
            Err(Error::AlreadyInitialized) => match self.bound_base_url.get() {
                Some(bound) if *bound == url => {
                    debug!(base_url = %url, "Domain registry already bound, ignoring");
                    Ok(())
                }
                bound => Err(Error::AlreadyBound {
                    bound: bound.map(ToString::to_string).unwrap_or_default(),
                    requested: url.to_string(),
                }),
            },
            other => other,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.records.contains_key(&DomainName::main())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Turn rewriting on or off; configuration is kept either way
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            info!(enabled, "Domain rewriting toggled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Point the main domain at `url`
    pub fn set_main_domain(&self, url: &str) -> Result<()> {
        self.set_domain(DomainName::main().as_str(), url)
    }

    /// Create the domain `name` or move it to a new base URL
    pub fn set_domain(&self, name: &str, url: &str) -> Result<()> {
        self.ensure_initialized()?;
        let name = DomainName::parse(name)?;
        let url = BaseUrl::parse(url)?;

        let record = match self.records.entry(name.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(RwLock::new(DomainRecord::new(
                    name.clone(),
                    url.clone(),
                ))));
                debug!(domain = %name, base_url = %url, "Domain registered");
                return Ok(());
            }
        };

        let mut record = record.write();
        match record.update_base_url(url) {
            Some(previous) => debug!(
                domain = %name,
                previous = %previous,
                current = %record.current_base_url(),
                "Domain base URL updated"
            ),
            None => debug!(domain = %name, "Domain base URL unchanged"),
        }
        Ok(())
    }

    /// Add a default header to the main domain
    pub fn add_main_header(
        &self,
        key: &str,
        value: &str,
        policy: ConflictPolicy,
    ) -> Result<Option<DefaultHeader>> {
        self.add_header(DomainName::main().as_str(), key, value, policy)
    }

    /// Add or replace a default header on the domain `name`
    ///
    /// Returns the entry previously stored under the same header name.
    pub fn add_header(
        &self,
        name: &str,
        key: &str,
        value: &str,
        policy: ConflictPolicy,
    ) -> Result<Option<DefaultHeader>> {
        self.ensure_initialized()?;
        let record = self
            .record(name)
            .ok_or_else(|| Error::DomainNotFound(name.to_string()))?;
        let header = DefaultHeader::new(key, value, policy)?;

        debug!(domain = name, key, value, %policy, "Default header added");
        let replaced = record.write().add_header(header);
        Ok(replaced)
    }

    pub fn remove_main_header(&self, key: &str) -> Option<DefaultHeader> {
        self.remove_header(DomainName::main().as_str(), key)
    }

    /// Remove a default header; unknown domains and keys yield `None`
    pub fn remove_header(&self, name: &str, key: &str) -> Option<DefaultHeader> {
        let key = HeaderName::try_from(key).ok()?;
        let removed = self.record(name)?.write().remove_header(&key);
        if removed.is_some() {
            debug!(domain = name, key = %key, "Default header removed");
        }
        removed
    }

    /// Look up a record by name
    ///
    /// The map guard is released before returning, so callers may lock the
    /// record freely.
    pub fn record(&self, name: &str) -> Option<SharedRecord> {
        let name = DomainName::parse(name).ok()?;
        self.records
            .get(&name)
            .map(|record| Arc::clone(record.value()))
    }

    pub fn main_record(&self) -> Result<SharedRecord> {
        self.record(DomainName::main().as_str())
            .ok_or(Error::NotInitialized)
    }

    pub fn snapshot(&self, name: &str) -> Option<DomainSnapshot> {
        self.record(name).map(|record| record.read().snapshot())
    }

    pub fn main_snapshot(&self) -> Option<DomainSnapshot> {
        self.snapshot(DomainName::main().as_str())
    }

    /// Names of every registered domain, sorted
    pub fn domain_names(&self) -> Vec<DomainName> {
        let mut names: Vec<DomainName> = self
            .records
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
