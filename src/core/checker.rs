//! Checker abstraction and registry.
//!
//! A checker turns one provider's quota representation into a
//! [`UsageReport`]. Checkers never fail past their boundary: transport and
//! parse errors come back as an unknown reading with `provider_error` set.
//!
//! The registry maps provider ids to constructors so the monitor never names
//! a concrete provider.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use crate::core::credential::Credential;
use crate::core::models::UsageReport;
use crate::error::{GuardianError, Result};

// =============================================================================
// Checker Trait
// =============================================================================

/// Reads current quota usage for one credential.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Provider id this checker reports under.
    fn provider(&self) -> &str;

    /// Perform exactly one probe and normalize the result.
    async fn check(&self) -> UsageReport;
}

/// Everything a factory needs to build a checker for one target.
#[derive(Debug, Clone)]
pub struct CheckerSpec {
    pub credential: Credential,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    /// HTTP timeout for the probe request.
    pub timeout: Duration,
}

impl CheckerSpec {
    #[must_use]
    pub const fn new(credential: Credential, timeout: Duration) -> Self {
        Self {
            credential,
            base_url: None,
            organization: None,
            timeout,
        }
    }

    /// Configured base URL with any trailing slash removed, or `default`.
    #[must_use]
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Constructor stored in the registry.
pub type CheckerFactory = Arc<dyn Fn(&CheckerSpec) -> Result<Arc<dyn Checker>> + Send + Sync>;

// =============================================================================
// Registry
// =============================================================================

/// Provider id to checker constructor table.
#[derive(Clone, Default)]
pub struct CheckerRegistry {
    factories: BTreeMap<String, CheckerFactory>,
}

impl CheckerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every built-in provider.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::providers::register_builtin(&mut registry);
        registry
    }

    /// Process-wide registry of built-in providers, created on first use.
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<CheckerRegistry> = OnceLock::new();
        BUILTIN.get_or_init(Self::with_builtin)
    }

    /// Register a constructor under `id` (case-insensitive). Replaces any
    /// previous entry with the same id.
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&CheckerSpec) -> Result<Arc<dyn Checker>> + Send + Sync + 'static,
    {
        self.factories
            .insert(id.trim().to_lowercase(), Arc::new(factory));
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(&id.trim().to_lowercase())
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a checker for `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` when nothing is registered under `id`, or
    /// whatever the factory itself reports.
    pub fn create(&self, id: &str, spec: &CheckerSpec) -> Result<Arc<dyn Checker>> {
        let factory = self
            .factories
            .get(&id.trim().to_lowercase())
            .ok_or_else(|| GuardianError::UnknownProvider {
                provider: id.to_string(),
                known: self.ids().collect::<Vec<_>>().join(", "),
            })?;
        factory(spec)
    }
}

impl std::fmt::Debug for CheckerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Guarded Invocation
// =============================================================================

/// Run one check bounded by `limit`, converting a timeout or a panic into an
/// unknown reading.
pub async fn guarded_check(checker: &dyn Checker, target: &str, limit: Duration) -> UsageReport {
    let provider = checker.provider().to_string();
    let probe = AssertUnwindSafe(checker.check()).catch_unwind();

    match tokio::time::timeout(limit, probe).await {
        Ok(Ok(report)) => report,
        Ok(Err(_)) => {
            let err = GuardianError::CheckPanicked {
                target: target.to_string(),
            };
            tracing::error!(target_name = target, error_code = err.error_code(), "{err}");
            UsageReport::failure(provider, err.to_string())
        }
        Err(_) => {
            let err = GuardianError::CheckTimeout {
                target: target.to_string(),
                seconds: limit.as_secs(),
            };
            tracing::warn!(target_name = target, error_code = err.error_code(), "{err}");
            UsageReport::failure(provider, err.to_string())
        }
    }
}
