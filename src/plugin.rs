//! Generic trait for lint rule plugins
//!
//! Provides a standardized interface between host tooling and individual
//! rules. A plugin bundles a configured rule behind a name; hosts construct
//! plugins through the registry and feed them parsed files one at a time.

use serde_json::Value;
use tracing::debug;

use crate::ast::SourceFile;
use crate::classify::{ExcludedTypes, default_exclusions};
use crate::diagnostic::Diagnostic;
use crate::policy::Policy;
use crate::rule::check_file;

/// Registry name of the omitempty rule.
pub const PLUGIN_NAME: &str = "omitempty";

/// Trait for rules that check one parsed file at a time
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; hosts may check files from
/// multiple worker threads against a shared plugin instance.
pub trait LintPlugin: Send + Sync {
    /// Returns the unique name of this plugin
    ///
    /// Used for logging, debugging, and registry management.
    fn name(&self) -> &str;

    /// One-line description for rule listings.
    ///
    /// Default: empty.
    fn doc(&self) -> &str {
        ""
    }

    /// Checks one parsed file and returns its diagnostics in source order.
    ///
    /// Must not retain state between calls; checking the same file twice
    /// yields the same diagnostics.
    fn check(&self, file: &SourceFile) -> Vec<Diagnostic>;
}

/// The omitempty rule, configured and ready to run.
pub struct OmitemptyPlugin {
    policy: Policy,
    excluded: ExcludedTypes,
}

impl OmitemptyPlugin {
    /// Builds the rule from host settings.
    ///
    /// Settings are read fail-soft (see [`Policy::from_config`]); absent or
    /// unusable settings leave both checks enabled. The exclusion set starts
    /// from the shared default.
    pub fn new(settings: Option<&Value>) -> OmitemptyPlugin {
        let policy = Policy::from_config(settings);
        debug!(
            unnecessary = policy.unnecessary,
            missing = policy.missing,
            "configured omitempty rule"
        );
        OmitemptyPlugin {
            policy,
            excluded: default_exclusions().clone(),
        }
    }

    /// Builds the rule from an already-decided policy.
    pub fn with_policy(policy: Policy) -> OmitemptyPlugin {
        OmitemptyPlugin {
            policy,
            excluded: default_exclusions().clone(),
        }
    }

    /// Replaces the excluded-type set.
    pub fn with_exclusions(mut self, excluded: ExcludedTypes) -> OmitemptyPlugin {
        self.excluded = excluded;
        self
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }
}

impl Default for OmitemptyPlugin {
    fn default() -> Self {
        OmitemptyPlugin::new(None)
    }
}

impl LintPlugin for OmitemptyPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn doc(&self) -> &str {
        "Reports incorrect usage of omitempty in JSON tags."
    }

    fn check(&self, file: &SourceFile) -> Vec<Diagnostic> {
        check_file(file, self.policy, &self.excluded)
    }
}
