//! # Identity Classification
//!
//! Decides which trust role a caller holds from its SPIFFE identity document
//! (SVID). The SVID reaching this module has already been verified during the
//! mTLS handshake; classification is a policy lookup, not authentication.
//!
//! # SVID Format
//!
//! ```text
//! spiffe://{trust_domain}/workload/{name}/ns/{namespace}/sa/{service_account}/n/{node}
//! ```
//!
//! Each role is recognised by a configured literal prefix:
//!
//! | Role          | Default prefix                                                                      |
//! |---------------|-------------------------------------------------------------------------------------|
//! | Orchestrator  | `spiffe://aegis.z2h.dev/workload/aegis-sentinel/ns/aegis-system/sa/aegis-sentinel/n/` |
//! | Storage       | `spiffe://aegis.z2h.dev/workload/aegis-safe/ns/aegis-system/sa/aegis-safe/n/`         |
//! | Workload      | `spiffe://aegis.z2h.dev/workload/`                                                  |
//!
//! Matching is byte-wise and case-sensitive with no normalization. The
//! workload prefix is an umbrella over the other two by default, so an SVID
//! can hold several roles at once; [`IdentityClassifier::primary_role`]
//! resolves the most specific one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SvidConfig;
use crate::observability::metrics;

/// Capability class an SVID proves its bearer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustRole {
    /// Aegis Sentinel, the policy/orchestrator role
    Orchestrator,
    /// Aegis Safe, the storage role
    Storage,
    /// Any workload, including sidecars fetching on its behalf
    Workload,
}

impl TrustRole {
    pub const ALL: [TrustRole; 3] =
        [TrustRole::Orchestrator, TrustRole::Storage, TrustRole::Workload];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orchestrator => "orchestrator",
            Self::Storage => "storage",
            Self::Workload => "workload",
        }
    }
}

impl fmt::Display for TrustRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prefix-based role classifier over an immutable configuration snapshot.
///
/// Every method is a pure function of its input and the prefixes captured at
/// construction, so one instance can be shared across request handlers
/// without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClassifier {
    orchestrator_prefix: String,
    storage_prefix: String,
    workload_prefix: String,
}

impl IdentityClassifier {
    /// Build a classifier from explicit prefixes.
    ///
    /// An empty prefix never matches anything.
    pub fn new(
        orchestrator_prefix: impl Into<String>,
        storage_prefix: impl Into<String>,
        workload_prefix: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator_prefix: orchestrator_prefix.into(),
            storage_prefix: storage_prefix.into(),
            workload_prefix: workload_prefix.into(),
        }
    }

    /// Build a classifier from the SVID section of the configuration.
    pub fn from_config(config: &SvidConfig) -> Self {
        Self::new(
            config.sentinel_prefix.clone(),
            config.safe_prefix.clone(),
            config.workload_prefix.clone(),
        )
    }

    /// The configured prefix for a role.
    pub fn prefix(&self, role: TrustRole) -> &str {
        match role {
            TrustRole::Orchestrator => &self.orchestrator_prefix,
            TrustRole::Storage => &self.storage_prefix,
            TrustRole::Workload => &self.workload_prefix,
        }
    }

    /// True if the SVID belongs to the orchestrator (Aegis Sentinel).
    pub fn is_orchestrator(&self, svid: &str) -> bool {
        has_prefix(svid, &self.orchestrator_prefix)
    }

    /// True if the SVID belongs to the storage role (Aegis Safe).
    pub fn is_storage(&self, svid: &str) -> bool {
        has_prefix(svid, &self.storage_prefix)
    }

    /// True if the SVID belongs to a workload.
    pub fn is_workload(&self, svid: &str) -> bool {
        has_prefix(svid, &self.workload_prefix)
    }

    pub fn has_role(&self, svid: &str, role: TrustRole) -> bool {
        has_prefix(svid, self.prefix(role))
    }

    /// Every role the SVID holds, in orchestrator, storage, workload order.
    pub fn roles(&self, svid: &str) -> Vec<TrustRole> {
        TrustRole::ALL.into_iter().filter(|role| self.has_role(svid, *role)).collect()
    }

    /// The most specific role the SVID holds: the one whose prefix is the
    /// longest match. Ties go to the earlier role in [`TrustRole::ALL`].
    pub fn primary_role(&self, svid: &str) -> Option<TrustRole> {
        let mut best: Option<(TrustRole, usize)> = None;
        for role in TrustRole::ALL {
            if !self.has_role(svid, role) {
                continue;
            }
            let len = self.prefix(role).len();
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((role, len));
            }
        }

        let role = best.map(|(role, _)| role);
        metrics::record_classification(role);
        role
    }

    /// Workload name carried by a workload SVID: the first path segment after
    /// the workload prefix.
    ///
    /// ```rust
    /// use aegis_core::identity::IdentityClassifier;
    ///
    /// let classifier = IdentityClassifier::new("", "", "spiffe://aegis.z2h.dev/workload/");
    /// let svid = "spiffe://aegis.z2h.dev/workload/billing/ns/default/sa/billing/n/node-1";
    /// assert_eq!(classifier.workload_id(svid), Some("billing"));
    /// ```
    pub fn workload_id<'a>(&self, svid: &'a str) -> Option<&'a str> {
        if self.workload_prefix.is_empty() {
            return None;
        }
        let rest = svid.strip_prefix(self.workload_prefix.as_str())?;
        let id = rest.split('/').next().unwrap_or_default();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// Role pairs whose prefixes are prefixes of one another.
    pub fn overlaps(&self) -> Vec<(TrustRole, TrustRole)> {
        let mut overlapping = Vec::new();
        for (i, a) in TrustRole::ALL.iter().enumerate() {
            for b in TrustRole::ALL.iter().skip(i + 1) {
                let (pa, pb) = (self.prefix(*a), self.prefix(*b));
                if pa.is_empty() || pb.is_empty() {
                    continue;
                }
                if pa.starts_with(pb) || pb.starts_with(pa) {
                    overlapping.push((*a, *b));
                }
            }
        }
        overlapping
    }
}

impl Default for IdentityClassifier {
    fn default() -> Self {
        Self::from_config(&SvidConfig::default())
    }
}

fn has_prefix(svid: &str, prefix: &str) -> bool {
    !prefix.is_empty() && svid.as_bytes().starts_with(prefix.as_bytes())
}
