//! Linking policy: which blocker → blocked pairs may be connected.
//!
//! # Overview
//!
//! [`can_link`] is a pure function of two tasks and a [`PolicyConfig`]. It
//! never fails; a rejection comes back as a [`LinkDecision`] carrying a
//! [`RejectReason`] whose `Display` is the human-readable message surfaced
//! by callers.
//!
//! Evaluation order:
//!
//! 1. Self links are always rejected (empty blocker id counts as a self link).
//! 2. The domain gate: when both tasks declare a domain they must match,
//!    whatever the configured policy.
//! 3. The configured [`LinkPolicy`] variant decides based on shared kind,
//!    shared epic and, for [`LinkPolicy::WhitelistCrossKind`], the
//!    directional cross-kind whitelist.
//!
//! # Default configuration
//!
//! [`PolicyConfig::default`] is [`LinkPolicy::SameEpicOrSameKind`] with the
//! `Comms → Dev` and `Product → Dev` whitelist pairs. It is a plain value:
//! build it once at startup (usually from [`crate::config`]) and pass it to
//! whatever orchestrates linking.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Task;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The closed set of linking policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Only tasks of the same kind may be linked.
    StrictSameKind,
    /// Same kind, or same epic.
    SameEpicOrSameKind,
    /// Same kind, same epic, or a whitelisted (blocker kind, blocked kind) pair.
    WhitelistCrossKind,
}

impl LinkPolicy {
    pub const ALL: [Self; 3] = [
        Self::StrictSameKind,
        Self::SameEpicOrSameKind,
        Self::WhitelistCrossKind,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrictSameKind => "strict_same_kind",
            Self::SameEpicOrSameKind => "same_epic_or_same_kind",
            Self::WhitelistCrossKind => "whitelist_cross_kind",
        }
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::SameEpicOrSameKind
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered `(blocker kind, blocked kind)` pair allowed across kinds.
///
/// Serialized as a two-element array: `["Comms", "Dev"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindPair(pub String, pub String);

impl KindPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self(from.into(), to.into())
    }

    #[must_use]
    pub fn from_kind(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn to_kind(&self) -> &str {
        &self.1
    }
}

/// Policy variant plus the whitelist consulted by `WhitelistCrossKind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub policy: LinkPolicy,
    #[serde(default = "default_cross_kind_whitelist")]
    pub cross_kind_whitelist: Vec<KindPair>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy: LinkPolicy::default(),
            cross_kind_whitelist: default_cross_kind_whitelist(),
        }
    }
}

impl PolicyConfig {
    /// A config with the given policy and an empty whitelist.
    #[must_use]
    pub const fn new(policy: LinkPolicy) -> Self {
        Self {
            policy,
            cross_kind_whitelist: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_whitelist<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = KindPair>,
    {
        self.cross_kind_whitelist = pairs.into_iter().collect();
        self
    }

    /// Directional whitelist membership: `(from, to)` does not imply `(to, from)`.
    #[must_use]
    pub fn is_whitelisted(&self, from: &str, to: &str) -> bool {
        self.cross_kind_whitelist
            .iter()
            .any(|pair| pair.from_kind() == from && pair.to_kind() == to)
    }
}

fn default_cross_kind_whitelist() -> Vec<KindPair> {
    vec![KindPair::new("Comms", "Dev"), KindPair::new("Product", "Dev")]
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Why a prospective edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    SelfLink,
    DifferentDomains,
    MustShareKind,
    NeitherSameKindNorSameEpic,
    CrossKindNotWhitelisted,
}

impl RejectReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SelfLink => "self-link forbidden",
            Self::DifferentDomains => "different domains",
            Self::MustShareKind => "must share kind",
            Self::NeitherSameKindNorSameEpic => "neither same kind nor same epic/project",
            Self::CrossKindNotWhitelisted => "cross-kind not whitelisted",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of [`can_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkDecision {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl LinkDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    #[must_use]
    pub const fn reject(reason: RejectReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }

    /// Convert into a `Result`, handy for `?` chains.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason when the decision is a rejection.
    pub const fn into_result(self) -> Result<(), RejectReason> {
        match self.reason {
            Some(reason) if !self.ok => Err(reason),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Decide whether `blocker → blocked` is permitted under `config`.
#[must_use]
pub fn can_link(blocker: &Task, blocked: &Task, config: &PolicyConfig) -> LinkDecision {
    if blocker.id.is_empty() || blocker.id == blocked.id {
        return LinkDecision::reject(RejectReason::SelfLink);
    }

    if let (Some(a), Some(b)) = (blocker.domain(), blocked.domain()) {
        if a != b {
            return LinkDecision::reject(RejectReason::DifferentDomains);
        }
    }

    let same_kind = matches!((blocker.kind(), blocked.kind()), (Some(a), Some(b)) if a == b);
    let same_epic = matches!((blocker.epic_id(), blocked.epic_id()), (Some(a), Some(b)) if a == b);

    match config.policy {
        LinkPolicy::StrictSameKind => {
            if same_kind {
                LinkDecision::allow()
            } else {
                LinkDecision::reject(RejectReason::MustShareKind)
            }
        }
        LinkPolicy::SameEpicOrSameKind => {
            if same_kind || same_epic {
                LinkDecision::allow()
            } else {
                LinkDecision::reject(RejectReason::NeitherSameKindNorSameEpic)
            }
        }
        LinkPolicy::WhitelistCrossKind => {
            if same_kind || same_epic {
                return LinkDecision::allow();
            }
            match (blocker.kind(), blocked.kind()) {
                (Some(from), Some(to)) if config.is_whitelisted(from, to) => LinkDecision::allow(),
                _ => LinkDecision::reject(RejectReason::CrossKindNotWhitelisted),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
