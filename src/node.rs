//! Node chain data model
//!
//! A node is one level of a configuration inheritance chain: a specific
//! execution context inheriting from progressively more general ancestors up
//! to a root with no ancestor. The chain is produced by an external scanner
//! and is read-only afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cgroup::CgroupSpec;
use crate::errors::{Result, WrapError};

/// Tri-state setting: distinguishes "not specified" from an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl FlagState {
    pub fn is_set(&self) -> bool {
        *self != FlagState::Unset
    }
}

/// Per-node isolation and environment settings.
///
/// All fields default to "not specified" so a node only influences the merge
/// for the fields it actually sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// PATH fragments, in order
    pub path: Vec<String>,
    /// LD_LIBRARY_PATH fragments, in order
    pub ldpath: Vec<String>,
    /// Hostname template, may reference $LEAF_* variables
    pub hostname: Option<String>,
    /// Working directory template, may reference $LEAF_* variables
    pub chdir: Option<String>,
    pub share_all: FlagState,
    pub share_user: FlagState,
    pub share_cgroup: FlagState,
    pub share_ipc: FlagState,
    pub share_pid: FlagState,
    pub share_net: FlagState,
    /// Cgroup placement for this node, applied root-first
    pub cgroup: Option<CgroupSpec>,
    pub die_with_parent: FlagState,
    pub new_session: FlagState,
    /// Process file-creation mask, applied once at the root
    pub umask: Option<u32>,
}

/// One level of the configuration chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub alias: String,
    /// Resolved real filesystem location of this context
    pub realpath: PathBuf,
    pub settings: NodeSettings,
    /// Administrator override block, merged with its own precedence
    #[serde(default)]
    pub admin: Option<NodeSettings>,
}

impl Node {
    pub fn new(name: &str, realpath: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            alias: name.to_string(),
            realpath: realpath.into(),
            settings: NodeSettings::default(),
            admin: None,
        }
    }
}

/// Ordered, validated node chain.
///
/// Stored root-to-leaf as an owned sequence; neighbor lookup is by index, so
/// ancestor/child references cannot dangle and a cyclic scan result (which
/// would surface as a repeated node) is rejected at construction.
#[derive(Debug, Clone)]
pub struct NodeChain {
    nodes: Vec<Node>,
}

impl NodeChain {
    /// Build a chain from nodes ordered root-to-leaf.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(WrapError::Merge("empty node chain".to_string()));
        }
        for (idx, node) in nodes.iter().enumerate() {
            if nodes[..idx].iter().any(|n| n.name == node.name) {
                return Err(WrapError::Merge(format!(
                    "node {} appears twice in the chain (cyclic scan result?)",
                    node.name
                )));
            }
        }
        Ok(Self { nodes })
    }

    /// Build a chain from nodes ordered leaf-to-root, as scanners discover
    /// them.
    pub fn from_leaf_to_root(mut nodes: Vec<Node>) -> Result<Self> {
        nodes.reverse();
        Self::new(nodes)
    }

    /// The node with no ancestor.
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// The most specific node.
    pub fn leaf(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Chains are never empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Walk from the leaf up to the root (merge order).
    pub fn iter_leaf_to_root(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().rev()
    }

    /// Walk from the root down to the leaf (cgroup placement order).
    pub fn iter_root_to_leaf(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

/// Discovers the node chain for a context path.
///
/// Tree scanning is an external concern; the core only consumes the result.
pub trait TreeScanner {
    fn scan(&self, context_path: &Path) -> Result<NodeChain>;
}
