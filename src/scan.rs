//! Chain loading
//!
//! Real context discovery (walking nested context directories on disk) is an
//! external collaborator behind the `TreeScanner` trait. The JSON loader here
//! is the minimal built-in scanner: it reads a file describing the node list
//! leaf-to-root, which is enough to drive the wrapper standalone and in tests.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::errors::{Result, WrapError};
use crate::node::{Node, NodeChain, TreeScanner};

#[derive(Debug, Deserialize)]
struct ChainFile {
    /// Nodes ordered leaf first, root last.
    nodes: Vec<Node>,
}

/// Loads a node chain from a JSON chain file.
#[derive(Debug, Default)]
pub struct JsonChainScanner;

impl TreeScanner for JsonChainScanner {
    fn scan(&self, context_path: &Path) -> Result<NodeChain> {
        let raw = fs::read_to_string(context_path).map_err(|e| {
            WrapError::Scan(format!("cannot read {}: {}", context_path.display(), e))
        })?;
        let file: ChainFile = serde_json::from_str(&raw).map_err(|e| {
            WrapError::Scan(format!("cannot parse {}: {}", context_path.display(), e))
        })?;
        debug!(
            "scanned {} nodes from {}",
            file.nodes.len(),
            context_path.display()
        );
        NodeChain::from_leaf_to_root(file.nodes)
    }
}
