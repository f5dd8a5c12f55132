//! Cgroup v2 placement for chain nodes
//!
//! Nodes may request placement into a resource-control group. Placement is
//! hierarchical: ancestor groups must exist before descendant groups are
//! created inside them, so application walks the chain strictly root-first.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, WrapError};
use crate::node::NodeChain;

const CGROUP_V2_ROOT: &str = "/sys/fs/cgroup";

/// Cgroup v2 resource limits requested by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CgroupSpec {
    pub memory_max: Option<u64>,
    pub cpu_weight: Option<u32>,
    pub cpu_max: Option<u64>,
    pub pids_max: Option<u32>,
}

impl CgroupSpec {
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.memory_max {
            if limit == 0 {
                return Err(WrapError::Cgroup(
                    "memory_max must be greater than 0".to_string(),
                ));
            }
        }
        if let Some(weight) = self.cpu_weight {
            if !(1..=10000).contains(&weight) {
                return Err(WrapError::Cgroup(
                    "cpu_weight must be between 1-10000".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Places a node into a resource-control group.
///
/// The real implementation writes the cgroup v2 filesystem; tests record
/// invocations to assert ordering.
pub trait CgroupSink {
    fn place(&mut self, spec: &CgroupSpec, node_realpath: &Path) -> Result<()>;
}

/// Cgroup v2 filesystem sink.
pub struct CgroupManager {
    root: PathBuf,
}

fn cgroup_root_path() -> PathBuf {
    std::env::var("BOXWRAP_CGROUP_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CGROUP_V2_ROOT))
}

impl CgroupManager {
    pub fn new() -> Self {
        Self {
            root: cgroup_root_path(),
        }
    }

    /// Sink backed by an arbitrary directory (for testing).
    #[doc(hidden)]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Group directory for a node, mirroring its real location under the
    /// cgroup root so descendant groups live inside their ancestor's group.
    fn group_dir(&self, node_realpath: &Path) -> PathBuf {
        self.root
            .join(node_realpath.strip_prefix("/").unwrap_or(node_realpath))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| WrapError::Cgroup(format!("Failed to open {}: {}", path.display(), e)))?;
        write!(file, "{}", content).map_err(|e| {
            WrapError::Cgroup(format!("Failed to write to {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

impl Default for CgroupManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CgroupSink for CgroupManager {
    fn place(&mut self, spec: &CgroupSpec, node_realpath: &Path) -> Result<()> {
        spec.validate()?;
        let dir = self.group_dir(node_realpath);
        fs::create_dir_all(&dir).map_err(|e| {
            WrapError::Cgroup(format!("Failed to create cgroup {}: {}", dir.display(), e))
        })?;
        if let Some(memory) = spec.memory_max {
            self.write_file(&dir.join("memory.max"), &memory.to_string())?;
        }
        if let Some(weight) = spec.cpu_weight {
            self.write_file(&dir.join("cpu.weight"), &weight.to_string())?;
        }
        if let Some(quota) = spec.cpu_max {
            self.write_file(&dir.join("cpu.max"), &quota.to_string())?;
        }
        if let Some(pids) = spec.pids_max {
            self.write_file(&dir.join("pids.max"), &pids.to_string())?;
        }
        Ok(())
    }
}

/// Apply requested cgroup placements for the whole chain, root-first.
///
/// Does nothing unless at least one node carries a spec. Any sink failure
/// aborts the invocation; already-placed groups are not rolled back.
pub fn apply_chain(chain: &NodeChain, sink: &mut dyn CgroupSink) -> Result<()> {
    if !chain.iter_root_to_leaf().any(|n| n.settings.cgroup.is_some()) {
        return Ok(());
    }
    debug!("placing chain nodes into cgroups");
    for node in chain.iter_root_to_leaf() {
        if let Some(spec) = &node.settings.cgroup {
            debug!("cgroup placement for node {}", node.name);
            sink.place(spec, &node.realpath)?;
        }
    }
    Ok(())
}
