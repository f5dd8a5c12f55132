//! Chain configuration merge
//!
//! One leaf-to-root walk folds every node's settings into a single
//! `MergedConfig`. Precedence is first-assignment-wins: a field resolved by a
//! more specific node is never overwritten further up the chain. Downstream
//! steps only read the merged result, never the raw per-node flags.

use log::debug;

use crate::node::{FlagState, Node, NodeSettings};
use crate::process::ProcessContext;

/// Which block wins within a single node.
///
/// The original behavior copied administrator overrides after the node's own
/// settings under a skip-if-set merge, silently losing administrator intent.
/// `AdminFirst` is the default; `SettingsFirst` reproduces the old ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeOrder {
    #[default]
    AdminFirst,
    SettingsFirst,
}

/// Accumulated configuration for one invocation, built exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    pub hostname: Option<String>,
    pub chdir: Option<String>,
    pub share_all: FlagState,
    pub share_user: FlagState,
    pub share_cgroup: FlagState,
    pub share_ipc: FlagState,
    pub share_pid: FlagState,
    pub share_net: FlagState,
    pub die_with_parent: FlagState,
    pub new_session: FlagState,
    pub umask: Option<u32>,
}

fn fill_opt<T: Clone>(slot: &mut Option<T>, candidate: &Option<T>) {
    if slot.is_none() {
        *slot = candidate.clone();
    }
}

fn fill_flag(slot: &mut FlagState, candidate: FlagState) {
    if !slot.is_set() {
        *slot = candidate;
    }
}

impl MergedConfig {
    /// Fold one node in: its admin override and its own settings, in the
    /// order the policy dictates.
    pub fn merge_node(&mut self, node: &Node, order: MergeOrder) {
        debug!("merging settings of node {}", node.name);
        match order {
            MergeOrder::AdminFirst => {
                if let Some(admin) = &node.admin {
                    self.merge_settings(admin);
                }
                self.merge_settings(&node.settings);
            }
            MergeOrder::SettingsFirst => {
                self.merge_settings(&node.settings);
                if let Some(admin) = &node.admin {
                    self.merge_settings(admin);
                }
            }
        }
    }

    /// Apply the resolved file-creation mask, if any, to the ambient
    /// process. The single point where the merge touches global state;
    /// called once, after the root node has been folded in.
    pub fn apply_umask(&self, ctx: &mut dyn ProcessContext) {
        if let Some(mask) = self.umask {
            debug!("applying umask {:#o} resolved by the chain", mask);
            ctx.set_umask(mask);
        }
    }

    /// Fold one settings block in, keeping already-resolved fields.
    fn merge_settings(&mut self, settings: &NodeSettings) {
        fill_opt(&mut self.hostname, &settings.hostname);
        fill_opt(&mut self.chdir, &settings.chdir);
        fill_flag(&mut self.share_all, settings.share_all);
        fill_flag(&mut self.share_user, settings.share_user);
        fill_flag(&mut self.share_cgroup, settings.share_cgroup);
        fill_flag(&mut self.share_ipc, settings.share_ipc);
        fill_flag(&mut self.share_pid, settings.share_pid);
        fill_flag(&mut self.share_net, settings.share_net);
        fill_flag(&mut self.die_with_parent, settings.die_with_parent);
        fill_flag(&mut self.new_session, settings.new_session);
        fill_opt(&mut self.umask, &settings.umask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeChain;
    use crate::process::test_support::FakeProcessContext;

    fn fold(chain: &NodeChain, order: MergeOrder, ctx: &mut FakeProcessContext) -> MergedConfig {
        let mut merged = MergedConfig::default();
        for node in chain.iter_leaf_to_root() {
            merged.merge_node(node, order);
        }
        merged.apply_umask(ctx);
        merged
    }

    fn merge(chain: &NodeChain) -> MergedConfig {
        fold(chain, MergeOrder::AdminFirst, &mut FakeProcessContext::default())
    }

    #[test]
    fn test_leaf_wins_over_root() {
        let mut root = Node::new("root", "/root");
        root.settings.hostname = Some("root-host".to_string());
        let mut leaf = Node::new("leaf", "/leaf");
        leaf.settings.hostname = Some("leaf-host".to_string());
        let chain = NodeChain::new(vec![root, leaf]).unwrap();

        for _ in 0..3 {
            assert_eq!(merge(&chain).hostname.as_deref(), Some("leaf-host"));
        }
    }

    #[test]
    fn test_unset_flag_resolved_by_ancestor() {
        let mut root = Node::new("root", "/root");
        root.settings.share_net = FlagState::Disabled;
        let leaf = Node::new("leaf", "/leaf");
        let chain = NodeChain::new(vec![root, leaf]).unwrap();
        assert_eq!(merge(&chain).share_net, FlagState::Disabled);
    }

    #[test]
    fn test_leaf_flag_shadows_ancestor() {
        let mut root = Node::new("root", "/root");
        root.settings.share_net = FlagState::Disabled;
        let mut leaf = Node::new("leaf", "/leaf");
        leaf.settings.share_net = FlagState::Enabled;
        let chain = NodeChain::new(vec![root, leaf]).unwrap();
        assert_eq!(merge(&chain).share_net, FlagState::Enabled);
    }

    #[test]
    fn test_admin_first_beats_node_settings() {
        let mut node = Node::new("only", "/only");
        node.settings.chdir = Some("/from-settings".to_string());
        node.admin = Some(crate::node::NodeSettings {
            chdir: Some("/from-admin".to_string()),
            ..Default::default()
        });
        let chain = NodeChain::new(vec![node]).unwrap();

        let merged = fold(
            &chain,
            MergeOrder::AdminFirst,
            &mut FakeProcessContext::default(),
        );
        assert_eq!(merged.chdir.as_deref(), Some("/from-admin"));

        let merged = fold(
            &chain,
            MergeOrder::SettingsFirst,
            &mut FakeProcessContext::default(),
        );
        assert_eq!(merged.chdir.as_deref(), Some("/from-settings"));
    }

    #[test]
    fn test_umask_applied_once() {
        let mut root = Node::new("root", "/root");
        root.settings.umask = Some(0o027);
        let leaf = Node::new("leaf", "/leaf");
        let chain = NodeChain::new(vec![root, leaf]).unwrap();

        let mut ctx = FakeProcessContext::default();
        fold(&chain, MergeOrder::AdminFirst, &mut ctx);
        assert_eq!(ctx.umasks, [0o027]);
    }

    #[test]
    fn test_no_umask_no_effect() {
        let chain = NodeChain::new(vec![Node::new("root", "/root")]).unwrap();
        let mut ctx = FakeProcessContext::default();
        fold(&chain, MergeOrder::AdminFirst, &mut ctx);
        assert!(ctx.umasks.is_empty());
    }
}
