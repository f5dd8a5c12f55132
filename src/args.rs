//! Launcher argument assembly
//!
//! Builds the bounded, ordered argument vector handed to the launcher. The
//! capacity check runs strictly before every insertion; the vector is never
//! written past the bound and then inspected afterwards.

use std::path::PathBuf;

use crate::errors::{Result, WrapError};
use crate::merge::MergedConfig;
use crate::node::{FlagState, Node};

/// Maximum number of launcher argument slots, passthrough command included.
pub const MAX_LAUNCH_ARGS: usize = 1024;

/// Produces per-node launcher argument fragments (mount and bind rules).
///
/// Fragment generation is an external concern; the builder only inserts the
/// results in chain order. `is_leaf` marks the most specific node, which is
/// the one whose export rules typically differ.
pub trait NodeArgumentGenerator {
    fn node_args(&mut self, node: &Node, is_leaf: bool) -> Result<Vec<String>>;
}

/// Generator for chains whose nodes carry no mount rules.
#[derive(Debug, Default)]
pub struct NoNodeArgs;

impl NodeArgumentGenerator for NoNodeArgs {
    fn node_args(&mut self, _node: &Node, _is_leaf: bool) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Completed launch invocation: launcher binary plus its argument vector,
/// argv0 included. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub launcher: PathBuf,
    args: Vec<String>,
}

impl LaunchPlan {
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Bounded argument vector under construction.
#[derive(Debug)]
pub struct ArgumentBuilder {
    args: Vec<String>,
    limit: usize,
}

impl ArgumentBuilder {
    pub fn new() -> Self {
        Self::with_limit(MAX_LAUNCH_ARGS)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            args: Vec::new(),
            limit,
        }
    }

    /// Append one argument, checking capacity first.
    pub fn push(&mut self, arg: impl Into<String>) -> Result<()> {
        if self.args.len() + 1 > self.limit {
            return Err(WrapError::ArgCapacity { limit: self.limit });
        }
        self.args.push(arg.into());
        Ok(())
    }

    pub fn push_all<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.push(arg)?;
        }
        Ok(())
    }

    /// Emit `--setenv KEY VALUE` for one accumulated search path.
    pub fn push_setenv(&mut self, key: &str, value: &str) -> Result<()> {
        self.push("--setenv")?;
        self.push(key)?;
        self.push(value)
    }

    /// Emit share/unshare tokens for the six namespace flags in canonical
    /// order. Unset flags emit nothing.
    pub fn push_share_flags(&mut self, merged: &MergedConfig) -> Result<()> {
        let flags = [
            ("all", merged.share_all),
            ("user", merged.share_user),
            ("cgroup", merged.share_cgroup),
            ("ipc", merged.share_ipc),
            ("pid", merged.share_pid),
            ("net", merged.share_net),
        ];
        for (name, state) in flags {
            match state {
                FlagState::Enabled => self.push(format!("--share-{name}"))?,
                FlagState::Disabled => self.push(format!("--unshare-{name}"))?,
                FlagState::Unset => {}
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn finish(self, launcher: PathBuf) -> LaunchPlan {
        LaunchPlan {
            launcher,
            args: self.args,
        }
    }
}

impl Default for ArgumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_limit() {
        let mut builder = ArgumentBuilder::with_limit(2);
        builder.push("a").unwrap();
        builder.push("b").unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_push_over_limit_fails_before_write() {
        let mut builder = ArgumentBuilder::with_limit(2);
        builder.push("a").unwrap();
        builder.push("b").unwrap();
        let err = builder.push("c").unwrap_err();
        assert!(matches!(err, WrapError::ArgCapacity { limit: 2 }));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_push_all_stops_at_limit() {
        let mut builder = ArgumentBuilder::with_limit(2);
        assert!(builder.push_all(["a", "b", "c"]).is_err());
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_setenv_pair_shape() {
        let mut builder = ArgumentBuilder::new();
        builder.push_setenv("PATH", "a:b").unwrap();
        let plan = builder.finish(PathBuf::from("/usr/bin/bwrap"));
        assert_eq!(plan.args(), ["--setenv", "PATH", "a:b"]);
    }

    fn share_tokens(state: FlagState) -> Vec<String> {
        let merged = MergedConfig {
            share_net: state,
            ..Default::default()
        };
        let mut builder = ArgumentBuilder::new();
        builder.push_share_flags(&merged).unwrap();
        builder.finish(PathBuf::from("bwrap")).args().to_vec()
    }

    #[test]
    fn test_share_flag_tristate_tokens() {
        assert_eq!(share_tokens(FlagState::Enabled), ["--share-net"]);
        assert_eq!(share_tokens(FlagState::Disabled), ["--unshare-net"]);
        assert!(share_tokens(FlagState::Unset).is_empty());
    }

    #[test]
    fn test_share_flags_canonical_order() {
        let merged = MergedConfig {
            share_all: FlagState::Disabled,
            share_user: FlagState::Enabled,
            share_ipc: FlagState::Disabled,
            share_net: FlagState::Enabled,
            ..Default::default()
        };
        let mut builder = ArgumentBuilder::new();
        builder.push_share_flags(&merged).unwrap();
        assert_eq!(
            builder.finish(PathBuf::from("bwrap")).args(),
            ["--unshare-all", "--share-user", "--unshare-ipc", "--share-net"]
        );
    }

    #[test]
    fn test_disabled_ipc_spells_ipc() {
        let merged = MergedConfig {
            share_ipc: FlagState::Disabled,
            ..Default::default()
        };
        let mut builder = ArgumentBuilder::new();
        builder.push_share_flags(&merged).unwrap();
        assert_eq!(builder.finish(PathBuf::from("bwrap")).args(), ["--unshare-ipc"]);
    }
}
