//! Pipeline orchestration
//!
//! Wires the chain walk together: merge + path accumulation + per-node
//! fragments in one leaf-to-root pass, conditional cgroup placement
//! root-to-leaf, then argument assembly and the terminal exec. Everything up
//! to the exec is pure value construction against injected collaborators.

use std::convert::Infallible;
use std::path::PathBuf;

use log::debug;

use crate::args::{ArgumentBuilder, LaunchPlan, NodeArgumentGenerator};
use crate::cgroup::{self, CgroupSink};
use crate::errors::{Result, WrapError};
use crate::launch;
use crate::merge::{MergeOrder, MergedConfig};
use crate::node::{FlagState, NodeChain};
use crate::paths::PathAccumulator;
use crate::process::{expand_template, ProcessContext};

/// Invocation options resolved by the caller (CLI, typically).
#[derive(Debug, Clone)]
pub struct WrapOptions {
    /// Launcher binary to exec
    pub launcher: PathBuf,
    /// Print the assembled argument list before exec
    pub verbose: bool,
    pub merge_order: MergeOrder,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            launcher: PathBuf::from("/usr/bin/bwrap"),
            verbose: false,
            merge_order: MergeOrder::default(),
        }
    }
}

fn launcher_argv0(opts: &WrapOptions) -> String {
    opts.launcher
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| opts.launcher.to_string_lossy().into_owned())
}

/// Assemble the launch plan for a scanned chain and passthrough command.
///
/// Pure with respect to the real process: all ambient effects (identity
/// environment variables, umask, cgroup placement) go through the injected
/// collaborators. Any error aborts assembly; no partial plan escapes.
pub fn assemble(
    chain: &NodeChain,
    command: &[String],
    opts: &WrapOptions,
    generator: &mut dyn NodeArgumentGenerator,
    cgroups: &mut dyn CgroupSink,
    ctx: &mut dyn ProcessContext,
) -> Result<LaunchPlan> {
    let mut builder = ArgumentBuilder::new();
    builder.push(launcher_argv0(opts))?;

    // leaf identity, exported before any template expansion
    let leaf = chain.leaf();
    ctx.set_env("LEAF_ALIAS", &leaf.alias);
    ctx.set_env("LEAF_NAME", &leaf.name);
    ctx.set_env("LEAF_PATH", &leaf.realpath.to_string_lossy());

    // single leaf-to-root pass: merge, paths, per-node fragments
    let mut merged = MergedConfig::default();
    let mut paths = PathAccumulator::new();
    for node in chain.iter_leaf_to_root() {
        merged.merge_node(node, opts.merge_order);
        paths.push_node(node)?;
        let fragments =
            generator
                .node_args(node, node.name == leaf.name)
                .map_err(|e| match e {
                    err @ WrapError::NodeArgument { .. } => err,
                    other => WrapError::NodeArgument {
                        node: node.name.clone(),
                        reason: other.to_string(),
                    },
                })?;
        builder.push_all(fragments)?;
    }
    merged.apply_umask(ctx);

    // conditional second traversal, strictly root-first
    cgroup::apply_chain(chain, cgroups)?;

    let (path, ldpath) = paths.into_values();
    builder.push_setenv("PATH", &path)?;
    builder.push_setenv("LD_LIBRARY_PATH", &ldpath)?;

    if let Some(hostname) = &merged.hostname {
        builder.push("--unshare-uts")?;
        builder.push("--hostname")?;
        builder.push(expand_template(hostname, ctx))?;
    }

    if let Some(chdir) = &merged.chdir {
        builder.push("--chdir")?;
        builder.push(expand_template(chdir, ctx))?;
    }

    builder.push_share_flags(&merged)?;

    if merged.die_with_parent == FlagState::Enabled {
        builder.push("--die-with-parent")?;
    }
    if merged.new_session == FlagState::Enabled {
        builder.push("--new-session")?;
    }

    builder.push_all(command.iter().cloned())?;

    debug!("assembled {} launcher arguments", builder.len());
    Ok(builder.finish(opts.launcher.clone()))
}

/// Assemble and exec. Returns only on failure.
pub fn run(
    chain: &NodeChain,
    command: &[String],
    opts: &WrapOptions,
    generator: &mut dyn NodeArgumentGenerator,
    cgroups: &mut dyn CgroupSink,
    ctx: &mut dyn ProcessContext,
) -> Result<Infallible> {
    let plan = assemble(chain, command, opts, generator, cgroups, ctx)?;
    launch::exec_launcher(&plan, opts.verbose)
}
