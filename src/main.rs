//! boxwrap CLI - merge a sandbox-context chain and exec the launcher

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use console::style;
use env_logger::{Builder, Env};
use log::{error, Level, LevelFilter};

use boxwrap::{
    controller, CgroupManager, JsonChainScanner, MergeOrder, NoNodeArgs, SystemProcessContext,
    TreeScanner, WrapOptions,
};

#[derive(Parser)]
#[command(name = "boxwrap")]
#[command(version, about = "Merge a nested sandbox-context chain and exec the launcher", long_about = None)]
struct Cli {
    /// Chain file describing the context nodes, leaf first
    #[arg(short, long, value_name = "FILE")]
    chain: PathBuf,

    /// Launcher binary to exec
    #[arg(short, long, value_name = "PATH", default_value = "/usr/bin/bwrap")]
    launcher: PathBuf,

    /// Let a node's own settings win over its admin override
    #[arg(long)]
    settings_first: bool,

    /// Show verbose output and dump the assembled argument list
    #[arg(short, long)]
    verbose: bool,

    /// Command to run inside the sandbox
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let env = Env::default().filter_or("RUST_LOG", if verbose { "debug" } else { "warn" });

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => format!("{}", style("ERROR").red().bold()),
                Level::Warn => format!("{}", style("WARN ").yellow().bold()),
                Level::Info => format!("{}", style("INFO ").green()),
                Level::Debug => format!("{}", style("DEBUG").cyan()),
                Level::Trace => format!("{}", style("TRACE").dim()),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let opts = WrapOptions {
        launcher: cli.launcher,
        verbose: cli.verbose,
        merge_order: if cli.settings_first {
            MergeOrder::SettingsFirst
        } else {
            MergeOrder::AdminFirst
        },
    };

    let chain = match JsonChainScanner.scan(&cli.chain) {
        Ok(chain) => chain,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // returns only on failure
    let err = match controller::run(
        &chain,
        &cli.command,
        &opts,
        &mut NoNodeArgs,
        &mut CgroupManager::new(),
        &mut SystemProcessContext,
    ) {
        Err(e) => e,
        Ok(never) => match never {},
    };
    error!("{}", err);
    eprintln!("{} {}", style("error:").red().bold(), err);
    std::process::exit(1);
}
