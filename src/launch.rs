//! Terminal launcher dispatch
//!
//! Single exit point of the pipeline: replace the current process image with
//! the launcher. Returns only on failure, which is fatal and never retried.

use std::convert::Infallible;
use std::ffi::CString;

use log::debug;
use nix::unistd::execv;

use crate::args::LaunchPlan;
use crate::errors::{Result, WrapError};

fn cstring(s: &str) -> Result<CString> {
    CString::new(s)
        .map_err(|_| WrapError::Launch(format!("argument contains interior NUL: {:?}", s)))
}

/// Exec the launcher with the plan's argument vector.
///
/// In verbose mode the argument list (argv0 excluded) is printed to stdout
/// first, so the invocation can be inspected or replayed by hand.
pub fn exec_launcher(plan: &LaunchPlan, verbose: bool) -> Result<Infallible> {
    if verbose {
        println!("\n#### LAUNCHER ARGUMENTS ####");
        for arg in plan.args().iter().skip(1) {
            print!(" {}", arg);
        }
        println!("\n############################");
    }

    let path = cstring(&plan.launcher.to_string_lossy())?;
    let argv: Vec<CString> = plan
        .args()
        .iter()
        .map(|a| cstring(a))
        .collect::<Result<_>>()?;

    debug!("exec {} with {} arguments", plan.launcher.display(), argv.len());
    execv(&path, &argv)
        .map_err(|e| WrapError::Launch(format!("{}: {}", plan.launcher.display(), e)))
}
