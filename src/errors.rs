//! Error types for wrapper operations

use std::io;
use thiserror::Error;

/// Result type for wrapper operations
pub type Result<T> = std::result::Result<T, WrapError>;

/// Errors that can occur while assembling or dispatching a launch.
///
/// Every variant is fatal: nothing is retried and no partial launch is
/// attempted. The binary logs the error and exits non-zero.
#[derive(Error, Debug)]
pub enum WrapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Node chain scan failed: {0}")]
    Scan(String),

    #[error("Malformed node chain: {0}")]
    Merge(String),

    #[error("Environment buffer overflow for {key}: limit {limit} bytes")]
    EnvOverflow { key: &'static str, limit: usize },

    #[error("Launcher argument capacity exceeded: limit {limit}")]
    ArgCapacity { limit: usize },

    #[error("Argument generation failed for node {node}: {reason}")]
    NodeArgument { node: String, reason: String },

    #[error("Cgroup error: {0}")]
    Cgroup(String),

    #[error("Launcher exec failed: {0}")]
    Launch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WrapError::EnvOverflow {
            key: "PATH",
            limit: 4096,
        };
        assert_eq!(
            err.to_string(),
            "Environment buffer overflow for PATH: limit 4096 bytes"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let wrap_err = WrapError::from(io_err);
        assert!(wrap_err.to_string().contains("IO error"));
    }

    #[test]
    fn test_arg_capacity_names_limit() {
        let err = WrapError::ArgCapacity { limit: 1024 };
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_node_argument_names_node() {
        let err = WrapError::NodeArgument {
            node: "leaf".to_string(),
            reason: "bad mount".to_string(),
        };
        assert!(err.to_string().contains("leaf"));
        assert!(err.to_string().contains("bad mount"));
    }
}
