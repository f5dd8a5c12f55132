//! Bounded search-path accumulation
//!
//! Each node contributes PATH and LD_LIBRARY_PATH fragments; the accumulated
//! values are handed to the launcher as environment variables. The buffers
//! carry a hard byte limit and every append is checked before it writes, so
//! a too-long chain fails cleanly instead of truncating.

use crate::errors::{Result, WrapError};
use crate::node::Node;

/// Maximum length in bytes of one accumulated environment variable value.
pub const MAX_ENV_VAR_LEN: usize = 4096;

const SEPARATOR: char = ':';

/// Growable string with a fixed capacity, fragments joined by `:`.
#[derive(Debug)]
pub struct EnvBuffer {
    key: &'static str,
    value: String,
    limit: usize,
}

impl EnvBuffer {
    pub fn new(key: &'static str) -> Self {
        Self::with_limit(key, MAX_ENV_VAR_LEN)
    }

    pub fn with_limit(key: &'static str, limit: usize) -> Self {
        Self {
            key,
            value: String::new(),
            limit,
        }
    }

    /// Append one fragment, joining with the separator when the buffer is
    /// non-empty. Fails before writing anything if the result would exceed
    /// the limit.
    pub fn append(&mut self, fragment: &str) -> Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        let sep_len = if self.value.is_empty() { 0 } else { 1 };
        if self.value.len() + sep_len + fragment.len() > self.limit {
            return Err(WrapError::EnvOverflow {
                key: self.key,
                limit: self.limit,
            });
        }
        if sep_len == 1 {
            self.value.push(SEPARATOR);
        }
        self.value.push_str(fragment);
        Ok(())
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// Accumulates both launcher search paths across one leaf-to-root walk.
#[derive(Debug)]
pub struct PathAccumulator {
    path: EnvBuffer,
    ldpath: EnvBuffer,
}

impl PathAccumulator {
    pub fn new() -> Self {
        Self {
            path: EnvBuffer::new("PATH"),
            ldpath: EnvBuffer::new("LD_LIBRARY_PATH"),
        }
    }

    /// Fold one node's fragments into both buffers.
    pub fn push_node(&mut self, node: &Node) -> Result<()> {
        for fragment in &node.settings.path {
            self.path.append(fragment)?;
        }
        for fragment in &node.settings.ldpath {
            self.ldpath.append(fragment)?;
        }
        Ok(())
    }

    /// Finished `(PATH, LD_LIBRARY_PATH)` values.
    pub fn into_values(self) -> (String, String) {
        (self.path.into_value(), self.ldpath.into_value())
    }
}

impl Default for PathAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_join_with_colon() {
        let mut buf = EnvBuffer::new("PATH");
        buf.append("a").unwrap();
        buf.append("b").unwrap();
        buf.append("c").unwrap();
        assert_eq!(buf.as_str(), "a:b:c");
    }

    #[test]
    fn test_empty_fragment_ignored() {
        let mut buf = EnvBuffer::new("PATH");
        buf.append("a").unwrap();
        buf.append("").unwrap();
        buf.append("b").unwrap();
        assert_eq!(buf.as_str(), "a:b");
    }

    #[test]
    fn test_overflow_boundary() {
        let mut buf = EnvBuffer::with_limit("PATH", 3);
        buf.append("ab").unwrap();
        // "ab" + ":" + "x" would be 4 bytes, one over
        let err = buf.append("x").unwrap_err();
        assert!(matches!(err, WrapError::EnvOverflow { key: "PATH", .. }));
        // buffer untouched by the failed append
        assert_eq!(buf.as_str(), "ab");
    }

    #[test]
    fn test_exact_fit_accepted() {
        let mut buf = EnvBuffer::with_limit("PATH", 3);
        buf.append("a").unwrap();
        buf.append("b").unwrap();
        assert_eq!(buf.as_str(), "a:b");
    }

    #[test]
    fn test_accumulator_chain_order() {
        let mut acc = PathAccumulator::new();
        for (name, frag) in [("leaf", "a"), ("mid", "b"), ("root", "c")] {
            let mut node = Node::new(name, "/x");
            node.settings.path = vec![frag.to_string()];
            node.settings.ldpath = vec![format!("lib-{frag}")];
            acc.push_node(&node).unwrap();
        }
        let (path, ldpath) = acc.into_values();
        assert_eq!(path, "a:b:c");
        assert_eq!(ldpath, "lib-a:lib-b:lib-c");
    }
}
