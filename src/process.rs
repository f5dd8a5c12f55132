//! Process-context effects
//!
//! The merge and build steps stay pure; the few ambient mutations they need
//! (environment variables for template expansion, the file-creation mask at
//! the root node) go through this injected abstraction so tests can record
//! them instead of touching the real process.

use nix::sys::stat::{umask, Mode};

/// Ambient process state touched by the pipeline.
pub trait ProcessContext {
    fn set_env(&mut self, key: &str, value: &str);
    fn get_env(&self, key: &str) -> Option<String>;
    fn set_umask(&mut self, mask: u32);
}

/// Real process context: std env plus `umask(2)`.
#[derive(Debug, Default)]
pub struct SystemProcessContext;

impl ProcessContext for SystemProcessContext {
    fn set_env(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn get_env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_umask(&mut self, mask: u32) {
        umask(Mode::from_bits_truncate(mask));
    }
}

/// Expand `$VAR` and `${VAR}` references against the process context.
///
/// Unknown variables expand to the empty string; a `$` not followed by a
/// variable name is kept literally.
pub fn expand_template(template: &str, ctx: &dyn ProcessContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let braced = matches!(chars.peek(), Some((_, '{')));
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&(_, nc)) = chars.peek() {
            if nc.is_ascii_alphanumeric() || nc == '_' {
                name.push(nc);
                chars.next();
            } else {
                break;
            }
        }
        if braced {
            if matches!(chars.peek(), Some((_, '}'))) {
                chars.next();
            }
        }
        if name.is_empty() {
            out.push('$');
            continue;
        }
        if let Some(value) = ctx.get_env(&name) {
            out.push_str(&value);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ProcessContext;
    use std::collections::HashMap;

    /// Records effects instead of performing them.
    #[derive(Debug, Default)]
    pub struct FakeProcessContext {
        pub env: HashMap<String, String>,
        pub umasks: Vec<u32>,
    }

    impl ProcessContext for FakeProcessContext {
        fn set_env(&mut self, key: &str, value: &str) {
            self.env.insert(key.to_string(), value.to_string());
        }

        fn get_env(&self, key: &str) -> Option<String> {
            self.env.get(key).cloned()
        }

        fn set_umask(&mut self, mask: u32) {
            self.umasks.push(mask);
        }
    }
}
