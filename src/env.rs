use std::collections::HashMap;
use std::env as stdenv;

/// Variables the shell itself consults, such as `HOME` for `cd`.
///
/// The map is a snapshot of the process environment taken at start-up. Lookups
/// that miss the map fall back to the live process environment. Children are
/// spawned with the inherited process environment, not with this map.
///
/// The working directory is deliberately not part of this type: it is
/// process-wide state owned by the OS and changed only by `cd`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., HOME).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process variables into a new `Environment`.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The user's home directory, the target of a bare `cd`.
    pub fn home(&self) -> Option<String> {
        self.get_var("HOME")
    }
}
