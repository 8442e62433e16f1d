use crate::external::exit_code;
use std::process::Child;
use tracing::{debug, warn};

/// Children started in the background that have not been reaped yet.
///
/// Nothing ever blocks on these. [`JobTable::reap`] collects the ones that have
/// exited so they do not linger as zombies; the rest are left running.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Child>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, child: Child) {
        debug!(pid = child.id(), "background job started");
        self.jobs.push(child);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drops every job that has exited. Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), code = exit_code(status), "background job done");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "cannot poll background job");
                false
            }
        });
        before - self.jobs.len()
    }
}

impl Extend<Child> for JobTable {
    fn extend<I: IntoIterator<Item = Child>>(&mut self, iter: I) {
        iter.into_iter().for_each(|child| self.push(child));
    }
}
