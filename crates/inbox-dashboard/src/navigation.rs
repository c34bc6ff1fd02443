//! Client-side navigation.

use std::sync::{Mutex, PoisonError};

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Navigator that keeps the visited paths in memory.
#[derive(Debug, Default)]
pub struct History {
    paths: Mutex<Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.paths().last().cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
