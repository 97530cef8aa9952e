//! Input sources and the GitHub workflow context

pub mod context;

pub use context::WorkflowContext;

use crate::traits::InputSource;
use std::collections::HashMap;

/// Input source backed by the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvInputs;

impl InputSource for EnvInputs {
    fn get(&self, key: &str) -> String {
        std::env::var(key).unwrap_or_default()
    }
}

impl InputSource for HashMap<String, String> {
    fn get(&self, key: &str) -> String {
        HashMap::get(self, key).cloned().unwrap_or_default()
    }
}

impl InputSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> String {
        HashMap::get(self, key).map(|v| v.to_string()).unwrap_or_default()
    }
}
