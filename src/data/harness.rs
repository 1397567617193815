//! Launch configurations ("harnesses")
//!
//! A harness names an external tool invocation: command and prompt templates plus
//! the model and execution-mode identifiers it supports.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harness {
    pub name: String,
    /// Command template; sees every prompt placeholder plus `{{prompt}}`
    pub command: String,
    /// Prompt template rendered before the command
    #[serde(default)]
    pub prompt: String,
    /// Supported model ids; may contain `provider/*`, `*` or `all` tokens
    #[serde(default)]
    pub models: Vec<String>,
    /// Supported execution modes
    #[serde(default)]
    pub agents: Vec<String>,
}

impl Harness {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            prompt: String::new(),
            models: Vec::new(),
            agents: Vec::new(),
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Execution modes with duplicates and blanks removed, first occurrence wins
    pub fn execution_modes(&self) -> Vec<String> {
        dedup_preserving_order(self.agents.iter().cloned())
    }
}

/// Remove blank and repeated entries while keeping the first occurrence in place
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}
