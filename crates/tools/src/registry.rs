//! Tool registry: the catalog of everything the server can do.

use std::collections::HashMap;

use browserd_core::{Error, Result};
use tracing::{debug, warn};

use crate::dispatch::ToolHandler;
use crate::schema::ArgSpec;
use crate::{capture, interaction, navigation, utility};

/// A registered tool: name, human description, argument schema, and the
/// operation that runs when it is called.
#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgSpec],
    pub handler: ToolHandler,
}

/// Name-indexed tool table. Populated once at startup, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the complete built-in tool set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let descriptors = navigation::descriptors()
            .into_iter()
            .chain(interaction::descriptors())
            .chain(capture::descriptors())
            .chain(utility::descriptors());
        for descriptor in descriptors {
            if let Err(e) = registry.register(descriptor) {
                warn!(error = %e, "skipping built-in tool");
            }
        }
        registry
    }

    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        if self.index.contains_key(descriptor.name) {
            return Err(Error::DuplicateTool(descriptor.name.to_string()));
        }
        debug!(tool = descriptor.name, "registered tool");
        self.index.insert(descriptor.name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&ToolDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
