//! Tool registry for dynamic dispatch by name.

use schemars::Schema;
use serde::Serialize;
use serde_json::Value;
use smartlead_async::{Gateway, Method};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{RegistryError, ToolError};
use crate::fmt::{ToolResponse, format_error, format_success};
use crate::tool::{Category, EndpointTool, Tool, ToolInput, ToolSpec};

/// Registry of tools keyed by name.
pub struct ToolRegistry {
    map: BTreeMap<&'static str, Arc<dyn Tool>>,
}

/// Serializable listing entry for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: &'static str,
    /// Short title
    pub title: &'static str,
    /// What the tool does
    pub description: &'static str,
    /// Tool family
    pub category: Category,
    /// HTTP method of the underlying endpoint
    pub method: Method,
    /// Backend target
    pub target: &'static str,
    /// Path template
    pub path: &'static str,
    /// JSON schema of the input
    pub input_schema: Schema,
}

impl ToolRegistry {
    /// Create a new registry builder bound to a gateway.
    #[must_use]
    pub fn builder(gateway: Arc<Gateway>) -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            gateway,
            items: Vec::new(),
        }
    }

    /// List all tool names, sorted.
    #[must_use]
    pub fn list_names(&self) -> Vec<&'static str> {
        self.map.keys().copied().collect()
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.map.get(name)
    }

    /// Check if a tool is registered by name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Get the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Create a subset registry containing only the specified tools.
    ///
    /// Tools not found in the registry are silently ignored.
    #[must_use]
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let allowed: HashSet<&str> = names.into_iter().collect();
        let map = self
            .map
            .iter()
            .filter(|(k, _)| allowed.contains(**k))
            .map(|(k, v)| (*k, Arc::clone(v)))
            .collect();
        Self { map }
    }

    /// Tools in name order.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.map.values()
    }

    /// Tools of one category, in name order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools().filter(move |t| t.spec().category == category)
    }

    /// Listing entries for every tool, by category then name.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        Category::ALL
            .iter()
            .flat_map(|c| self.in_category(*c))
            .map(|t| {
                let spec = t.spec();
                ToolDescriptor {
                    name: spec.name,
                    title: spec.title,
                    description: spec.description,
                    category: spec.category,
                    method: spec.endpoint.method,
                    target: spec.endpoint.target,
                    path: spec.endpoint.path,
                    input_schema: t.input_schema(),
                }
            })
            .collect()
    }

    /// Dispatch a tool call using JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for an unregistered name, otherwise
    /// whatever the tool returns.
    pub async fn dispatch_json(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .map
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = name, "dispatching tool call");
        tool.call_json(args).await
    }

    /// Dispatch a tool call and render the outcome as a [`ToolResponse`].
    ///
    /// Never fails: errors become `isError` responses.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolResponse {
        match self.dispatch_json(name, args).await {
            Ok(payload) => match self.map.get(name) {
                Some(tool) => format_success(tool.spec(), &payload),
                None => format_error(&ToolError::UnknownTool(name.to_string())),
            },
            Err(e) => {
                warn!(tool = name, kind = %e.kind(), error = %e, "tool call failed");
                format_error(&e)
            }
        }
    }
}

/// Builder for constructing a [`ToolRegistry`].
pub struct ToolRegistryBuilder {
    gateway: Arc<Gateway>,
    items: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register an endpoint tool taking input `I`.
    #[must_use]
    pub fn endpoint<I: ToolInput>(mut self, spec: ToolSpec) -> Self {
        let tool = EndpointTool::<I>::new(spec, Arc::clone(&self.gateway));
        self.items.push(Arc::new(tool));
        self
    }

    /// Register an already-built tool.
    #[must_use]
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.items.push(tool);
        self
    }

    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if two tools share a name.
    pub fn finish(self) -> Result<ToolRegistry, RegistryError> {
        let mut map = BTreeMap::new();
        for tool in self.items {
            let name = tool.spec().name;
            if map.insert(name, tool).is_some() {
                return Err(RegistryError::DuplicateTool(name.to_string()));
            }
        }
        Ok(ToolRegistry { map })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{NoInput, Summary};
    use smartlead_async::test_support::gateway_for;
    use smartlead_async::{Endpoint, PRIMARY};

    const A: ToolSpec = ToolSpec {
        name: "smartlead_a",
        title: "A",
        description: "a",
        category: Category::Leads,
        endpoint: Endpoint::get(PRIMARY, "/a"),
        summary: Summary::None,
    };
    const B: ToolSpec = ToolSpec {
        name: "smartlead_b",
        title: "B",
        description: "b",
        category: Category::Campaigns,
        endpoint: Endpoint::post(PRIMARY, "/b"),
        summary: Summary::None,
    };

    #[test]
    fn duplicate_names_are_rejected() {
        let gw = gateway_for("http://127.0.0.1:9");
        let err = ToolRegistry::builder(gw)
            .endpoint::<NoInput>(A)
            .endpoint::<NoInput>(A)
            .finish()
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::DuplicateTool("smartlead_a".into()));
    }

    #[test]
    fn descriptors_follow_category_order() {
        let gw = gateway_for("http://127.0.0.1:9");
        let reg = ToolRegistry::builder(gw)
            .endpoint::<NoInput>(A)
            .endpoint::<NoInput>(B)
            .finish()
            .unwrap();
        let names: Vec<_> = reg.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["smartlead_b", "smartlead_a"]);
        assert_eq!(reg.list_names(), vec!["smartlead_a", "smartlead_b"]);

        let sub = reg.subset(["smartlead_b", "missing"]);
        assert_eq!(sub.len(), 1);
        assert!(sub.contains("smartlead_b"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_response() {
        let gw = gateway_for("http://127.0.0.1:9");
        let reg = ToolRegistry::builder(gw).finish().unwrap();
        assert!(reg.is_empty());
        let r = reg.dispatch("smartlead_missing", Value::Null).await;
        assert!(r.is_error);
        assert!(r.text().contains("unknown tool: smartlead_missing"));
    }
}
