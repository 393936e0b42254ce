// voice-gateway-mcp/src/registry.rs
// ============================================================================
// Module: Tool Registry
// Description: Immutable tool table built once at startup.
// Purpose: Give every transport the same tool surface by construction.
// Dependencies: jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! Tools are registered on a [`RegistryBuilder`] during startup and frozen by
//! [`RegistryBuilder::build`], which consumes the builder and returns a shared
//! [`ToolRegistry`] handle. The frozen registry has no mutation API, so no tool
//! can be registered after the gateway starts serving.
//!
//! ## Invariants
//! - Tool names are unique; a duplicate fails the build.
//! - Input and output schemas are compiled at build time; an invalid schema
//!   fails the build.
//! - Enumeration order is registration order and never changes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::Permission;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum tool name length.
const MAX_TOOL_NAME_LENGTH: usize = 64;
/// Maximum number of schema violations reported back to a caller.
const MAX_REPORTED_VIOLATIONS: usize = 8;

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Failure reported by a capability handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Arguments passed schema validation but were rejected by the handler.
    /// The message is returned to the caller and must be caller-safe.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Backend failure. The message is internal-only.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Blocking capability handler invoked through the execution bridge.
pub trait ToolHandler: Send + Sync {
    /// Invokes the capability with schema-validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the capability rejects the call or fails.
    fn call(&self, arguments: Value) -> Result<Value, HandlerError>;
}

impl<F> ToolHandler for F
where
    F: Fn(Value) -> Result<Value, HandlerError> + Send + Sync,
{
    fn call(&self, arguments: Value) -> Result<Value, HandlerError> {
        self(arguments)
    }
}

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Tool descriptor supplied at registration time.
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool arguments.
    pub input_schema: Value,
    /// JSON schema for handler results.
    pub output_schema: Value,
    /// Permission the caller must hold, if any.
    pub required_permission: Option<Permission>,
    /// Handler timeout override.
    pub timeout: Option<Duration>,
    /// Capability handler.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Returns the serializable listing form of this descriptor.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
            required_permission: self
                .required_permission
                .as_ref()
                .map(|permission| permission.as_str().to_string()),
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("required_permission", &self.required_permission)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Tool definition returned by tool listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool arguments.
    pub input_schema: Value,
    /// JSON schema for tool results.
    pub output_schema: Value,
    /// Required permission label, if any.
    pub required_permission: Option<String>,
}

/// Registered tool with compiled schemas.
pub struct RegisteredTool {
    /// Registration descriptor.
    descriptor: ToolDescriptor,
    /// Compiled argument schema.
    input: Validator,
    /// Compiled result schema.
    output: Validator,
}

impl RegisteredTool {
    /// Returns the registration descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Validates call arguments against the input schema.
    ///
    /// # Errors
    ///
    /// Returns the schema violations when the arguments do not match.
    pub fn validate_input(&self, arguments: &Value) -> Result<(), Vec<String>> {
        collect_violations(&self.input, arguments)
    }

    /// Validates a handler result against the output schema.
    ///
    /// # Errors
    ///
    /// Returns the schema violations when the result does not match.
    pub fn validate_output(&self, result: &Value) -> Result<(), Vec<String>> {
        collect_violations(&self.output, result)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Collects tool descriptors before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Descriptors in registration order.
    pending: Vec<ToolDescriptor>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Adds a tool descriptor. Duplicates are reported by [`Self::build`].
    pub fn register(&mut self, descriptor: ToolDescriptor) -> &mut Self {
        self.pending.push(descriptor);
        self
    }

    /// Freezes the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a name is invalid or duplicated, or a
    /// schema fails to compile. Any error is a fatal startup condition.
    pub fn build(self) -> Result<Arc<ToolRegistry>, RegistryError> {
        let mut tools = Vec::with_capacity(self.pending.len());
        let mut index = BTreeMap::new();
        for descriptor in self.pending {
            validate_tool_name(&descriptor.name)?;
            if index.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateTool(descriptor.name));
            }
            let input = compile_schema(&descriptor.name, "input", &descriptor.input_schema)?;
            let output = compile_schema(&descriptor.name, "output", &descriptor.output_schema)?;
            index.insert(descriptor.name.clone(), tools.len());
            tools.push(RegisteredTool {
                descriptor,
                input,
                output,
            });
        }
        Ok(Arc::new(ToolRegistry {
            tools,
            index,
        }))
    }
}

// ============================================================================
// SECTION: Frozen Registry
// ============================================================================

/// Frozen, read-only tool registry.
pub struct ToolRegistry {
    /// Tools in registration order.
    tools: Vec<RegisteredTool>,
    /// Name to position lookup.
    index: BTreeMap<String, usize>,
}

impl ToolRegistry {
    /// Resolves a tool by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).and_then(|position| self.tools.get(*position))
    }

    /// Returns tool definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.descriptor.definition()).collect()
    }

    /// Returns tool names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(RegisteredTool::name).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry construction errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors share a name.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
    /// Tool name is empty, too long, or uses unsupported characters.
    #[error("invalid tool name: {0}")]
    InvalidName(String),
    /// A descriptor schema failed to compile.
    #[error("invalid {which} schema for tool {tool}: {message}")]
    InvalidSchema {
        /// Tool name.
        tool: String,
        /// Which schema failed (`input` or `output`).
        which: &'static str,
        /// Compiler message.
        message: String,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a tool name: lowercase ASCII, digits, and underscores.
fn validate_tool_name(name: &str) -> Result<(), RegistryError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TOOL_NAME_LENGTH
        && name.starts_with(|ch: char| ch.is_ascii_lowercase())
        && name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
    if valid { Ok(()) } else { Err(RegistryError::InvalidName(name.to_string())) }
}

/// Compiles a descriptor schema.
fn compile_schema(
    tool: &str,
    which: &'static str,
    schema: &Value,
) -> Result<Validator, RegistryError> {
    jsonschema::options().with_draft(Draft::Draft202012).build(schema).map_err(|err| {
        RegistryError::InvalidSchema {
            tool: tool.to_string(),
            which,
            message: err.to_string(),
        }
    })
}

/// Collects a bounded list of schema violations.
fn collect_violations(schema: &Validator, instance: &Value) -> Result<(), Vec<String>> {
    let messages: Vec<String> = schema
        .iter_errors(instance)
        .take(MAX_REPORTED_VIOLATIONS)
        .map(|err| err.to_string())
        .collect();
    if messages.is_empty() { Ok(()) } else { Err(messages) }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
