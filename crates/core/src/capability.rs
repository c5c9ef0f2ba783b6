use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::AdapterError;

/// The two invocation styles an adapter may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Execute,
    Process,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallShape::Execute => write!(f, "execute"),
            CallShape::Process => write!(f, "process"),
        }
    }
}

/// Set of call shapes, used both for what an adapter exposes and for what a
/// declaration requires (at least one of the set must be present).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallShapes {
    pub execute: bool,
    pub process: bool,
}

impl CallShapes {
    pub const EXECUTE: CallShapes = CallShapes {
        execute: true,
        process: false,
    };
    pub const PROCESS: CallShapes = CallShapes {
        execute: false,
        process: true,
    };
    pub const EITHER: CallShapes = CallShapes {
        execute: true,
        process: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.execute && !self.process
    }

    pub fn intersects(&self, other: &CallShapes) -> bool {
        (self.execute && other.execute) || (self.process && other.process)
    }

    /// The shape the dispatcher will use, `execute` taking precedence.
    pub fn preferred(&self) -> Option<CallShape> {
        if self.execute {
            Some(CallShape::Execute)
        } else if self.process {
            Some(CallShape::Process)
        } else {
            None
        }
    }
}

/// One live capability adapter behind a uniform call interface.
///
/// An adapter advertises which shapes it answers via `shapes()` and
/// overrides the matching methods; the defaults reject the call. The
/// registry picks the entrypoint once at load time, so the per-call
/// defaults only matter if an adapter misreports its shapes.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Human description shown in the tool catalog. `None` (or empty) falls
    /// back to a generated default.
    fn description(&self) -> Option<String> {
        None
    }

    fn shapes(&self) -> CallShapes;

    async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let _ = params;
        Err(AdapterError::ShapeUnsupported(CallShape::Execute))
    }

    async fn process(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let _ = params;
        Err(AdapterError::ShapeUnsupported(CallShape::Process))
    }
}

/// Raw adapter output, before normalization into the response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    /// A JSON object, possibly carrying the `content: [{text}]` convention.
    Structured(Map<String, Value>),
    /// Anything that is not a JSON object.
    Opaque(Value),
}

impl ProviderResult {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ProviderResult::Structured(map),
            other => ProviderResult::Opaque(other),
        }
    }

    /// The `content[0].text` convention: the first content element's text,
    /// if the structured result carries one.
    pub fn content_text(&self) -> Option<&str> {
        match self {
            ProviderResult::Structured(map) => map
                .get("content")?
                .as_array()?
                .first()?
                .get("text")?
                .as_str(),
            ProviderResult::Opaque(_) => None,
        }
    }

    /// Human-readable summary per the normalization rules: the content
    /// text when present, otherwise the string form of the whole result.
    pub fn summary(&self) -> String {
        if let Some(text) = self.content_text() {
            return text.to_string();
        }
        match self {
            ProviderResult::Structured(map) => Value::Object(map.clone()).to_string(),
            ProviderResult::Opaque(Value::String(s)) => s.clone(),
            ProviderResult::Opaque(value) => value.to_string(),
        }
    }

    /// Lossless JSON form of the full result.
    pub fn into_value(self) -> Value {
        match self {
            ProviderResult::Structured(map) => Value::Object(map),
            ProviderResult::Opaque(value) => value,
        }
    }
}

impl From<Value> for ProviderResult {
    fn from(value: Value) -> Self {
        ProviderResult::from_value(value)
    }
}
