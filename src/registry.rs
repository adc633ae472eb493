//! Shape-kind tags and the tool registry.
//!
//! Each [`ShapeKind`] maps to one drawing routine. The registry is an explicit
//! value owned by the batcher, so tests can install fake tool sets and two
//! engines never share tools by accident.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::options::DrawConfig;

/// Drawing primitive an operation invokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Rect,
    Circle,
    Ellipse,
    Polygon,
    Line,
    Arrow,
    Bezier,
    Star,
    Diamond,
    Text,
    Image,
    /// Host-defined tool.
    Custom(String),
}

impl ShapeKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Bezier => "bezier",
            Self::Star => "star",
            Self::Diamond => "diamond",
            Self::Text => "text",
            Self::Image => "image",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ShapeKind {
    fn from(name: &str) -> Self {
        match name {
            "rect" => Self::Rect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "polygon" => Self::Polygon,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            "bezier" => Self::Bezier,
            "star" => Self::Star,
            "diamond" => Self::Diamond,
            "text" => Self::Text,
            "image" => Self::Image,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for ShapeKind {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shape routine: draws `config` on an already-configured context.
pub type ToolFn<C> = Box<dyn Fn(&mut C, &DrawConfig) -> Result<(), ContextError>>;

/// Lookup table from [`ShapeKind`] to its drawing routine.
pub struct ToolRegistry<C> {
    tools: HashMap<ShapeKind, ToolFn<C>>,
}

impl<C> ToolRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Install `tool` for `kind`, replacing any previous routine.
    pub fn register<T>(&mut self, kind: impl Into<ShapeKind>, tool: T)
    where
        T: Fn(&mut C, &DrawConfig) -> Result<(), ContextError> + 'static,
    {
        self.tools.insert(kind.into(), Box::new(tool));
    }

    #[must_use]
    pub fn has(&self, kind: &ShapeKind) -> bool {
        self.tools.contains_key(kind)
    }

    #[must_use]
    pub fn get(&self, kind: &ShapeKind) -> Option<&ToolFn<C>> {
        self.tools.get(kind)
    }

    pub fn unregister(&mut self, kind: &ShapeKind) -> bool {
        self.tools.remove(kind).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<ShapeKind> {
        let mut kinds: Vec<ShapeKind> = self.tools.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl<C> Default for ToolRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ToolRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry").field("kinds", &self.kinds()).finish()
    }
}
