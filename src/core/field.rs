//! Identifier and category types shared by every stage of the pipeline.
//!
//! Fields and sheets are addressed by synthetic identifiers (see
//! [`crate::identity`]). Both are thin newtypes over the bracketed id text so
//! that the calculation normalizer can substitute them directly into
//! calculation strings, while the type system keeps field and sheet ids apart.
//!
//! # Examples
//!
//! ```rust
//! use calclineage_cli::core::{Category, FieldId, Node, SheetId};
//!
//! let field = FieldId::new("[qwertyuiop3]");
//! let node = Node::Sheet(SheetId::new("[qwertyuiopsh0]"));
//!
//! assert_eq!(field.as_str(), "[qwertyuiop3]");
//! assert!(node.is_sheet());
//! assert_eq!(Category::CalculatedFieldLod.to_string(), "Calculated Field (LOD)");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic, run-unique identifier of a field, e.g. `[qwertyuiop12]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Wrap an already-generated identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text, brackets included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Synthetic identifier of a worksheet, e.g. `[qwertyuiopsh4]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(String);

impl SheetId {
    /// Wrap an already-generated identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text, brackets included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target of a dependency edge: another field, or a worksheet for the
/// terminal edges of a forward closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A field in the workbook
    Field(FieldId),
    /// A worksheet using a field
    Sheet(SheetId),
}

impl Node {
    /// The underlying identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Node::Field(id) => id.as_str(),
            Node::Sheet(id) => id.as_str(),
        }
    }

    /// Whether this node is a worksheet.
    #[must_use]
    pub const fn is_sheet(&self) -> bool {
        matches!(self, Node::Sheet(_))
    }

    /// The field id, when this node is a field.
    #[must_use]
    pub const fn as_field(&self) -> Option<&FieldId> {
        match self {
            Node::Field(id) => Some(id),
            Node::Sheet(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FieldId> for Node {
    fn from(id: FieldId) -> Self {
        Node::Field(id)
    }
}

impl From<SheetId> for Node {
    fn from(id: SheetId) -> Self {
        Node::Sheet(id)
    }
}

/// Classification of a field, plus the `Sheet` pseudo-category used on the
/// terminal edges of forward closures.
///
/// A field is classified once, when the catalog is built, and the stored value
/// is what every later stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Field under the reserved parameters source
    #[serde(rename = "Parameter")]
    Parameter,
    /// Plain field without a calculation
    #[serde(rename = "Field")]
    Field,
    /// Field with a calculation
    #[serde(rename = "Calculated Field")]
    CalculatedField,
    /// Calculated field containing a `{...}` level-of-detail block
    #[serde(rename = "Calculated Field (LOD)")]
    CalculatedFieldLod,
    /// Worksheet consuming a field
    #[serde(rename = "Sheet")]
    Sheet,
}

impl Category {
    /// The human-readable category name used in the output tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Category::Parameter => "Parameter",
            Category::Field => "Field",
            Category::CalculatedField => "Calculated Field",
            Category::CalculatedFieldLod => "Calculated Field (LOD)",
            Category::Sheet => "Sheet",
        }
    }

    /// Whether the category describes a field with a calculation.
    #[must_use]
    pub const fn is_calculated(&self) -> bool {
        matches!(self, Category::CalculatedField | Category::CalculatedFieldLod)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::core::LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parameter" => Ok(Category::Parameter),
            "field" => Ok(Category::Field),
            "calculated field" | "calculated" => Ok(Category::CalculatedField),
            "calculated field (lod)" | "lod" => Ok(Category::CalculatedFieldLod),
            "sheet" => Ok(Category::Sheet),
            _ => Err(crate::core::LineageError::Other {
                message: format!("Unknown field category '{s}'"),
            }),
        }
    }
}
