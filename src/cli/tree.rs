//! Display the dependency tree of a single field.
//!
//! The backward tree lists what a field is computed from, recursively; the
//! forward tree lists the fields and worksheets that use it. Nodes reached
//! more than once are printed in full the first time and marked `(*)`
//! afterwards.
//!
//! # Examples
//!
//! ```bash
//! calclineage tree book.json "[Profit Ratio]"
//! calclineage tree book.json "[Sales].[Profit]" --direction forward --depth 2
//! calclineage tree book.json "[Profit]" --format json
//! ```
//!
//! # Output
//!
//! ```text
//! [Sales].[Profit Ratio] (Calculated Field)
//! ├── upstream
//! │   ├── [Sales].[Profit] (Field)
//! │   └── [Sales].[Sales] (Field)
//! └── downstream
//!     └── [Overview] (Sheet)
//! ```

use super::CliConfig;
use crate::catalog::{Catalog, Field};
use crate::core::{Category, ErrorContext, FieldId, LineageError, Node};
use crate::pipeline::load_input;
use crate::resolver::{DependencyEdge, FieldGraph, resolve_one};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Which closure to show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    /// Fields this field is computed from
    Backward,
    /// Fields and worksheets using this field
    Forward,
    /// Both
    #[default]
    Both,
}

/// Output style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TreeFormat {
    /// Box-drawing tree
    #[default]
    Tree,
    /// Nested JSON
    Json,
}

/// Command to show one field's dependency tree.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Workbook export (JSON)
    pub input: PathBuf,

    /// Field to show: `[Source].[Field]`, `[Field]` or a field id
    pub field: String,

    /// Which closure to show
    #[arg(short, long, value_enum, default_value_t = Direction::Both)]
    pub direction: Direction,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = TreeFormat::Tree)]
    pub format: TreeFormat,

    /// Maximum depth to display
    #[arg(long)]
    pub depth: Option<usize>,

    /// Expand repeated nodes every time
    #[arg(long)]
    pub no_dedupe: bool,
}

/// A node of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub category: Category,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// The trees of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTree {
    pub field: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backward: Option<Vec<TreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<Vec<TreeNode>>,
}

/// Builds [`TreeNode`]s from a reduced closure.
struct TreeBuilder<'a> {
    catalog: &'a Catalog,
    /// Node → its children in this direction
    children: BTreeMap<Node, Vec<Node>>,
    max_depth: Option<usize>,
    dedupe: bool,
    displayed: HashSet<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(
        catalog: &'a Catalog,
        edges: &[DependencyEdge],
        backward: bool,
        max_depth: Option<usize>,
        dedupe: bool,
    ) -> Self {
        let mut children: BTreeMap<Node, Vec<Node>> = BTreeMap::new();
        for edge in edges {
            let parent = Node::Field(edge.parent.clone());
            let (from, to) = if backward {
                (edge.child.clone(), parent)
            } else {
                (parent, edge.child.clone())
            };
            let entry = children.entry(from).or_default();
            if !entry.contains(&to) {
                entry.push(to);
            }
        }
        Self {
            catalog,
            children,
            max_depth,
            dedupe,
            displayed: HashSet::new(),
        }
    }

    fn describe(&self, node: &Node) -> (String, Category) {
        match node {
            Node::Field(id) => match self.catalog.get(id) {
                Some(field) => (field.qualified_label.clone(), field.category),
                None => (id.to_string(), Category::Field),
            },
            Node::Sheet(id) => (
                self.catalog.sheets().label_of(id).unwrap_or(id.as_str()).to_string(),
                Category::Sheet,
            ),
        }
    }

    fn build(&mut self, root: &FieldId) -> Vec<TreeNode> {
        self.expand(&Node::Field(root.clone()), 0)
    }

    fn expand(&mut self, node: &Node, depth: usize) -> Vec<TreeNode> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Vec::new();
        }
        let mut next = self.children.get(node).cloned().unwrap_or_default();
        next.sort_by_cached_key(|n| self.describe(n).0);

        next.into_iter()
            .map(|child| {
                let (label, category) = self.describe(&child);
                let duplicate = self.dedupe && !self.displayed.insert(child.clone());
                let children = if duplicate { Vec::new() } else { self.expand(&child, depth + 1) };
                TreeNode {
                    id: child.as_str().to_string(),
                    label,
                    category,
                    duplicate,
                    children,
                }
            })
            .collect()
    }
}

/// Build the requested trees of `field`.
pub fn build_field_tree(
    catalog: &Catalog,
    field: &Field,
    direction: Direction,
    max_depth: Option<usize>,
    dedupe: bool,
) -> Result<FieldTree, LineageError> {
    let graph = FieldGraph::new(catalog);
    let lineage = resolve_one(&graph, &field.id)?;

    let backward = matches!(direction, Direction::Backward | Direction::Both).then(|| {
        TreeBuilder::new(catalog, &lineage.backward, true, max_depth, dedupe).build(&field.id)
    });
    let forward = matches!(direction, Direction::Forward | Direction::Both).then(|| {
        TreeBuilder::new(catalog, &lineage.forward, false, max_depth, dedupe).build(&field.id)
    });

    Ok(FieldTree {
        field: field.qualified_label.clone(),
        category: field.category,
        backward,
        forward,
    })
}

/// Find a field or fail with the closest labels as a suggestion.
pub fn find_field<'c>(catalog: &'c Catalog, name: &str) -> Result<&'c Field> {
    catalog.find(name).map_err(|error| {
        let similar = catalog.similar(name);
        let ctx = ErrorContext::new(error);
        let ctx = if similar.is_empty() {
            ctx.with_suggestion("Run 'calclineage analyze' and pick a label from the field table")
        } else {
            ctx.with_suggestion(format!("Did you mean {}?", similar.join(", ")))
        };
        anyhow::Error::new(ctx)
    })
}

fn print_nodes(nodes: &[TreeNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let marker = if node.duplicate { " (*)".bright_black().to_string() } else { String::new() };
        let label = match node.category {
            Category::Sheet => node.label.magenta(),
            Category::Parameter => node.label.blue(),
            _ => node.label.cyan(),
        };
        println!(
            "{}{}{} {}{}",
            prefix,
            connector,
            label,
            format!("({})", node.category).bright_black(),
            marker
        );
        let child_prefix = if is_last { format!("{prefix}    ") } else { format!("{prefix}│   ") };
        print_nodes(&node.children, &child_prefix);
    }
}

impl TreeCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        if self.depth == Some(0) {
            return Err(anyhow::anyhow!("Depth must be at least 1"));
        }

        let config = cli.load_config().await.context("Failed to load configuration")?;
        config.validate()?;
        let loaded = load_input(&self.input).await?;
        let catalog = Catalog::build(&loaded.workbook, &config.identity_options())
            .context("Failed to build the field catalog")?;
        let field = find_field(&catalog, &self.field)?;
        let tree = build_field_tree(&catalog, field, self.direction, self.depth, !self.no_dedupe)?;

        match self.format {
            TreeFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
            TreeFormat::Tree => self.output_tree(&tree),
        }
        Ok(())
    }

    fn output_tree(&self, tree: &FieldTree) {
        println!("{} {}", tree.field.cyan().bold(), format!("({})", tree.category).bright_black());

        let sections: Vec<(&str, &Vec<TreeNode>)> =
            [("upstream", &tree.backward), ("downstream", &tree.forward)]
                .into_iter()
                .filter_map(|(name, nodes)| nodes.as_ref().map(|n| (name, n)))
                .collect();

        let mut has_duplicates = false;
        for (i, (name, nodes)) in sections.iter().enumerate() {
            let is_last = i == sections.len() - 1;
            let connector = if is_last { "└── " } else { "├── " };
            println!("{}{}", connector, name.bold());
            let prefix = if is_last { "    " } else { "│   " };
            if nodes.is_empty() {
                println!("{}{}", prefix, "(none)".bright_black());
            }
            print_nodes(nodes, prefix);
            has_duplicates |= contains_duplicate(nodes);
        }

        if has_duplicates {
            println!();
            println!("{}", "(*) = already shown above".bright_black());
        }
    }
}

fn contains_duplicate(nodes: &[TreeNode]) -> bool {
    nodes.iter().any(|n| n.duplicate || contains_duplicate(&n.children))
}
