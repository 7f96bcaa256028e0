// src/view.rs

//! Presentation helpers for anything that draws a pipeline graph.
//!
//! Status and kind styling is done with exhaustive matches so that adding a
//! status without deciding how it looks is a compile error.

use std::fmt::{self, Write as _};

use crate::dag::{Node, PipelineGraph};
use crate::errors::{Error, Result};
use crate::sim::StatusSummary;
use crate::types::{NodeKind, NodeStatus};

/// Node box size used by the dashboard layout.
pub const NODE_WIDTH: f64 = 120.0;
pub const NODE_HEIGHT: f64 = 60.0;

/// Colour role of a status, mapped to theme tokens by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Accent,
    Destructive,
    Primary,
    Muted,
    Warning,
}

impl Tone {
    pub fn token(self) -> &'static str {
        match self {
            Tone::Accent => "accent",
            Tone::Destructive => "destructive",
            Tone::Primary => "primary",
            Tone::Muted => "muted-foreground",
            Tone::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub tone: Tone,
    /// Whether the front end should pulse the node.
    pub animated: bool,
}

impl NodeStatus {
    pub fn style(self) -> StatusStyle {
        let (label, tone, animated) = match self {
            NodeStatus::Idle => ("Idle", Tone::Muted, false),
            NodeStatus::Pending => ("Pending", Tone::Muted, false),
            NodeStatus::Running => ("Running", Tone::Primary, true),
            NodeStatus::Success => ("Success", Tone::Accent, false),
            NodeStatus::Failed => ("Failed", Tone::Destructive, false),
            NodeStatus::Skipped => ("Skipped", Tone::Warning, false),
            NodeStatus::Cancelled => ("Cancelled", Tone::Muted, false),
        };
        StatusStyle {
            label,
            tone,
            animated,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            NodeStatus::Idle => '·',
            NodeStatus::Pending => '…',
            NodeStatus::Running => '▶',
            NodeStatus::Success => '✔',
            NodeStatus::Failed => '✖',
            NodeStatus::Skipped => '↷',
            NodeStatus::Cancelled => '■',
        }
    }
}

impl NodeKind {
    pub fn glyph(self) -> char {
        match self {
            NodeKind::Data => 'D',
            NodeKind::Transform => 'T',
            NodeKind::Model => 'M',
            NodeKind::Output => 'O',
        }
    }
}

/// Legend entries, in display order.
pub fn legend() -> Vec<StatusStyle> {
    [
        NodeStatus::Success,
        NodeStatus::Running,
        NodeStatus::Pending,
        NodeStatus::Failed,
        NodeStatus::Skipped,
        NodeStatus::Cancelled,
    ]
    .into_iter()
    .map(NodeStatus::style)
    .collect()
}

/// Line segment for one dependency edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub from: String,
    pub to: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Edge segments: out of the dependency box, into the left side of the
/// dependent box.
pub fn edge_geometry(graph: &PipelineGraph) -> Vec<EdgeLine> {
    graph
        .edges()
        .filter_map(|edge| {
            let from = graph.node(edge.from)?;
            let to = graph.node(edge.to)?;
            Some(EdgeLine {
                from: from.id.clone(),
                to: to.id.clone(),
                x1: from.position.x + NODE_WIDTH / 2.0,
                y1: from.position.y + NODE_HEIGHT / 2.0,
                x2: to.position.x,
                y2: to.position.y + NODE_HEIGHT / 2.0,
            })
        })
        .collect()
}

/// Hover-card contents for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub name: String,
    pub kind: String,
    pub status: String,
    pub content_hash: Option<String>,
    pub runtime: Option<String>,
}

impl NodeDetails {
    pub fn of(node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            kind: node.kind.to_string(),
            status: node.status.to_string(),
            content_hash: node.content_hash.clone(),
            runtime: node.runtime.clone(),
        }
    }
}

/// One line per node in topological order, e.g.
/// `[T ✔] transform-1  Data Cleaning  e5f6g7h8 • 45.2s  <- data-1`.
pub fn render_text(graph: &PipelineGraph) -> Result<String> {
    let order = graph.topological_order()?;
    let mut out = String::new();
    write_text(&mut out, graph, &order).map_err(Error::from)?;
    Ok(out)
}

fn write_text(out: &mut String, graph: &PipelineGraph, order: &[&Node]) -> fmt::Result {
    writeln!(out, "{}", StatusSummary::of(graph))?;

    let width = graph.nodes().map(|n| n.id.len()).max().unwrap_or(0);

    for node in order {
        write!(
            out,
            "[{} {}] {:<width$}  {}",
            node.kind.glyph(),
            node.status.glyph(),
            node.id,
            node.name,
            width = width
        )?;

        let meta: Vec<&str> = [node.content_hash.as_deref(), node.runtime.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !meta.is_empty() {
            write!(out, "  {}", meta.join(" • "))?;
        }

        let deps = graph.dependencies_of(&node.id);
        if !deps.is_empty() {
            write!(out, "  <- {}", deps.join(", "))?;
        }
        writeln!(out)?;
    }

    Ok(())
}
