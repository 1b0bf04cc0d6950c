// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dump` module renders a prepared transform tree as a graph in dot format.
//!
//! Rendering is split from the tree itself: the tree flattens its nodes and edges into a
//! [`DotGraph`] and this module turns that into text.

use std::fmt::Write;

pub(crate) struct DotNode {
    pub id: usize,
    pub label: String,
}

pub(crate) struct DotEdge {
    pub from: usize,
    pub to: usize,
    pub label: String,
}

pub(crate) struct DotGraph {
    pub nodes: Vec<DotNode>,
    pub edges: Vec<DotEdge>,
}

/// Renders the graph as a `digraph` document.
pub(crate) fn render(graph: &DotGraph) -> String {
    let mut out = String::from("digraph transform_tree {\n");

    for node in &graph.nodes {
        let _ = writeln!(out, "  n{} [label=\"{}\"];", node.id, escape(&node.label));
    }

    for edge in &graph.edges {
        let _ = writeln!(out, "  n{} -> n{} [label=\"{}\"];", edge.from, edge.to, escape(&edge.label));
    }

    out.push_str("}\n");
    out
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_render() {
        let graph = DotGraph {
            nodes: vec![
                DotNode { id: 0, label: "audio\nR16<16>@8000".to_string() },
                DotNode { id: 1, label: "Window".to_string() },
            ],
            edges: vec![DotEdge { from: 0, to: 1, label: "R16<16>@8000".to_string() }],
        };

        let text = render(&graph);
        assert!(text.starts_with("digraph transform_tree {"));
        assert!(text.contains("n0 [label=\"audio\\nR16<16>@8000\"];"));
        assert!(text.contains("n0 -> n1 [label=\"R16<16>@8000\"];"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn verify_escaping() {
        assert_eq!(escape("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
