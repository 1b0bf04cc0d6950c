// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `tree` module implements the transform tree, the computation graph at the heart of
//! feature extraction.
//!
//! Each named feature is an ordered pipeline of transform invocations. Pipelines sharing a prefix
//! of identical steps share the nodes computing that prefix, so common work (windowing, FFTs) runs
//! once per input frame no matter how many features consume it. Preparing the tree freezes the
//! graph, schedules the nodes, and packs every node's output buffers into one arena sized by the
//! sliding-blocks allocator; executing it runs the schedule against one input frame and hands back
//! the buffers of every feature leaf.
//!
//! Nodes live in a `Vec` inside the tree and reference each other by stable [`NodeId`] indices, so
//! the graph carries parent and child links without ownership cycles.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::alloc;
use crate::alloc::Block;
use crate::buffers::{Buffers, BuffersMut};
use crate::dump::{self, DotEdge, DotGraph, DotNode};
use crate::errors::{invalid_input_error, CepstraError, Result};
use crate::formats::BufferFormat;
use crate::registry::TransformRegistry;
use crate::transform::{DependencyParameter, Transform};

/// `TreeOptions` is the set of execution options a tree captures at construction.
#[derive(Copy, Clone, Debug)]
pub struct TreeOptions {
    /// Validate the output buffers of every node after it fires. Execution fails with
    /// `TransformResultedInInvalidBuffers` on the first invalid buffer.
    pub validate_after_each_transform: bool,
    /// Dump the output buffers of every node through the `log` facade after it fires.
    pub dump_buffers_after_each_transform: bool,
    /// Allow transforms to use SIMD kernels. Captured once here instead of being read from a
    /// process-wide flag.
    pub enable_simd: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            validate_after_each_transform: false,
            dump_buffers_after_each_transform: false,
            enable_simd: true,
        }
    }
}

/// Stable identifier of a node within one tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

struct Node {
    parent: Option<NodeId>,
    /// `None` only for the root, which holds the raw input frame.
    transform: Option<Box<dyn Transform>>,
    /// The output format of this node; for the root, the tree's root format.
    format: BufferFormat,
    fingerprint: String,
    /// Children in insertion order.
    children: Vec<NodeId>,
    /// Names of the features whose pipelines pass through this node.
    related_features: Vec<String>,
    /// Next node in execution order; the root starts the chain.
    next: Option<NodeId>,
    exec_index: usize,
    /// Parallel buffer instances this node produces. Bound at prepare.
    count: usize,
    /// Byte range of this node's buffers within the arena. Bound at prepare.
    slot: Range<usize>,
    elapsed: Duration,
    last_elapsed: Duration,
}

impl Node {
    fn new(parent: Option<NodeId>, transform: Option<Box<dyn Transform>>, format: BufferFormat, fingerprint: String) -> Self {
        Node {
            parent,
            transform,
            format,
            fingerprint,
            children: Vec::new(),
            related_features: Vec::new(),
            next: None,
            exec_index: 0,
            count: 0,
            slot: 0..0,
            elapsed: Duration::ZERO,
            last_elapsed: Duration::ZERO,
        }
    }
}

/// The arena backing every node's buffers. The storage is over-allocated by one alignment unit so
/// the usable region can start on a 32-byte boundary without unsafe code.
struct Arena {
    storage: Vec<u8>,
    base: usize,
    size: usize,
}

impl Arena {
    fn allocate(size: usize) -> Result<Arena> {
        let mut storage = Vec::new();

        storage
            .try_reserve_exact(size + alloc::ARENA_ALIGNMENT)
            .map_err(|err| CepstraError::FailedToAllocateBuffers(err.to_string()))?;
        storage.resize(size + alloc::ARENA_ALIGNMENT, 0);

        let base = storage.as_ptr().align_offset(alloc::ARENA_ALIGNMENT);
        if base > alloc::ARENA_ALIGNMENT {
            return Err(CepstraError::FailedToAllocateBuffers(
                "could not align the arena base".to_string(),
            ));
        }

        Ok(Arena { storage, base, size })
    }

    fn bytes(&self) -> &[u8] {
        &self.storage[self.base..self.base + self.size]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let base = self.base;
        &mut self.storage[base..base + self.size]
    }
}

/// A link in a chain under construction: either a node already in the tree or one staged by the
/// current `add_feature` call.
#[derive(Copy, Clone)]
enum Link {
    Existing(NodeId),
    Staged(usize),
}

struct StagedNode {
    transform: Box<dyn Transform>,
    fingerprint: String,
    parent: Link,
}

/// `TransformTree` builds, prepares, and executes the feature-extraction graph.
pub struct TransformTree {
    nodes: Vec<Node>,
    root_format: BufferFormat,
    features: HashMap<String, NodeId>,
    options: TreeOptions,
    prepared: bool,
    arena: Option<Arena>,
}

impl TransformTree {
    /// Instantiate a tree over the given root format with default options.
    pub fn new(root_format: BufferFormat) -> Self {
        TransformTree::with_options(root_format, TreeOptions::default())
    }

    /// Instantiate a tree over the given root format, capturing the execution options.
    pub fn with_options(root_format: BufferFormat, options: TreeOptions) -> Self {
        let fingerprint = root_format.id();
        TransformTree {
            nodes: vec![Node::new(None, None, root_format.clone(), fingerprint)],
            root_format,
            features: HashMap::new(),
            options,
            prepared: false,
            arena: None,
        }
    }

    /// Gets the root format.
    pub fn root_format(&self) -> &BufferFormat {
        &self.root_format
    }

    /// Gets the options captured at construction.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Returns `true` once the tree has been prepared for execution.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Gets the number of transform nodes (the root is not counted).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Gets the arena size in bytes. Zero before preparation.
    pub fn arena_size(&self) -> usize {
        self.arena.as_ref().map(|arena| arena.size).unwrap_or(0)
    }

    /// Gets the node providing the output of a feature.
    pub fn feature_node(&self, name: &str) -> Option<NodeId> {
        self.features.get(name).copied()
    }

    /// Adds a feature: a named pipeline of `(transform name, parameters string)` steps.
    ///
    /// Steps are resolved against `registry`, deduplicated against existing nodes while the
    /// running prefix matches, and appended as new nodes after the first divergence. The call is
    /// atomic: on any error the tree is unchanged.
    pub fn add_feature(
        &mut self,
        name: &str,
        steps: &[(&str, &str)],
        registry: &TransformRegistry,
    ) -> Result<()> {
        if self.prepared {
            return Err(CepstraError::TreeAlreadyPrepared);
        }
        if self.features.contains_key(name) {
            return Err(CepstraError::ChainNameAlreadyExists(name.to_string()));
        }
        if steps.is_empty() {
            return Err(CepstraError::Other("a feature needs at least one transform"));
        }

        let mut staged: Vec<StagedNode> = Vec::new();
        let mut chain: Vec<Link> = Vec::with_capacity(steps.len());
        let mut cursor = Link::Existing(ROOT);

        for &(transform_name, params) in steps {
            let mut transform = registry.make(transform_name)?;

            for (key, value) in parse_params_string(transform_name, params)? {
                transform.set_parameter(key, value)?;
            }

            // Dependency parameters override explicit values: a consumer must agree with the
            // producer it reads from.
            for dep in transform.dependencies() {
                if let Some(value) =
                    self.ancestor_parameter(&staged, cursor, dep, transform.name())?
                {
                    transform.set_parameter(dep.parameter, &value)?;
                }
            }

            let parent_format = match cursor {
                Link::Existing(id) => self.nodes[id.0].format.clone(),
                Link::Staged(i) => staged[i].transform.output_format().clone(),
            };
            transform.bind_input_format(&parent_format)?;

            let fingerprint = transform.fingerprint();

            // Reuse an identical sibling where one exists. Only an existing node can have
            // siblings to check: staged nodes form a single path.
            cursor = match cursor {
                Link::Existing(id) => {
                    let twin = self.nodes[id.0]
                        .children
                        .iter()
                        .copied()
                        .find(|child| self.nodes[child.0].fingerprint == fingerprint);

                    match twin {
                        Some(child) => Link::Existing(child),
                        None => {
                            staged.push(StagedNode {
                                transform,
                                fingerprint,
                                parent: Link::Existing(id),
                            });
                            Link::Staged(staged.len() - 1)
                        }
                    }
                }
                Link::Staged(i) => {
                    staged.push(StagedNode { transform, fingerprint, parent: Link::Staged(i) });
                    Link::Staged(staged.len() - 1)
                }
            };
            chain.push(cursor);
        }

        // An identical pipeline resolves to an existing node; a second name for it is ambiguous.
        if let Link::Existing(id) = cursor {
            if let Some((existing, _)) = self.features.iter().find(|(_, &node)| node == id) {
                return Err(CepstraError::ChainAlreadyExists {
                    existing: existing.clone(),
                    new: name.to_string(),
                });
            }
        }

        // Everything validated; materialize the staged path.
        let base = self.nodes.len();
        let new_nodes = staged.len();

        for node in staged {
            let id = NodeId(self.nodes.len());
            let parent_id = match node.parent {
                Link::Existing(parent) => parent,
                Link::Staged(i) => NodeId(base + i),
            };
            let format = node.transform.output_format().clone();

            self.nodes.push(Node::new(
                Some(parent_id),
                Some(node.transform),
                format,
                node.fingerprint,
            ));
            self.nodes[parent_id.0].children.push(id);
        }

        for link in &chain {
            let id = match *link {
                Link::Existing(id) => id,
                Link::Staged(i) => NodeId(base + i),
            };
            let features = &mut self.nodes[id.0].related_features;
            if !features.iter().any(|feature| feature == name) {
                features.push(name.to_string());
            }
        }

        let terminus = match chain[chain.len() - 1] {
            Link::Existing(id) => id,
            Link::Staged(i) => NodeId(base + i),
        };
        self.features.insert(name.to_string(), terminus);

        debug!(
            "added feature '{}': {} steps, {} new nodes, terminus n{}",
            name,
            steps.len(),
            new_nodes,
            terminus.0
        );

        Ok(())
    }

    /// Resolves one dependency parameter by walking the chain's ancestors, nearest first.
    ///
    /// Returns the producer's value, or `None` if no ancestor carries the producer transform.
    /// Fails if a producer is found but does not declare the parameter.
    fn ancestor_parameter(
        &self,
        staged: &[StagedNode],
        from: Link,
        dep: &DependencyParameter,
        consumer: &str,
    ) -> Result<Option<String>> {
        let mut link = from;

        loop {
            let (transform, parent) = match link {
                Link::Staged(i) => {
                    let node = &staged[i];
                    (Some(&*node.transform), Some(node.parent))
                }
                Link::Existing(id) => {
                    let node = &self.nodes[id.0];
                    (
                        node.transform.as_deref(),
                        node.parent.map(Link::Existing),
                    )
                }
            };

            if let Some(transform) = transform {
                if transform.name() == dep.transform {
                    return match transform.parameters().get(dep.parameter) {
                        Some(value) => Ok(Some(value.to_string())),
                        None => Err(CepstraError::DependencyParameterUnknown {
                            producer: dep.transform.to_string(),
                            parameter: dep.parameter.to_string(),
                            consumer: consumer.to_string(),
                        }),
                    };
                }
            }

            match parent {
                Some(parent) => link = parent,
                None => return Ok(None),
            }
        }
    }

    /// Freezes the graph: schedules the nodes, initializes every transform, sizes every node's
    /// buffers, solves the arena placement, and allocates the arena.
    pub fn prepare_for_execution(&mut self) -> Result<()> {
        if self.prepared {
            return Err(CepstraError::TreeAlreadyPrepared);
        }
        if self.features.is_empty() {
            return Err(CepstraError::TreeIsEmpty);
        }

        // Depth-first schedule: parents before children, siblings in insertion order.
        let mut schedule = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            schedule.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }

        for (index, &id) in schedule.iter().enumerate() {
            self.nodes[id.0].exec_index = index;
        }

        // Bind instance counts top-down and run one-shot precomputation.
        self.nodes[ROOT.0].count = 1;
        for &id in &schedule[1..] {
            let parent = match self.nodes[id.0].parent {
                Some(parent) => parent,
                None => continue,
            };
            let parent_count = self.nodes[parent.0].count;

            let node = &mut self.nodes[id.0];
            match node.transform.as_mut() {
                Some(transform) => {
                    transform.initialize()?;
                    node.count = transform.buffers_count_change().apply(parent_count);
                }
                None => node.count = parent_count,
            }
        }

        // A node's buffers live from the step writing them to the last step reading them.
        let blocks: Vec<Block> = schedule
            .iter()
            .map(|&id| {
                let node = &self.nodes[id.0];
                let death = node
                    .children
                    .iter()
                    .map(|child| self.nodes[child.0].exec_index)
                    .max()
                    .unwrap_or(node.exec_index);
                Block {
                    size: alloc::align_up(node.count * node.format.size_in_bytes()),
                    birth: node.exec_index,
                    death,
                }
            })
            .collect();

        let placement = alloc::solve(&blocks);

        debug!(
            "prepared: {} nodes, arena {} bytes",
            schedule.len(),
            placement.arena_size
        );

        let arena = Arena::allocate(placement.arena_size)?;

        for ((&id, _), &offset) in schedule.iter().zip(&blocks).zip(&placement.offsets) {
            let node = &mut self.nodes[id.0];
            let bytes = node.count * node.format.size_in_bytes();
            node.slot = offset..offset + bytes;
        }

        for pair in schedule.windows(2) {
            self.nodes[pair[0].0].next = Some(pair[1]);
        }
        self.nodes[schedule[schedule.len() - 1].0].next = None;

        self.arena = Some(arena);
        self.prepared = true;

        Ok(())
    }

    /// Executes the tree against one input frame and returns the buffers of every feature.
    ///
    /// The input must supply at least `root_format.length()` samples; exactly that many are read.
    /// May be called repeatedly; each call overwrites the arena.
    pub fn execute(&mut self, input: &[i16]) -> Result<HashMap<String, Buffers<'_>>> {
        if !self.prepared {
            return Err(CepstraError::TreeIsNotPrepared);
        }

        let root_length = self.root_format.length();
        if input.len() < root_length {
            return invalid_input_error(format!(
                "expected at least {} samples, got {}",
                root_length,
                input.len()
            ));
        }

        for node in self.nodes.iter_mut() {
            node.last_elapsed = Duration::ZERO;
        }

        let Self { nodes, arena, options, features, root_format, .. } = self;
        let arena = match arena {
            Some(arena) => arena,
            None => return Err(CepstraError::TreeIsNotPrepared),
        };
        let bytes = arena.bytes_mut();

        // The root holds the input frame, read-only for the rest of the call.
        let root_slot = nodes[ROOT.0].slot.clone();
        let frame =
            Buffers::new(root_format.clone(), 1, bytemuck::cast_slice(&input[..root_length]));
        BuffersMut::new(root_format.clone(), 1, &mut bytes[root_slot]).copy_from(&frame)?;

        let mut cursor = nodes[ROOT.0].next;
        while let Some(id) = cursor {
            let parent_id = match nodes[id.0].parent {
                Some(parent) => parent,
                None => break,
            };
            let (parent_slot, parent_count, parent_format) = {
                let parent = &nodes[parent_id.0];
                (parent.slot.clone(), parent.count, parent.format.clone())
            };
            let (slot, count, format) = {
                let node = &nodes[id.0];
                (node.slot.clone(), node.count, node.format.clone())
            };

            let (input_bytes, output_bytes) = split_disjoint(&mut *bytes, parent_slot, slot);
            let input = Buffers::new(parent_format, parent_count, input_bytes);
            let mut output = BuffersMut::new(format, count, output_bytes);

            let node = &mut nodes[id.0];
            let transform = match node.transform.as_mut() {
                Some(transform) => transform,
                None => return Err(CepstraError::Other("interior node without a transform")),
            };

            let start = Instant::now();
            transform.process(&input, &mut output)?;
            let elapsed = start.elapsed();
            node.elapsed += elapsed;
            node.last_elapsed += elapsed;

            if options.validate_after_each_transform {
                if let Err(err) = output.as_buffers().validate() {
                    return Err(CepstraError::TransformResultedInInvalidBuffers {
                        transform: transform.name().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
            if options.dump_buffers_after_each_transform {
                trace!("{} output:\n{}", transform.name(), output.as_buffers().dump());
            }

            cursor = node.next;
        }

        let bytes = arena.bytes();
        let mut results = HashMap::with_capacity(features.len());
        for (name, &id) in features.iter() {
            let node = &nodes[id.0];
            results.insert(
                name.clone(),
                Buffers::new(node.format.clone(), node.count, &bytes[node.slot.clone()]),
            );
        }

        Ok(results)
    }

    /// Gets the cumulative execution time in seconds, aggregated by transform name.
    pub fn execution_time_report(&self) -> HashMap<String, f64> {
        self.time_report(|node| node.elapsed)
    }

    /// Gets the execution time of the most recent `execute` call in seconds, aggregated by
    /// transform name.
    pub fn last_execution_time_report(&self) -> HashMap<String, f64> {
        self.time_report(|node| node.last_elapsed)
    }

    fn time_report(&self, pick: impl Fn(&Node) -> Duration) -> HashMap<String, f64> {
        let mut report = HashMap::new();
        for node in &self.nodes {
            if let Some(transform) = &node.transform {
                *report.entry(transform.name().to_string()).or_insert(0.0) +=
                    pick(node).as_secs_f64();
            }
        }
        report
    }

    /// Renders the tree as a dot `digraph` document.
    pub fn render_dot(&self) -> String {
        let mut graph = DotGraph { nodes: Vec::with_capacity(self.nodes.len()), edges: Vec::new() };

        for (index, node) in self.nodes.iter().enumerate() {
            let mut label = match &node.transform {
                Some(transform) => {
                    format!("{} ({})", transform.name(), short_fingerprint(&node.fingerprint))
                }
                None => format!("audio\n{}", node.format.id()),
            };

            for name in &node.related_features {
                if self.features.get(name) == Some(&NodeId(index)) {
                    label.push_str("\nfeature: ");
                    label.push_str(name);
                }
            }

            if !node.elapsed.is_zero() {
                label.push_str(&format!("\n{:.3} ms", node.elapsed.as_secs_f64() * 1e3));
            }

            graph.nodes.push(DotNode { id: index, label });

            for &child in &node.children {
                graph.edges.push(DotEdge {
                    from: index,
                    to: child.0,
                    label: node.format.id(),
                });
            }
        }

        dump::render(&graph)
    }

    /// Writes the dot rendering of the tree to a file.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.render_dot())?;
        Ok(())
    }
}

/// Splits one region of the arena into a read view and a disjoint write view.
fn split_disjoint(
    bytes: &mut [u8],
    read: Range<usize>,
    write: Range<usize>,
) -> (&[u8], &mut [u8]) {
    debug_assert!(read.end <= write.start || write.end <= read.start);

    if read.end <= write.start {
        let (head, tail) = bytes.split_at_mut(write.start);
        (&head[read], &mut tail[..write.end - write.start])
    }
    else {
        let (head, tail) = bytes.split_at_mut(read.start);
        (&tail[..read.end - read.start], &mut head[write.start..write.end])
    }
}

fn parse_params_string<'a>(transform: &str, params: &'a str) -> Result<Vec<(&'a str, &'a str)>> {
    let mut pairs = Vec::new();

    for token in params.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => pairs.push((key, value)),
            _ => {
                return Err(CepstraError::InvalidParameter {
                    transform: transform.to_string(),
                    name: token.to_string(),
                })
            }
        }
    }

    Ok(pairs)
}

fn short_fingerprint(fingerprint: &str) -> String {
    let mut hasher = DefaultHasher::new();
    fingerprint.hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}
