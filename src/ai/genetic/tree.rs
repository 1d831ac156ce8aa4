//! Shared-prefix tree over chromosomes.
//!
//! Nodes live in an arena and refer to each other by index. A child is
//! always pushed after its parent, so a reverse sweep over the arena visits
//! every child before its parent.

use std::collections::HashMap;

use super::chromosome::{encode_moves, Chromosome, WIN_SCORE};
use crate::game::Move;

pub type NodeId = usize;

/// Value a node holds before anything has been propagated into it.
pub const UNSET_VALUE: i32 = -WIN_SCORE;

#[derive(Debug, Clone)]
struct Node {
    mv: Option<Move>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    value: i32,
}

#[derive(Debug, Clone)]
pub struct ReservationTree {
    nodes: Vec<Node>,
    edges: HashMap<(NodeId, Move), NodeId>,
    leaves: HashMap<String, NodeId>,
}

impl ReservationTree {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        ReservationTree {
            nodes: vec![Node {
                mv: None,
                parent: None,
                children: Vec::new(),
                depth: 0,
                value: UNSET_VALUE,
            }],
            edges: HashMap::new(),
            leaves: HashMap::new(),
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn contains(&self, chromosome: &Chromosome) -> bool {
        self.leaves.contains_key(&chromosome.encode())
    }

    pub fn leaf(&self, chromosome: &Chromosome) -> Option<NodeId> {
        self.leaves.get(&chromosome.encode()).copied()
    }

    /// Add `chromosome` with its leaf evaluation, reusing any prefix already
    /// in the tree. Returns `None` if the chromosome was inserted before.
    pub fn insert(&mut self, chromosome: &Chromosome, value: i32) -> Option<NodeId> {
        let key = chromosome.encode();
        if self.leaves.contains_key(&key) {
            return None;
        }

        let mut current = Self::ROOT;
        for &mv in chromosome.moves() {
            current = match self.edges.get(&(current, mv)) {
                Some(&child) => child,
                None => self.push_child(current, mv),
            };
        }
        self.nodes[current].value = value;
        self.leaves.insert(key, current);
        Some(current)
    }

    fn push_child(&mut self, parent: NodeId, mv: Move) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            mv: Some(mv),
            parent: Some(parent),
            children: Vec::new(),
            depth,
            value: UNSET_VALUE,
        });
        self.nodes[parent].children.push(id);
        self.edges.insert((parent, mv), id);
        id
    }

    /// Minimax backup over the explored tree. The agent chooses at even
    /// depths (maximising) and the opponent at odd depths (minimising).
    pub fn propagate(&mut self) {
        for id in (0..self.nodes.len()).rev() {
            let node = &self.nodes[id];
            if node.children.is_empty() {
                continue;
            }
            let values = node.children.iter().map(|&c| self.nodes[c].value);
            let backed_up = if node.depth % 2 == 0 {
                values.max()
            } else {
                values.min()
            };
            if let Some(value) = backed_up {
                self.nodes[id].value = value;
            }
        }
    }

    /// How many ancestors of `leaf` in a row carry the leaf's value.
    pub fn fitness(&self, leaf: NodeId) -> usize {
        let value = self.nodes[leaf].value;
        let mut count = 0;
        let mut current = leaf;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[parent].value != value {
                break;
            }
            count += 1;
            current = parent;
        }
        count
    }

    pub fn value(&self, id: NodeId) -> i32 {
        self.nodes[id].value
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].depth
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Encoded move prefix leading from the root to `id`.
    pub fn node_key(&self, id: NodeId) -> String {
        let mut path = Vec::with_capacity(self.nodes[id].depth);
        let mut current = id;
        while let Some(mv) = self.nodes[current].mv {
            path.push(mv);
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        encode_moves(&path)
    }
}

impl Default for ReservationTree {
    fn default() -> Self {
        Self::new()
    }
}
