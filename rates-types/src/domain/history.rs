//! Multi-resolution rate history.
//!
//! A history is requested as a list of [`Offset`]s (days before today) and
//! resolved into a list of [`HistoryNode`]s of the same length and order:
//! a plain day count becomes a `Leaf`, a band of day counts becomes a
//! `Branch` of interior samples. Branches hold plain values, so a tree is
//! never deeper than one level.

use serde::{Deserialize, Serialize};

use super::quote::pct_change;

/// A requested sample position, in days before today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Days(u32),
    Band(Vec<u32>),
}

impl From<u32> for Offset {
    fn from(days: u32) -> Self {
        Offset::Days(days)
    }
}

impl From<Vec<u32>> for Offset {
    fn from(band: Vec<u32>) -> Self {
        Offset::Band(band)
    }
}

impl<const N: usize> From<[u32; N]> for Offset {
    fn from(band: [u32; N]) -> Self {
        Offset::Band(band.to_vec())
    }
}

/// One resolved offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryNode {
    Leaf(f64),
    /// Interior samples shaping the curve between two checkpoints.
    Branch(Vec<f64>),
}

impl HistoryNode {
    pub fn leaf(&self) -> Option<f64> {
        match self {
            HistoryNode::Leaf(v) => Some(*v),
            HistoryNode::Branch(_) => None,
        }
    }

    /// Every value held by this node, in order.
    pub fn values(&self) -> &[f64] {
        match self {
            HistoryNode::Leaf(v) => std::slice::from_ref(v),
            HistoryNode::Branch(values) => values,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, HistoryNode::Branch(_))
    }
}

/// Resolved history of a pair, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    nodes: Vec<HistoryNode>,
}

impl History {
    pub fn new(nodes: Vec<HistoryNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[HistoryNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The "now" sample at index 0, if it is a leaf.
    pub fn latest(&self) -> Option<f64> {
        self.nodes.first().and_then(HistoryNode::leaf)
    }

    /// Leaf values (checkpoints) in stored order, newest first.
    pub fn checkpoints(&self) -> Vec<f64> {
        self.nodes.iter().filter_map(HistoryNode::leaf).collect()
    }

    /// Branch bands in stored order.
    pub fn bands(&self) -> Vec<&[f64]> {
        self.nodes
            .iter()
            .filter(|n| n.is_branch())
            .map(HistoryNode::values)
            .collect()
    }

    /// Flattens leaves and branch samples alike.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().flat_map(|n| n.values().iter().copied())
    }

    /// `(min, max)` over every value, ignoring NaN. `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Percentage change from the node at `index` to the latest sample.
    pub fn change(&self, index: usize) -> Option<f64> {
        let past = self.nodes.get(index)?.leaf()?;
        pct_change(past, self.latest()?)
    }
}

impl From<Vec<HistoryNode>> for History {
    fn from(nodes: Vec<HistoryNode>) -> Self {
        Self::new(nodes)
    }
}
