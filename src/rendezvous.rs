//! Rendezvous (aka highest random weight) hashing.
//!
//! Every node is scored against the key and the highest score wins. Adding or
//! removing a node only moves the keys that node wins (or won), every other
//! key stays where it was.
//!
//! Ties are broken in favour of the node with the smallest bytes, so the
//! result never depends on the order nodes were added in.
use crate::hashable::Hashable;
use crate::scorer::{Castagnoli, Scorer};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// A node along with the last score computed for it by [`Rendezvous::get_n`]
#[derive(Clone)]
struct NodeScore<Node> {
    node: Node,
    score: u32,
}

/// Selects nodes for keys by rendezvous hashing.
///
/// [`Rendezvous::get`] and [`Rendezvous::ranked`] only need `&self` and can
/// be called from many threads at once. [`Rendezvous::get_n`] re-sorts the
/// node list in place to avoid allocating, so it needs `&mut self` and any
/// sharing has to go through a lock (or see [`crate::SharedRendezvous`]).
#[derive(Clone)]
pub struct Rendezvous<Node, S = Castagnoli> {
    nodes: Vec<NodeScore<Node>>,
    scorer: S,
}

impl<Node> Rendezvous<Node> {
    pub fn new() -> Self {
        Rendezvous::with_scorer(Castagnoli::new())
    }
}

impl<Node> Default for Rendezvous<Node> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Node, S> Rendezvous<Node, S> {
    pub fn with_scorer(scorer: S) -> Self {
        Rendezvous {
            nodes: vec![],
            scorer,
        }
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(NodeScore { node, score: 0 });
    }

    /// Append nodes to the set. There is no check for duplicates, adding a
    /// node twice means it will appear twice in [`Rendezvous::get_n`].
    pub fn add<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = Node>,
    {
        let before = self.nodes.len();
        self.nodes
            .extend(nodes.into_iter().map(|node| NodeScore { node, score: 0 }));
        debug!(added = self.nodes.len() - before, total = self.nodes.len(), "added nodes");
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the current nodes. The order is unspecified.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().map(|ns| &ns.node)
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }
}

impl<Node: Hashable, S: Scorer> Rendezvous<Node, S> {
    /// Score a single node for a key
    pub fn score<Key>(&self, node: &Node, key: &Key) -> u32
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        self.scorer.score(key.as_ref(), &node.hash_bytes())
    }

    /// The node with the highest score for `key`, or `None` if there are no nodes
    pub fn get<Key>(&self, key: &Key) -> Option<&Node>
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        let mut nodes = self.nodes.iter();

        let mut max_node = &nodes.next()?.node;
        let mut max_bytes = max_node.hash_bytes();
        let mut max_score = self.scorer.score(key, &max_bytes);

        for ns in nodes {
            let bytes = ns.node.hash_bytes();
            let score = self.scorer.score(key, &bytes);

            if score > max_score || (score == max_score && bytes < max_bytes) {
                max_node = &ns.node;
                max_bytes = bytes;
                max_score = score;
            }
        }

        Some(max_node)
    }

    /// Up to `n` nodes for `key`, best first.
    ///
    /// The internal node list is re-scored and sorted in place, which is
    /// why this takes `&mut self`. Use [`Rendezvous::ranked`] when only a
    /// shared reference is available.
    pub fn get_n<Key>(&mut self, n: usize, key: &Key) -> Vec<&Node>
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        if n == 0 || self.nodes.is_empty() {
            return vec![];
        }

        let key = key.as_ref();
        let Rendezvous { nodes, scorer } = self;

        for ns in nodes.iter_mut() {
            ns.score = scorer.score(key, &ns.node.hash_bytes());
        }

        nodes.sort_by(|a, b| rank(a.score, &a.node, b.score, &b.node));

        nodes.iter().take(n).map(|ns| &ns.node).collect()
    }

    /// Same result as [`Rendezvous::get_n`], but scores into a fresh buffer
    /// and leaves the node list alone.
    pub fn ranked<Key>(&self, n: usize, key: &Key) -> Vec<&Node>
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        if n == 0 || self.nodes.is_empty() {
            return vec![];
        }

        let key = key.as_ref();
        let mut scored: Vec<(u32, &Node)> = self
            .nodes
            .iter()
            .map(|ns| (self.scorer.score(key, &ns.node.hash_bytes()), &ns.node))
            .collect();

        let n = n.min(scored.len());
        let by_rank = |a: &(u32, &Node), b: &(u32, &Node)| rank(a.0, a.1, b.0, b.1);

        // only the first n need to be in order
        if n < scored.len() {
            scored.select_nth_unstable_by(n - 1, by_rank);
            scored.truncate(n);
        }
        scored.sort_by(by_rank);

        scored.into_iter().map(|(_, node)| node).collect()
    }

    /// Remove every node with the same bytes as `node`. Removing a node
    /// that isn't present does nothing.
    pub fn remove<T>(&mut self, node: &T)
    where
        T: Hashable + ?Sized,
    {
        let target = node.hash_bytes();
        let before = self.nodes.len();

        self.nodes.retain(|ns| ns.node.hash_bytes() != target);

        debug!(
            removed = before - self.nodes.len(),
            remaining = self.nodes.len(),
            "removed node"
        );
    }
}

/// Higher scores first, then smaller bytes first
fn rank<Node: Hashable>(a_score: u32, a: &Node, b_score: u32, b: &Node) -> Ordering {
    b_score
        .cmp(&a_score)
        .then_with(|| a.hash_bytes().cmp(&b.hash_bytes()))
}

impl<Node> FromIterator<Node> for Rendezvous<Node> {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut rendezvous = Rendezvous::new();
        rendezvous.add(iter);
        rendezvous
    }
}

impl<Node, S> Extend<Node> for Rendezvous<Node, S> {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl<Node: fmt::Debug, S: fmt::Debug> fmt::Debug for Rendezvous<Node, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendezvous")
            .field("nodes", &self.nodes().collect::<Vec<_>>())
            .field("scorer", &self.scorer)
            .finish()
    }
}
