use crate::hashable::Hashable;
use crate::rendezvous::Rendezvous;
use crate::scorer::{Castagnoli, Scorer};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;

/// A [`Rendezvous`] that can be shared between threads.
///
/// Readers work on an immutable snapshot and never block. Writers clone the
/// current node set, change the clone and swap it in, so a membership change
/// is either fully visible to a reader or not at all. Membership changes are
/// expected to be rare compared to lookups.
pub struct SharedRendezvous<Node, S = Castagnoli> {
    inner: ArcSwap<Rendezvous<Node, S>>,
}

impl<Node, S> SharedRendezvous<Node, S> {
    pub fn new(rendezvous: Rendezvous<Node, S>) -> Self {
        SharedRendezvous {
            inner: ArcSwap::from_pointee(rendezvous),
        }
    }

    /// The current node set. Later changes are not visible through it.
    pub fn snapshot(&self) -> Arc<Rendezvous<Node, S>> {
        self.inner.load_full()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

impl<Node, S> SharedRendezvous<Node, S>
where
    Node: Hashable + Clone,
    S: Scorer + Clone,
{
    pub fn get<Key>(&self, key: &Key) -> Option<Node>
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        self.inner.load().get(key).cloned()
    }

    pub fn get_n<Key>(&self, n: usize, key: &Key) -> Vec<Node>
    where
        Key: AsRef<[u8]> + ?Sized,
    {
        self.inner
            .load()
            .ranked(n, key)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn add<I>(&self, nodes: I)
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes: Vec<Node> = nodes.into_iter().collect();

        // rcu may run the closure more than once if another writer gets in first
        self.inner.rcu(|current| {
            let mut next = (**current).clone();
            next.add(nodes.iter().cloned());
            next
        });
        debug!(added = nodes.len(), "published new node set");
    }

    pub fn remove<T>(&self, node: &T)
    where
        T: Hashable + ?Sized,
    {
        self.inner.rcu(|current| {
            let mut next = (**current).clone();
            next.remove(node);
            next
        });
    }
}

impl<Node, S> From<Rendezvous<Node, S>> for SharedRendezvous<Node, S> {
    fn from(rendezvous: Rendezvous<Node, S>) -> Self {
        SharedRendezvous::new(rendezvous)
    }
}

impl<Node> Default for SharedRendezvous<Node> {
    fn default() -> Self {
        SharedRendezvous::new(Rendezvous::new())
    }
}
