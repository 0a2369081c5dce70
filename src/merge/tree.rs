use super::fixed::{Merge4Core, ARITY};
use crate::stream::IntoStream;
use crate::utils;

use core::fmt;
use core::ops::Range;
use futures_core::Stream;
use slab::Slab;
use std::pin::Pin;
use std::task::{Context, Poll};

/// What an input position of a tree node, or the root, refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    /// Nothing, or an input which has ended.
    Absent,
    /// An original input stream, by index.
    Leaf(usize),
    /// Another node of the tree, by arena key.
    Node(usize),
}

/// One four-way merge point of the tree.
#[derive(Debug)]
struct Node {
    children: [Child; ARITY],
    core: Merge4Core,
}

impl Node {
    fn new(children: [Child; ARITY]) -> Self {
        Self {
            children,
            core: Merge4Core::new(children.map(|child| child != Child::Absent)),
        }
    }
}

/// Arena of merge points. An entry is `None` only while its node is being
/// polled.
type Nodes = Slab<Option<Node>>;

/// A stream that merges any number of streams into one through a balanced
/// tree of four-way merge points.
///
/// The tree is laid out up front in an arena: every node arbitrates between
/// up to four children, each of which is either an input stream or another
/// node. A node is dropped from the arena as soon as all of its children have
/// ended, and the stream ends once the root has.
///
/// This `struct` is created by the [`merge`] function and by
/// [`Merge::merge`](super::Merge::merge). See their documentation for more.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct MergeTree<S>
where
    S: Stream,
{
    #[pin]
    leaves: Vec<S>,
    nodes: Nodes,
    root: Child,
    depth: usize,
}

impl<S> MergeTree<S>
where
    S: Stream,
{
    pub(crate) fn new(leaves: Vec<S>) -> Self {
        let mut nodes = Slab::new();
        let (root, depth) = build(&mut nodes, 0..leaves.len());
        tracing::trace!(
            inputs = leaves.len(),
            nodes = nodes.len(),
            depth,
            "built merge tree"
        );
        Self {
            leaves,
            nodes,
            root,
            depth,
        }
    }

    /// Number of input streams the tree was built from.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` if the tree was built from no inputs at all.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of merge levels between an input and the output.
    ///
    /// This is `0` for zero or one input, in which case no merge point
    /// exists, and grows as `ceil(log4(n))` after that.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of merge points which still have live inputs.
    pub fn nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Lay out the subtree for `range`, returning its root and depth.
///
/// Ranges longer than four are split into four contiguous groups: the first
/// half in two quarters, then the remainder in two. A group of one input
/// becomes a leaf directly.
fn build(nodes: &mut Nodes, range: Range<usize>) -> (Child, usize) {
    let len = range.len();
    match len {
        0 => (Child::Absent, 0),
        1 => (Child::Leaf(range.start), 0),
        2..=ARITY => {
            let mut children = [Child::Absent; ARITY];
            for (child, index) in children.iter_mut().zip(range) {
                *child = Child::Leaf(index);
            }
            (Child::Node(nodes.insert(Some(Node::new(children)))), 1)
        }
        _ => {
            let start = range.start;
            let q2 = len / 2;
            let q1 = q2 / 2;
            let q3 = q2 + (len - q2) / 2;
            let groups = [
                start..start + q1,
                start + q1..start + q2,
                start + q2..start + q3,
                start + q3..range.end,
            ];

            let mut children = [Child::Absent; ARITY];
            let mut depth = 0;
            for (child, group) in children.iter_mut().zip(groups) {
                let (sub, sub_depth) = build(nodes, group);
                *child = sub;
                depth = depth.max(sub_depth);
            }
            (Child::Node(nodes.insert(Some(Node::new(children)))), depth + 1)
        }
    }
}

fn poll_child<S>(
    nodes: &mut Nodes,
    leaves: Pin<&mut Vec<S>>,
    child: Child,
    cx: &mut Context<'_>,
) -> Poll<Option<S::Item>>
where
    S: Stream,
{
    match child {
        Child::Absent => Poll::Ready(None),
        Child::Leaf(index) => utils::get_pin_mut_from_vec(leaves, index).poll_next(cx),
        Child::Node(key) => poll_node(nodes, leaves, key, cx),
    }
}

/// Poll the node at `key` as a four-way merger over its children.
///
/// The node is taken out of the arena for the duration of the poll so its
/// children can be reached through the same arena, and is released for good
/// once all of them have ended.
fn poll_node<S>(
    nodes: &mut Nodes,
    mut leaves: Pin<&mut Vec<S>>,
    key: usize,
    cx: &mut Context<'_>,
) -> Poll<Option<S::Item>>
where
    S: Stream,
{
    let Some(mut node) = nodes.get_mut(key).and_then(Option::take) else {
        return Poll::Ready(None);
    };

    let children = node.children;
    let res = node.core.poll_next(cx, |index, cx| {
        poll_child(nodes, leaves.as_mut(), children[index], cx)
    });

    if let Poll::Ready(None) = res {
        nodes.remove(key);
    } else {
        nodes[key] = Some(node);
    }
    res
}

impl<S> fmt::Debug for MergeTree<S>
where
    S: Stream + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeTree")
            .field("leaves", &self.leaves)
            .field("nodes", &self.nodes.len())
            .field("depth", &self.depth)
            .finish()
    }
}

impl<S> Stream for MergeTree<S>
where
    S: Stream,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.root == Child::Absent {
            return Poll::Ready(None);
        }

        // A single input is polled with the caller's own context.
        let res = poll_child(this.nodes, this.leaves, *this.root, cx);
        if let Poll::Ready(None) = res {
            *this.root = Child::Absent;
        }
        res
    }
}

/// Merge any number of streams into a single stream of all their values.
///
/// Inputs are combined through a balanced tree of four-way merge points, so
/// at most `ceil(log4(n))` arbitration steps sit between an input and the
/// output. Values from one input keep their relative order; values from
/// different inputs interleave in readiness order.
///
/// With no inputs the stream ends immediately. A single input is passed
/// through as is.
///
/// # Examples
///
/// ```
/// use fan_in::merge;
/// use futures_lite::future::block_on;
/// use futures_lite::prelude::*;
/// use futures_lite::stream;
///
/// block_on(async {
///     let streams = (0..23).map(stream::once);
///     let mut out: Vec<i32> = merge(streams).collect().await;
///     out.sort_unstable();
///     assert_eq!(out, (0..23).collect::<Vec<_>>());
/// })
/// ```
pub fn merge<I>(streams: I) -> MergeTree<<I::Item as IntoStream>::IntoStream>
where
    I: IntoIterator,
    I::Item: IntoStream,
{
    MergeTree::new(streams.into_iter().map(IntoStream::into_stream).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peek::{Peek, PeekExt};
    use futures::channel::mpsc;
    use futures_lite::future::block_on;
    use futures_lite::prelude::*;
    use futures_lite::stream;
    use std::cell::Cell;
    use std::rc::Rc;

    fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
        v.sort_unstable();
        v
    }

    #[test]
    fn zero_inputs_ends_immediately() {
        block_on(async {
            let mut s = merge(Vec::<stream::Once<i32>>::new());
            assert!(s.is_empty());
            assert_eq!(s.depth(), 0);
            assert_eq!(s.next().await, None);
            assert_eq!(s.next().await, None);
        })
    }

    #[test]
    fn single_input_passes_through() {
        block_on(async {
            let s = merge(vec![stream::iter(vec![3, 1, 2])]);
            assert_eq!(s.depth(), 0);
            assert_eq!(s.nodes(), 0);
            let out: Vec<_> = s.collect().await;
            assert_eq!(out, vec![3, 1, 2]);
        })
    }

    #[test]
    fn depth_is_balanced() {
        let depth = |n: usize| merge((0..n).map(|_| stream::empty::<()>())).depth();
        assert_eq!(depth(2), 1);
        assert_eq!(depth(4), 1);
        assert_eq!(depth(5), 2);
        assert_eq!(depth(16), 2);
        assert_eq!(depth(17), 3);
        assert_eq!(depth(64), 3);
        assert_eq!(depth(65), 4);
    }

    #[test]
    fn partitions_into_quarters() {
        let mut nodes = Slab::new();
        let (root, depth) = build(&mut nodes, 0..5);
        assert_eq!(depth, 2);
        let children = |child: Child| match child {
            Child::Node(key) => nodes[key].as_ref().unwrap().children,
            other => panic!("expected a node, got {other:?}"),
        };
        assert_eq!(
            children(root)[..3],
            [Child::Leaf(0), Child::Leaf(1), Child::Leaf(2)]
        );
        assert_eq!(
            children(children(root)[3]),
            [Child::Leaf(3), Child::Leaf(4), Child::Absent, Child::Absent]
        );
    }

    #[test]
    fn merge_sizes() {
        block_on(async {
            for n in [2usize, 3, 4, 5, 23] {
                let streams = (0..n).map(|i| stream::iter(vec![i * i; 2]));
                let out: Vec<usize> = merge(streams).collect().await;
                let want: Vec<usize> = (0..n).flat_map(|i| [i * i, i * i]).collect();
                assert_eq!(sorted(out), sorted(want), "n = {n}");
            }
        })
    }

    #[test]
    fn pulls_one_value_per_poll() {
        let pulled = Rc::new(Cell::new(0usize));
        let counted = |_: usize| {
            let pulled = pulled.clone();
            stream::iter(0..10u32).inspect(move |_| pulled.set(pulled.get() + 1))
        };
        let mut s = merge((0..23).map(counted));
        assert_eq!(pulled.get(), 0);

        for taken in 1..=40 {
            assert!(s.peek_next().is_ready());
            assert_eq!(pulled.get(), taken);
        }
    }

    #[test]
    fn nodes_are_released_as_inputs_end() {
        let mut senders = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..8 {
            let (tx, rx) = mpsc::unbounded::<usize>();
            senders.push(tx);
            receivers.push(rx);
        }
        let mut s = merge(receivers);
        let total = s.nodes();
        assert_eq!(s.peek_next(), Peek::Empty);

        // Close the first group only: its node goes away, the rest stay.
        let first: Vec<_> = senders.drain(..2).collect();
        drop(first);
        assert_eq!(s.peek_next(), Peek::Empty);
        assert_eq!(s.nodes(), total - 1);

        senders[5].unbounded_send(7).unwrap();
        assert_eq!(s.peek_next(), Peek::Ready(7));

        senders.clear();
        assert_eq!(s.peek_next(), Peek::Closed);
        assert_eq!(s.nodes(), 0);
    }
}
