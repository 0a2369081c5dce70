use crate::error::{Error, Result};
use crate::stream::IntoStream;
use crate::utils::Barrier;

use async_channel::{Receiver, Sender};
use core::fmt;
use core::num::NonZeroUsize;
use futures_core::Stream;
use futures_lite::StreamExt;
use futures_task::{FutureObj, Spawn};
use std::pin::{pin, Pin};
use std::task::{Context, Poll};

/// Settings for [`merge_buffered_with`].
///
/// # Examples
///
/// ```
/// use fan_in::BufferedOptions;
/// use std::num::NonZeroUsize;
///
/// let options = BufferedOptions::new().capacity(NonZeroUsize::new(64).unwrap());
/// assert_eq!(options.capacity_for(3), 64);
/// assert_eq!(BufferedOptions::new().capacity_for(3), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferedOptions {
    capacity: Option<NonZeroUsize>,
}

impl BufferedOptions {
    /// The default options: one output slot per input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many values the output can hold before forwarders have to
    /// wait for the consumer.
    pub fn capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// The output capacity used when merging `inputs` streams.
    pub fn capacity_for(&self, inputs: usize) -> usize {
        match self.capacity {
            Some(capacity) => capacity.get(),
            None => inputs.max(1),
        }
    }
}

#[pin_project::pin_project(project = InnerProj)]
enum Inner<S>
where
    S: Stream,
{
    Passthrough(#[pin] S),
    Relay(Pin<Box<Receiver<S::Item>>>),
}

/// A stream fed by one forwarding task per input.
///
/// Each input is drained by its own task into a shared bounded channel. Once
/// every forwarder has finished, a watcher task closes the channel and the
/// stream ends.
///
/// The stream is `Unpin` whenever its input type is.
///
/// This `struct` is created by the [`merge_buffered`] function and by
/// [`Merge::merge_buffered`](super::Merge::merge_buffered). See their
/// documentation for more.
#[must_use = "streams do nothing unless polled"]
#[pin_project::pin_project]
pub struct MergeBuffered<S>
where
    S: Stream,
{
    #[pin]
    inner: Inner<S>,
}

impl<S> MergeBuffered<S>
where
    S: Stream,
{
    fn closed() -> Self {
        let (_, receiver) = async_channel::bounded(1);
        Self {
            inner: Inner::Relay(Box::pin(receiver)),
        }
    }

    /// Returns `true` if the single input is handed through without a relay.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.inner, Inner::Passthrough(_))
    }
}

impl<S> fmt::Debug for MergeBuffered<S>
where
    S: Stream + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Passthrough(stream) => f
                .debug_tuple("MergeBuffered::Passthrough")
                .field(stream)
                .finish(),
            Inner::Relay(receiver) => f
                .debug_struct("MergeBuffered::Relay")
                .field("buffered", &receiver.len())
                .field("closed", &receiver.is_closed())
                .finish(),
        }
    }
}

impl<S> Stream for MergeBuffered<S>
where
    S: Stream,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.project().inner.project() {
            InnerProj::Passthrough(stream) => stream.poll_next(cx),
            InnerProj::Relay(receiver) => receiver.as_mut().poll_next(cx),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Passthrough(stream) => stream.size_hint(),
            Inner::Relay(receiver) => (receiver.len(), None),
        }
    }
}

/// Drain `stream` into `output`, then check in at the barrier.
async fn forward<S>(index: usize, stream: S, output: Sender<S::Item>, barrier: Barrier)
where
    S: Stream,
{
    let mut stream = pin!(stream);
    let mut forwarded = 0usize;
    while let Some(item) = stream.next().await {
        if output.send(item).await.is_err() {
            tracing::warn!(
                input = index,
                forwarded,
                "merged output was dropped, abandoning input"
            );
            break;
        }
        forwarded += 1;
    }
    barrier.arrive(index);
    tracing::trace!(
        input = index,
        forwarded,
        remaining = barrier.remaining(),
        "forwarder finished"
    );
}

/// Close `output` once every forwarder has checked in.
async fn watch<T>(output: Sender<T>, barrier: Barrier) {
    barrier.wait().await;
    output.close();
    tracing::debug!("all forwarders finished, closed merged output");
}

fn spawn_task<Sp, F>(spawner: &Sp, task: &'static str, future: F) -> Result<()>
where
    Sp: Spawn + ?Sized,
    F: core::future::Future<Output = ()> + Send + 'static,
{
    spawner
        .spawn_obj(FutureObj::new(Box::pin(future)))
        .map_err(|source| Error::Spawn { task, source })
}

/// Merge any number of streams by giving every input its own forwarding
/// task, using the default [`BufferedOptions`].
///
/// Tasks are handed to `spawner`, so any executor implementing
/// [`Spawn`] can drive them. Forwarders wait for room in the output, which
/// propagates backpressure from the consumer to every producer. Values from
/// one input keep their relative order.
///
/// With no inputs the stream ends immediately. A single input is passed
/// through as is and no task is spawned.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if the executor refuses a task. Forwarders which
/// were already running stop once they notice the output is gone.
///
/// # Examples
///
/// ```
/// use fan_in::merge_buffered;
/// use futures::executor::{block_on, ThreadPool};
/// use futures_lite::prelude::*;
/// use futures_lite::stream;
///
/// let pool = ThreadPool::new().unwrap();
/// let streams = (0..8).map(|n| stream::iter(vec![n; 3]));
/// let merged = merge_buffered(&pool, streams).unwrap();
///
/// let mut out: Vec<i32> = block_on(merged.collect());
/// out.sort_unstable();
/// assert_eq!(out.len(), 24);
/// assert_eq!(out[..3], [0, 0, 0]);
/// ```
pub fn merge_buffered<Sp, I>(
    spawner: &Sp,
    streams: I,
) -> Result<MergeBuffered<<I::Item as IntoStream>::IntoStream>>
where
    Sp: Spawn + ?Sized,
    I: IntoIterator,
    I::Item: IntoStream,
    <I::Item as IntoStream>::IntoStream: Send + 'static,
    <I::Item as IntoStream>::Item: Send + 'static,
{
    merge_buffered_with(BufferedOptions::default(), spawner, streams)
}

/// Like [`merge_buffered`], with explicit [`BufferedOptions`].
///
/// # Errors
///
/// Returns [`Error::Spawn`] if the executor refuses a task.
pub fn merge_buffered_with<Sp, I>(
    options: BufferedOptions,
    spawner: &Sp,
    streams: I,
) -> Result<MergeBuffered<<I::Item as IntoStream>::IntoStream>>
where
    Sp: Spawn + ?Sized,
    I: IntoIterator,
    I::Item: IntoStream,
    <I::Item as IntoStream>::IntoStream: Send + 'static,
    <I::Item as IntoStream>::Item: Send + 'static,
{
    let mut streams: Vec<_> = streams.into_iter().map(IntoStream::into_stream).collect();
    if streams.len() <= 1 {
        return Ok(match streams.pop() {
            Some(stream) => MergeBuffered {
                inner: Inner::Passthrough(stream),
            },
            None => MergeBuffered::closed(),
        });
    }

    let inputs = streams.len();
    let capacity = options.capacity_for(inputs);
    let (sender, receiver) = async_channel::bounded(capacity);
    let barrier = Barrier::new(inputs);

    for (index, stream) in streams.into_iter().enumerate() {
        spawn_task(
            spawner,
            "forwarder",
            forward(index, stream, sender.clone(), barrier.clone()),
        )?;
    }
    spawn_task(spawner, "watcher", watch(sender, barrier))?;

    tracing::debug!(inputs, capacity, "spawned buffered merge");
    Ok(MergeBuffered {
        inner: Inner::Relay(Box::pin(receiver)),
    })
}
