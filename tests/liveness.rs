//! A merged stream stays open for as long as any of its inputs does, and ends
//! promptly once the last one closes.

#![cfg(feature = "buffered")]

use async_channel::{bounded, Receiver, Sender};
use fan_in::{merge, merge4, merge_buffered};
use futures::task::{FutureObj, Spawn, SpawnError};
use futures_core::Stream;
use futures_lite::prelude::*;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_millis(100);

struct TokioSpawner;

impl Spawn for TokioSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::spawn(future);
        Ok(())
    }
}

/// One channel that never closes on its own plus `closed` channels which
/// each hold a single value and are closed.
fn inputs(closed: usize) -> (Sender<u32>, Vec<Receiver<u32>>) {
    let (open_tx, open_rx) = bounded(1);
    let mut receivers = vec![open_rx];
    for n in 0..closed {
        let (tx, rx) = bounded(1);
        tx.try_send(n as u32).unwrap();
        tx.close();
        receivers.push(rx);
    }
    (open_tx, receivers)
}

/// Drain `expected` values, check the stream then stays open, close the
/// lingering input and check the stream ends.
async fn assert_open_until_closed<S>(mut merged: S, expected: usize, open: Sender<u32>)
where
    S: Stream<Item = u32> + Unpin,
{
    for _ in 0..expected {
        assert!(merged.next().await.is_some());
    }
    assert!(
        timeout(WAIT, merged.next()).await.is_err(),
        "merged stream ended while an input was still open"
    );

    open.close();
    let end = timeout(WAIT, merged.next()).await;
    assert_eq!(end, Ok(None), "merged stream did not end after its inputs");
}

#[tokio::test]
async fn merge4_waits_for_every_input() {
    let (open, mut receivers) = inputs(2);
    let c = receivers.pop();
    let b = receivers.pop();
    let a = receivers.pop();
    let merged = Box::pin(merge4(a, b, c, None));
    assert_open_until_closed(merged, 2, open).await;
}

#[tokio::test]
async fn tree_merge_waits_for_every_input() {
    let (open, receivers) = inputs(22);
    assert_open_until_closed(Box::pin(merge(receivers)), 22, open).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn buffered_merge_waits_for_every_input() {
    let (open, receivers) = inputs(9);
    let merged = Box::pin(merge_buffered(&TokioSpawner, receivers).unwrap());
    assert_open_until_closed(merged, 9, open).await;
}
