//! Merging channels fed by producer tasks running on a multi-threaded
//! runtime.

#![cfg(feature = "buffered")]

use async_channel::{bounded, Receiver, Sender};
use fan_in::bridge::{from_any, to_any};
use fan_in::prelude::*;
use fan_in::{merge, merge4, merge_buffered, peek, Peek, Slot};
use futures::task::{FutureObj, Spawn, SpawnError};
use futures_lite::prelude::*;
use itertools::Itertools;
use std::pin::pin;

/// Runs buffered-merge tasks on the ambient tokio runtime.
struct TokioSpawner;

impl Spawn for TokioSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::spawn(future);
        Ok(())
    }
}

/// A capacity-1 channel which a spawned producer fills with `values`
/// and then closes.
fn produce<T: Send + 'static>(values: Vec<T>) -> Receiver<T> {
    let (tx, rx) = bounded(1);
    tokio::spawn(send_all(tx, values));
    rx
}

async fn send_all<T>(tx: Sender<T>, values: Vec<T>) {
    for value in values {
        tx.send(value).await.unwrap();
    }
    tx.close();
}

#[tokio::test]
async fn peek_table() {
    let (_keep0, rx0) = bounded::<i32>(1);

    let (tx1, rx1) = bounded::<i32>(1);
    tx1.send(1).await.unwrap();

    let (tx2, rx2) = bounded::<i32>(2);
    tx2.send(1).await.unwrap();
    tx2.send(2).await.unwrap();
    tx2.close();

    let absent: Slot<Receiver<i32>> = Slot::Absent;
    let mut rx0 = pin!(rx0);
    let mut rx1 = pin!(rx1);
    let mut rx2 = pin!(rx2);

    assert_eq!(peek(pin!(absent)).into_parts(), (0, false, true));
    assert_eq!(peek(rx0.as_mut()).into_parts(), (0, false, true));
    assert_eq!(peek(rx1.as_mut()).into_parts(), (1, true, true));
    assert_eq!(peek(rx1.as_mut()).into_parts(), (0, false, true));
    assert_eq!(peek(rx2.as_mut()).into_parts(), (1, true, true));
    assert_eq!(peek(rx2.as_mut()).into_parts(), (2, true, true));
    assert_eq!(peek(rx2.as_mut()).into_parts(), (0, false, false));
}

#[tokio::test(flavor = "multi_thread")]
async fn merge4_strings() {
    let in1 = produce(vec!["one"; 4]);
    let in2 = produce(vec!["two"; 4]);

    let out: Vec<&str> = merge4(Some(in1), Some(in2), None, None)
        .collect()
        .await;
    assert_eq!(
        out.into_iter().sorted().collect_vec(),
        vec!["one", "one", "one", "one", "two", "two", "two", "two"]
    );
}

#[tokio::test]
async fn merge_zero_is_closed() {
    let mut s = pin!(merge(Vec::<Receiver<i32>>::new()));
    assert_eq!(s.peek_next(), Peek::Closed);
    assert_eq!(s.next().await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn merge_one_is_passthrough() {
    let s = merge(vec![produce(vec![0, 1, 2, 3])]);
    assert_eq!(s.depth(), 0);
    assert_eq!(s.collect::<Vec<_>>().await, vec![0, 1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn merge_sizes() {
    let cases: [(usize, usize, fn(usize) -> usize); 5] = [
        (2, 4, |i| i),
        (3, 2, |i| i),
        (4, 2, |i| i),
        (5, 2, |i| i * i),
        (23, 1, |i| i),
    ];

    for (inputs, repeat, value) in cases {
        let streams: Vec<_> = (0..inputs)
            .map(|i| produce(vec![value(i); repeat]))
            .collect();
        let got: Vec<usize> = streams.merge().collect().await;

        let want = (0..inputs)
            .flat_map(|i| std::iter::repeat(value(i)).take(repeat))
            .sorted()
            .collect_vec();
        assert_eq!(got.into_iter().sorted().collect_vec(), want, "{inputs} inputs");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn merge_buffered_cases() {
    let none: Vec<Receiver<usize>> = Vec::new();
    let out: Vec<usize> = merge_buffered(&TokioSpawner, none)
        .unwrap()
        .collect()
        .await;
    assert!(out.is_empty());

    let single = merge_buffered(&TokioSpawner, vec![produce(vec![0usize, 1, 2, 3])]).unwrap();
    assert!(single.is_passthrough());
    assert_eq!(single.collect::<Vec<_>>().await, vec![0, 1, 2, 3]);

    let four: Vec<_> = (0..4usize).map(|i| produce(vec![i; 2])).collect();
    let out: Vec<usize> = four
        .merge_buffered(&TokioSpawner)
        .unwrap()
        .collect()
        .await;
    assert_eq!(
        out.into_iter().sorted().collect_vec(),
        vec![0, 0, 1, 1, 2, 2, 3, 3]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn merge_mixed_types_through_bridge() {
    let numbers = to_any(produce((0..4u32).collect()));
    let words = to_any(produce(vec!["a".to_string(), "b".to_string()]));

    let merged = merge(vec![numbers.boxed(), words.boxed()]);
    let out: Vec<_> = merged.collect().await;
    assert_eq!(out.len(), 6);

    let numbers = futures_lite::stream::iter(out.into_iter().filter(|v| v.is::<u32>()));
    let numbers: Vec<u32> = from_any::<u32, _>(numbers).collect().await;
    assert_eq!(numbers, vec![0, 1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn bridge_round_trips() {
    let empty = produce(Vec::<String>::new());
    let out: Vec<String> = from_any::<String, _>(to_any(empty)).collect().await;
    assert!(out.is_empty());

    let strings = produce((0..4).map(|i| i.to_string()).collect());
    let out: Vec<String> = from_any::<String, _>(to_any(strings)).collect().await;
    assert_eq!(out, vec!["0", "1", "2", "3"]);
}
