//! Concurrency tests: parallel increments must never lose an update.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use sdk_rust::CounterClient;
use visit_counter::store::MemoryStore;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_increments_are_atomic() {
    let server = common::start_server(MemoryStore::new()).await;
    let client = Arc::new(CounterClient::with_client(&server.url(), common::http_client()));

    let concurrency = 50;
    let mut tasks = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let client = client.clone();
        tasks.push(tokio::spawn(async move { client.increment().await.map(|r| r.count) }));
    }

    let mut seen: Vec<i64> = Vec::with_capacity(concurrency);
    for task in tasks {
        seen.push(task.await.unwrap().unwrap());
    }

    // INCR hands out every value exactly once.
    seen.sort_unstable();
    assert_eq!(seen, (1..=concurrency as i64).collect::<Vec<_>>());
    assert_eq!(client.count().await.unwrap().count, concurrency as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_load_mixed_reads_and_writes() {
    let server = common::start_server(MemoryStore::new()).await;
    let client = CounterClient::with_client(&server.url(), common::http_client());

    let concurrency = 20;
    let requests_per_task = 10;
    let start = Instant::now();

    let workers = (0..concurrency).map(|_| async {
        let mut ok = 0;
        for i in 0..requests_per_task {
            let result = if i % 2 == 0 {
                client.increment().await
            } else {
                client.count().await
            };
            if result.is_ok() {
                ok += 1;
            }
        }
        ok
    });
    let successes: usize = join_all(workers).await.into_iter().sum();

    let elapsed = start.elapsed();
    println!(
        "{} requests in {:?} ({:.0} req/s)",
        successes,
        elapsed,
        successes as f64 / elapsed.as_secs_f64()
    );

    assert_eq!(successes, concurrency * requests_per_task);
    let expected = (concurrency * requests_per_task / 2) as i64;
    assert_eq!(client.count().await.unwrap().count, expected);
}
