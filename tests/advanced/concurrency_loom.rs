#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for the error estimator and buffer pool using loom.
//!
//! `loom` explores interleavings of concurrent writers and readers to check
//! that estimator reads never observe a value outside `[0, 1]` and that pooled
//! buffers are neither lost nor handed out twice.

use loom::{model, sync::Arc, thread};
use rsocket_wire::{
    balancer::{Ewma, EwmaConfig, OutcomeReporter},
    buffer::{BufferPool, PoolConfig, SharedBufferPool},
};

#[test]
fn concurrent_reports_and_reads_stay_bounded() {
    model(|| {
        let ewma = Arc::new(Ewma::new(EwmaConfig {
            seed: 0.5,
            ..EwmaConfig::default()
        }));

        let writers: Vec<_> = [true, false]
            .into_iter()
            .map(|success| {
                let ewma = Arc::clone(&ewma);
                thread::spawn(move || ewma.report(success))
            })
            .collect();

        let value = ewma.value();
        assert!((0.0..=1.0).contains(&value));

        for writer in writers {
            writer.join().expect("writer thread panicked");
        }
        assert!((0.0..=1.0).contains(&ewma.value()));
    });
}

#[test]
fn concurrent_release_respects_retention_limit() {
    model(|| {
        let pool = Arc::new(SharedBufferPool::new(PoolConfig {
            initial_capacity: 8,
            max_retained: 1,
        }));

        let workers: Vec<_> = (0..2u8)
            .map(|id| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    let mut buf = pool.acquire();
                    buf.extend_from_slice(&[id]);
                    pool.release(buf);
                })
            })
            .collect();

        for worker in workers {
            worker.join().expect("pool worker panicked");
        }
        assert_eq!(pool.retained(), 1);
        assert!(pool.acquire().is_empty());
    });
}
