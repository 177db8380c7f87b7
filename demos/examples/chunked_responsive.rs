// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunked iteration that leaves room for other work.
//!
//! A large synchronous computation runs in 4 ms slices on a single-threaded
//! executor while a "frame" task keeps ticking between the slices.
//!
//! Run:
//! - `cargo run -p understory_demos --example chunked_responsive`

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use tracing_subscriber::EnvFilter;
use understory_collection::Collection;
use understory_iterate::Chunked;
use understory_iterate::yield_now::yield_now;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let finished = Rc::new(Cell::new(false));
    let frames = Rc::new(Cell::new(0_u32));

    {
        let finished = finished.clone();
        let frames = frames.clone();
        spawner
            .spawn_local(async move {
                let rows: Collection<u64> = (0..2_000_000).collect();
                let chunked = Chunked::new().with_budget(Duration::from_millis(4));
                let mut checksum = 0_u64;
                let _ = chunked
                    .for_each(&rows, |item| {
                        checksum = checksum.wrapping_mul(31).wrapping_add(*item.value);
                        ControlFlow::Continue(())
                    })
                    .await;
                println!(
                    "checksum {checksum:#x} after {} frames ticked alongside",
                    frames.get()
                );
                finished.set(true);
            })
            .expect("spawn chunked task");
    }
    {
        let finished = finished.clone();
        spawner
            .spawn_local(async move {
                while !finished.get() {
                    frames.set(frames.get() + 1);
                    yield_now().await;
                }
            })
            .expect("spawn frame task");
    }

    pool.run();
}
