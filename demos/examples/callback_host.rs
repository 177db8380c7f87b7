// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback-shaped operations.
//!
//! A toy host queues callbacks and fires them later, out of order.
//! Each operation hands the host a one-shot `Done` and returns the paired `Signal`.
//! The serial run shows that the next request is only issued once the previous
//! callback fired; the parallel run shows results in key order regardless.
//!
//! Run:
//! - `RUST_LOG=understory_iterate=trace cargo run -p understory_demos --example callback_host`

use std::cell::RefCell;
use std::ops::ControlFlow;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use tracing_subscriber::EnvFilter;
use understory_collection::Collection;
use understory_iterate::completion::{self, Done};
use understory_iterate::{parallel_map, serial_for_each};

/// Pending callbacks, fired newest first.
#[derive(Default)]
struct Host {
    pending: RefCell<Vec<(String, Done<usize>)>>,
}

impl Host {
    fn request(&self, url: &str, done: Done<usize>) {
        println!("  request {url}");
        self.pending.borrow_mut().push((url.to_owned(), done));
    }

    /// Fire every queued callback. Returns false when there was nothing to fire.
    fn fire_all(&self) -> bool {
        // Drain first so a woken operation can queue its next request.
        let fired: Vec<_> = self.pending.borrow_mut().drain(..).rev().collect();
        let any = !fired.is_empty();
        for (url, done) in fired {
            println!("  respond {url}");
            done.finish(url.len());
        }
        any
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host: &'static Host = Box::leak(Box::new(Host::default()));
    let urls: &'static Collection<&str> = Box::leak(Box::new(Collection::mapping([
        ("home", "/"),
        ("about", "/about"),
        ("contact", "/contact-us"),
    ])));

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    println!("== Parallel ==");
    spawner
        .spawn_local(async move {
            let sizes = parallel_map(urls, |item| {
                let (done, signal) = completion::channel();
                host.request(item.value, done);
                signal
            })
            .await;
            for (key, size) in sizes {
                println!("  {key}: {size:?}");
            }
        })
        .expect("spawn parallel run");
    drive(&mut pool, host);

    println!("== Serial ==");
    spawner
        .spawn_local(async move {
            let flow = serial_for_each(urls, |item| {
                let (done, signal) = completion::channel();
                host.request(item.value, done);
                async move {
                    match signal.await {
                        Ok(_) => ControlFlow::Continue(()),
                        Err(_) => ControlFlow::Break(()),
                    }
                }
            })
            .await;
            println!("  finished: {flow:?}");
        })
        .expect("spawn serial run");
    drive(&mut pool, host);
}

fn drive(pool: &mut LocalPool, host: &Host) {
    loop {
        pool.run_until_stalled();
        if !host.fire_all() {
            break;
        }
    }
}
