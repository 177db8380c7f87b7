// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline stages.
//!
//! Describes "fetch the config, then fetch three assets at once, then render"
//! purely through the shape of the input, and prints when each step starts and ends.
//!
//! Run:
//! - `RUST_LOG=understory_iterate=debug cargo run -p understory_demos --example pipeline_stages`

use std::time::Duration;

use tokio::time::Instant;
use tracing_subscriber::EnvFilter;
use understory_collection::Collection;
use understory_iterate::pipeline::{Element, StagePlan, async_map};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let plan = Collection::sequence([
        Element::Value("config.toml"),
        Element::Batch(Collection::sequence(["logo.png", "font.ttf", "strings.json"])),
        Element::Value("render"),
    ]);

    let schedule = StagePlan::from_collection(&plan);
    println!("== Plan ({} stages) ==", schedule.len());
    for (key, stage) in schedule.iter() {
        println!("  stage {key}: {stage:?}");
    }

    let t0 = Instant::now();
    let out = async_map(plan, |item| {
        let name = *item.value;
        async move {
            println!("  {:>5?}  start {name}", t0.elapsed());
            // Pretend the work takes longer for longer names.
            tokio::time::sleep(Duration::from_millis(10 * name.len() as u64)).await;
            println!("  {:>5?}  done  {name}", t0.elapsed());
            name.len()
        }
    })
    .await;

    println!("== Results ==");
    for (key, element) in out {
        match element {
            Element::Value(n) => println!("  stage {key}: {n}"),
            Element::Batch(batch) => println!("  stage {key}: {:?}", batch.into_values()),
        }
    }
}
