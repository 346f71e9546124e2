//! # Custom Snapshot Subscriber Example
//!
//! Shows how to implement a custom subscriber that tracks scheduler statistics.
//!
//! The example counts:
//! - Selection steps
//! - Blocked proposals seen in those steps
//! - Failing feedback actions
//!
//! ## Run
//! ```bash
//! cargo run --example snapshot_subscriber
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bthreads::{
    Action, Bid, Event, FeedbackError, Program, ProgramConfig, SnapshotMessage, Subscribe, repeat,
    sync, thread,
};

struct StatsSubscriber {
    steps: AtomicU64,
    blocked: AtomicU64,
    failures: AtomicU64,
}

impl StatsSubscriber {
    fn new() -> Self {
        Self {
            steps: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    fn print_stats(&self) {
        println!();
        println!("Stats:");
        println!(" ├─► Steps:    {}", self.steps.load(Ordering::Relaxed));
        println!(" ├─► Blocked:  {}", self.blocked.load(Ordering::Relaxed));
        println!(" └─► Failures: {}", self.failures.load(Ordering::Relaxed));
    }
}

#[async_trait::async_trait]
impl Subscribe for StatsSubscriber {
    async fn on_snapshot(&self, msg: &SnapshotMessage) {
        match msg {
            SnapshotMessage::Selection { entries } => {
                self.steps.fetch_add(1, Ordering::Relaxed);
                let blocked = entries.iter().filter(|e| e.blocked_by.is_some()).count();
                self.blocked.fetch_add(blocked as u64, Ordering::Relaxed);
                if let Some(winner) = entries.iter().find(|e| e.selected) {
                    println!("[step] {} ← {}", winner.kind, winner.thread);
                }
            }
            SnapshotMessage::FeedbackError {
                event_type, error, ..
            } => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                println!("[error] {event_type}: {error}");
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "stats"
    }

    fn queue_capacity(&self) -> usize {
        256
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let stats = Arc::new(StatsSubscriber::new());

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::clone(&stats) as Arc<dyn Subscribe>];
    let program = Program::builder(ProgramConfig::default())
        .with_subscribers(subs)
        .build();

    let cup = |n: u32| Event::new("pour").with_detail(serde_json::json!({ "cup": n }));
    program.add_threads([
        (
            "pourThree",
            thread([
                sync(Bid::new().with_request(cup(1))),
                sync(Bid::new().with_request(cup(2))),
                sync(Bid::new().with_request(cup(3))),
            ]),
        ),
        (
            "stirBetween",
            repeat([
                sync(Bid::new().with_wait_for("pour").with_block("serve")),
                sync(Bid::new().with_request(Event::new("stir")).with_block("pour")),
            ]),
        ),
        ("serve", sync(Bid::new().with_request(Event::new("serve")).with_priority(10))),
    ]);

    program.feedback([(
        "stir",
        Action::sync(|_| Err(FeedbackError::fail("spoon missing"))),
    )]);

    program.trigger(Event::new("start"));

    // let the subscriber drain its queue
    tokio::time::sleep(Duration::from_millis(50)).await;
    stats.print_stats();
}
