//! # Tic-tac-toe Example
//!
//! Plays a scripted game against the classic behavioral tic-tac-toe rules:
//! - `enforceTurns`: X and O alternate, X first
//! - `square_N`: a taken square cannot be marked again
//! - `win_P_abc`: three marks of one player on a line request `win`
//! - `stopGame`: after `win`, nobody moves
//!
//! Illegal moves are simply blocked; the built-in [`LogWriter`] prints every
//! selection snapshot.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example tic_tac_toe --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use bthreads::{
    Action, Bid, Event, LogWriter, Matcher, Program, ProgramConfig, Rule, Subscribe, repeat, sync,
    thread,
};
use serde_json::json;

const LINES: [[u64; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

fn square(ev: &Event) -> Option<u64> {
    ev.detail()?.get("square")?.as_u64()
}

fn rules() -> Vec<(String, Rule)> {
    let mut rules = vec![
        (
            "enforceTurns".to_string(),
            repeat([
                sync(Bid::new().with_wait_for("X").with_block("O")),
                sync(Bid::new().with_wait_for("O").with_block("X")),
            ]),
        ),
        (
            "stopGame".to_string(),
            thread([
                sync(Bid::new().with_wait_for("win")),
                sync(Bid::new().with_block("X").with_block("O")),
            ]),
        ),
    ];

    for sq in 0..9u64 {
        let taken = move |ev: &Event| square(ev) == Some(sq);
        rules.push((
            format!("square_{sq}"),
            thread([
                sync(Bid::new().with_wait_for(Matcher::predicate(taken))),
                sync(Bid::new().with_block(Matcher::predicate(taken))),
            ]),
        ));
    }

    for player in ["X", "O"] {
        for line in LINES {
            let mark = move |ev: &Event| {
                ev.kind() == player && square(ev).is_some_and(|s| line.contains(&s))
            };
            let wait = || sync(Bid::new().with_wait_for(Matcher::predicate(mark)));
            rules.push((
                format!("win_{player}_{}{}{}", line[0], line[1], line[2]),
                thread([
                    wait(),
                    wait(),
                    wait(),
                    sync(Bid::new().with_request(
                        Event::new("win").with_detail(json!({ "player": player, "squares": line })),
                    )),
                ]),
            ));
        }
    }
    rules
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let program = Program::builder(ProgramConfig::default())
        .with_subscribers(subs)
        .build();
    program.add_threads(rules());

    program.feedback([
        (
            "X",
            Action::sync(|d| {
                println!("X marks {}", d.map(|v| v["square"].to_string()).unwrap_or_default());
                Ok(())
            }),
        ),
        (
            "O",
            Action::sync(|d| {
                println!("O marks {}", d.map(|v| v["square"].to_string()).unwrap_or_default());
                Ok(())
            }),
        ),
        (
            "win",
            Action::sync(|d| {
                println!("game over: {}", d.map(|v| v.to_string()).unwrap_or_default());
                Ok(())
            }),
        ),
    ]);

    // X0 is taken and O2 comes after the game is won: both are blocked.
    let moves = [("X", 4), ("O", 0), ("X", 0), ("X", 3), ("O", 1), ("X", 5), ("O", 2)];
    for (player, sq) in moves {
        program.trigger(Event::new(player).with_detail(json!({ "square": sq })));
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
}
