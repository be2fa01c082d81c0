//! Contexts racing on shared cells. Threads stand in for interrupt handlers.
use std::{
    sync::{Arc, Barrier},
    thread,
};

use sync_cells::{Bounded, Error, SharedU32, SharedU8};

const CONTEXTS: usize = 4;
const ROUNDS: u32 = 1000;

fn race<F>(f: F)
where
    F: Fn(usize) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let start = Arc::new(Barrier::new(CONTEXTS));
    let handles: Vec<_> = (0..CONTEXTS)
        .map(|i| {
            let (f, start) = (f.clone(), start.clone());
            thread::spawn(move || {
                start.wait();
                f(i)
            })
        })
        .collect();
    for h in handles {
        h.join().expect("context panicked");
    }
}

#[test]
fn increments_are_never_lost() {
    static HITS: SharedU32 = SharedU32::new(0);
    race(|_| {
        for _ in 0..ROUNDS {
            HITS.incr(1);
        }
    });
    assert_eq!(HITS.load(), CONTEXTS as u32 * ROUNDS);
}

#[test]
fn byte_counters_wrap_consistently() {
    static TICKS: SharedU8 = SharedU8::new(0);
    race(|_| {
        for _ in 0..ROUNDS {
            TICKS.incr(1);
        }
    });
    assert_eq!(TICKS.load(), ((CONTEXTS as u32 * ROUNDS) % 256) as u8);
}

#[test]
fn scenario_ten_to_fifteen_or_twenty() {
    for _ in 0..100 {
        let cell = Arc::new(SharedU32::new(10));
        let start = Arc::new(Barrier::new(2));
        let callers: Vec<_> = [15u32, 20]
            .into_iter()
            .map(|desired| {
                let (cell, start) = (cell.clone(), start.clone());
                thread::spawn(move || {
                    start.wait();
                    let mut expected = 10;
                    // Retry only spurious failures, which leave `expected` at 10.
                    while !cell.compare_and_set(&mut expected, desired) {
                        if expected != 10 {
                            return (false, expected);
                        }
                    }
                    (true, expected)
                })
            })
            .collect();
        let outcomes: Vec<_> = callers.into_iter().map(|c| c.join().unwrap()).collect();
        let final_value = cell.load();
        assert!(final_value == 15 || final_value == 20);
        match outcomes.as_slice() {
            [(true, 10), (false, seen)] | [(false, seen), (true, 10)] => {
                assert_eq!(*seen, final_value, "loser sees the winner's value");
            }
            other => panic!("expected exactly one winner, got {other:?}"),
        }
    }
}

#[test]
fn bounded_retries_either_land_or_report() {
    static SLOTS: SharedU32 = SharedU32::new(0);
    static GAVE_UP: SharedU32 = SharedU32::new(0);
    race(|_| {
        for _ in 0..ROUNDS {
            match SLOTS.incr_with(1, Bounded::new(1)) {
                Ok(_) => {}
                Err(Error::RetriesExhausted { attempts }) => {
                    assert_eq!(attempts, 2);
                    GAVE_UP.incr(1);
                }
            }
        }
    });
    assert_eq!(SLOTS.load() + GAVE_UP.load(), CONTEXTS as u32 * ROUNDS);
}
