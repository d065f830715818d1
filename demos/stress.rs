//! Eight producers and eight consumers hammer one queue for a while, then
//! shut down: producers stop first, consumers drain while the queue still
//! reports work. Every item is a shared checker that complains if it is
//! destroyed without having been popped, or popped twice.
//!
//! Run with `cargo run --release --example stress --features tracing` to get
//! the queue's own debug output as well.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use spin_mpmc::{Backoff, Pause, PushError, Queue};

const SLOTS: usize = 100;
const PRODUCERS: usize = 8;
const CONSUMERS: usize = 8;
const ROUNDS: usize = 4;
const ROUND_LENGTH: Duration = Duration::from_secs(1);

type Item = Arc<Checker>;
type SharedQueue = Arc<Queue<Item, SLOTS>>;

struct Checker {
    popped: AtomicBool,
    ok: Arc<AtomicBool>,
}

impl Checker {
    fn popped(&self) {
        if self.popped.swap(true, Ordering::AcqRel) {
            eprintln!("popped twice!");
            self.ok.store(false, Ordering::Relaxed);
        }
    }
}

impl Drop for Checker {
    fn drop(&mut self) {
        if !self.popped.load(Ordering::Acquire) {
            eprintln!("destroyed unpopped!");
            self.ok.store(false, Ordering::Relaxed);
        }
    }
}

/// Hands out checkers. Mutex-guarded to mimic a shared, non-trivial source.
struct Generator {
    issued: Mutex<u64>,
}

impl Generator {
    fn generate(&self, ok: &Arc<AtomicBool>) -> Item {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        *issued += 1;
        Arc::new(Checker {
            popped: AtomicBool::new(false),
            ok: Arc::clone(ok),
        })
    }
}

/// Retry pacing for the driver loops, separate from the queue's own.
fn driver_backoff() -> Backoff {
    Backoff::new()
        .spin_limit(0)
        .step(Duration::from_nanos(1))
        .max(Duration::from_nanos(100))
        .wrap(false)
}

fn produce(queue: SharedQueue, ok: Arc<AtomicBool>, run: Arc<AtomicBool>, generator: Arc<Generator>) {
    let backoff = driver_backoff();
    while run.load(Ordering::Relaxed) {
        let mut item = generator.generate(&ok);
        let mut pause = backoff.first();
        while let Err(PushError(rejected)) = queue.try_push(item) {
            if !run.load(Ordering::Relaxed) {
                // Shutting down: the item never entered the queue.
                rejected.popped();
                break;
            }
            item = rejected;
            pause = backoff.pause(pause);
        }
    }
}

fn consume(queue: SharedQueue, run: Arc<AtomicBool>, counter: Arc<AtomicU64>) {
    let backoff = driver_backoff();
    let mut pause = backoff.first();
    let take = |pause: Pause| match queue.try_pop() {
        Ok(item) => {
            item.popped();
            counter.fetch_add(1, Ordering::Relaxed);
            backoff.first()
        }
        Err(_) => backoff.pause(pause),
    };

    while run.load(Ordering::Relaxed) {
        pause = take(pause);
    }

    // Clear anything still in flight.
    while queue.has_work() {
        pause = take(pause);
    }
}

fn run_round() -> bool {
    let queue: SharedQueue = Arc::new(Queue::new());
    let ok = Arc::new(AtomicBool::new(true));
    let generator = Arc::new(Generator {
        issued: Mutex::new(0),
    });
    let counter = Arc::new(AtomicU64::new(0));
    let run_producers = Arc::new(AtomicBool::new(true));
    let run_consumers = Arc::new(AtomicBool::new(true));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let (queue, ok, run, generator) = (
                queue.clone(),
                ok.clone(),
                run_producers.clone(),
                generator.clone(),
            );
            thread::Builder::new()
                .name(format!("producer-{id}"))
                .spawn(move || produce(queue, ok, run, generator))
                .expect("spawn producer")
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|id| {
            let (queue, run, counter) = (queue.clone(), run_consumers.clone(), counter.clone());
            thread::Builder::new()
                .name(format!("consumer-{id}"))
                .spawn(move || consume(queue, run, counter))
                .expect("spawn consumer")
        })
        .collect();

    thread::sleep(ROUND_LENGTH);
    run_producers.store(false, Ordering::Relaxed);
    for producer in producers {
        producer.join().expect("producer panicked");
    }

    run_consumers.store(false, Ordering::Relaxed);
    for consumer in consumers {
        consumer.join().expect("consumer panicked");
    }

    let has_data = queue.has_data();
    let has_work = queue.has_work();
    drop(queue);
    let ok = ok.load(Ordering::Acquire);
    let issued = *generator.issued.lock().unwrap_or_else(|e| e.into_inner());

    println!(
        "popped {:>10} of {:>10} issued | ok: {} | has_data: {} | has_work: {}",
        counter.load(Ordering::Acquire),
        issued,
        ok,
        has_data,
        has_work
    );

    ok && !has_data && !has_work
}

fn main() {
    spin_mpmc::init_tracing();
    println!("Stress started: {PRODUCERS} producers, {CONSUMERS} consumers, {SLOTS} slots");

    let started = Instant::now();
    for round in 1..=ROUNDS {
        print!("round {round}: ");
        if !run_round() {
            println!("Stress FAILED");
            std::process::exit(1);
        }
    }

    println!("Stress passed in {:.2?}", started.elapsed());
}
