use spin_mpmc::Queue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    spin_mpmc::init_tracing();
    println!("Work Queue Example\n");

    const NUM_WORKERS: usize = 4;
    const NUM_JOBS: usize = 20;

    let jobs = Arc::new(Queue::<String, 128>::new());
    let results = Arc::new(Queue::<String, 128>::new());
    let accepting = Arc::new(AtomicBool::new(true));

    let jobs_tx = jobs.clone();
    let producer = thread::spawn(move || {
        for i in 0..NUM_JOBS {
            let job = format!("Job-{:02}", i);
            println!("Enqueued: {}", job);
            jobs_tx.push(job);
            thread::sleep(Duration::from_millis(50));
        }
        println!("All jobs enqueued!");
    });

    let mut workers = vec![];
    for worker_id in 0..NUM_WORKERS {
        let jobs_rx = jobs.clone();
        let results_tx = results.clone();
        let accepting = accepting.clone();

        workers.push(thread::spawn(move || {
            let mut processed = 0;
            // Keep going until the producer is done and nothing is in flight.
            while accepting.load(Ordering::Relaxed) || jobs_rx.has_work() {
                match jobs_rx.try_pop() {
                    Ok(job) => {
                        println!("Worker {} processing: {}", worker_id, job);
                        thread::sleep(Duration::from_millis(200));
                        results_tx.push(format!("{} -> completed by worker {}", job, worker_id));
                        processed += 1;
                    }
                    Err(_) => thread::sleep(Duration::from_millis(10)),
                }
            }
            println!("Worker {} finished ({} jobs)", worker_id, processed);
        }));
    }

    let results_rx = results.clone();
    let collector = thread::spawn(move || {
        for _ in 0..NUM_JOBS {
            println!("Result: {}", results_rx.pop());
        }
        println!("All results collected!");
    });

    producer.join().unwrap();
    accepting.store(false, Ordering::Relaxed);
    for worker in workers {
        worker.join().unwrap();
    }
    collector.join().unwrap();

    println!("\nWork queue example completed!");
}
