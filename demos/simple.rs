//! Simple usage example

use spin_mpmc::Queue;
use std::sync::Arc;
use std::thread;

fn main() {
    spin_mpmc::init_tracing();
    println!("spin_mpmc - Simple Example\n");

    // 16 slots, 15 usable at once
    let queue = Arc::new(Queue::<String, 16>::new());

    let producer_queue = queue.clone();
    let consumer_queue = queue.clone();

    let producer = thread::spawn(move || {
        for i in 0..10 {
            let mut message = format!("Message {}", i);
            println!("Sending: {}", message);

            // Full: take the message back and retry
            while let Err(rejected) = producer_queue.try_push(message) {
                message = rejected.into_inner();
                std::hint::spin_loop();
            }

            thread::sleep(std::time::Duration::from_millis(100));
        }
        println!("Producer finished!");
    });

    let consumer = thread::spawn(move || {
        for _ in 0..10 {
            loop {
                match consumer_queue.try_pop() {
                    Ok(message) => {
                        println!("Received: {}", message);
                        break;
                    }
                    Err(_) => {
                        // Empty: spin and retry
                        std::hint::spin_loop();
                    }
                }
            }
        }
        println!("Consumer finished!");
    });

    producer.join().unwrap();
    consumer.join().unwrap();

    println!("\nExample completed successfully!");
}
