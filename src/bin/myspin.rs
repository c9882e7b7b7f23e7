/*
 * myspin.rs - A handy program for testing background jobs
 *
 * usage: myspin <n> [marker]
 * Sleeps for <n> seconds in 1-second chunks, then creates <marker> if given.
 */

use std::env;
use std::fs::File;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <n> [marker]", args[0]);
        process::exit(1);
    }

    let secs = args[1].parse::<u64>().unwrap_or_else(|_| {
        eprintln!("Error: <n> must be a positive integer");
        process::exit(1);
    });

    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
    }

    if let Some(marker) = args.get(2) {
        if let Err(err) = File::create(marker) {
            eprintln!("{}: {}", marker, err);
            process::exit(1);
        }
    }

    process::exit(0);
}
