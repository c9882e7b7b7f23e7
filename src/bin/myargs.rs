/*
 * myargs.rs - Shows exactly what argument vector a program received
 *
 * usage: myargs [args...]
 * Prints argv[0] and every argument after it, one per line.
 */

use std::env;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

fn main() {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for arg in env::args_os() {
        out.write_all(arg.as_bytes()).unwrap();
        out.write_all(b"\n").unwrap();
    }
}
