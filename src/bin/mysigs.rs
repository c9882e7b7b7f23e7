/*
 * mysigs.rs - Reports how this process was left to handle job-control signals
 *
 * usage: mysigs
 * Prints "<SIGNAL> <default|ignore|handler>" for each signal a shell
 * is expected to reset before running a program, SIGPIPE included.
 */

use nix::libc;
use nix::sys::signal::Signal;
use std::process;

const SIGNALS: [Signal; 7] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTERM,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
    Signal::SIGPIPE,
];

fn main() {
    for signal in SIGNALS {
        let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
        // A null new action only queries.
        if unsafe { libc::sigaction(signal as libc::c_int, std::ptr::null(), &mut current) } != 0 {
            eprintln!("sigaction error: {}", nix::errno::Errno::last());
            process::exit(1);
        }
        let disposition = match current.sa_sigaction {
            libc::SIG_DFL => "default",
            libc::SIG_IGN => "ignore",
            _ => "handler",
        };
        println!("{} {}", signal, disposition);
    }
}
