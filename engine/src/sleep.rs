//! Blocking sleep that survives signal interruption.

use std::time::Duration;

/// Sleep for `delay`, resuming with the remaining time whenever a signal
/// interrupts the underlying timer. Any other timer failure is absorbed
/// silently: pacing is best-effort, not a correctness guarantee.
#[cfg(unix)]
pub fn sleep_interruptible(delay: Duration) {
    use std::io;

    let mut req = libc::timespec {
        tv_sec: delay.as_secs() as libc::time_t,
        tv_nsec: delay.subsec_nanos() as libc::c_long,
    };
    let mut rem = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    // SAFETY: req and rem are live, properly aligned timespec values for
    // the duration of each call.
    while unsafe { libc::nanosleep(&req, &mut rem) } == -1 {
        if io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
            req = rem;
            continue;
        }
        break;
    }
}

#[cfg(not(unix))]
pub fn sleep_interruptible(delay: Duration) {
    use std::thread;

    thread::sleep(delay);
}
