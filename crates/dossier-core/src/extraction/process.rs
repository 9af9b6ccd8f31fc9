use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Wait for `child` to exit. On timeout the child is killed and reaped and
/// `Ok(None)` is returned. If polling fails the child is killed and reaped
/// before the error is returned.
pub fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    wait_polling(child, timeout, |c| c.try_wait())
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn wait_polling(
    child: &mut Child,
    timeout: Duration,
    mut poll: impl FnMut(&mut Child) -> std::io::Result<Option<ExitStatus>>,
) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        match poll(child) {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                kill_and_reap(child);
                return Err(e);
            }
        }
        if start.elapsed() > timeout {
            kill_and_reap(child);
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
