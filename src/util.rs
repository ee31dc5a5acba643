use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the fmt subscriber once; honours RUST_LOG (default "info").
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Transient errors worth retrying on a file op: sharing/lock violations and
/// AV/backup interference on Windows, EBUSY/ETXTBSY elsewhere.
fn is_retriable_io_error(e: &io::Error) -> bool {
    if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) {
        return true;
    }
    if cfg!(windows) {
        matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 225 | 1224))
    } else {
        matches!(e.raw_os_error(), Some(16 | 26))
    }
}

/// Run `op` up to `tries` times with linear backoff while it fails with a retriable error.
fn retry_io<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) && attempt + 1 < tries => {
                attempt += 1;
                tracing::debug!(attempt, error = %e, "transient I/O error, retrying");
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    retry_io(tries, delay_ms, || File::create(path))
}

/// Move `tmp` over `dest`. Falls back to copy + remove when rename is refused
/// (e.g. `dest` held open by another process, or a cross-device move).
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    let (tries, delay_ms) = (20, 50);
    if retry_io(tries, delay_ms, || fs::rename(tmp, dest)).is_ok() {
        return Ok(());
    }
    retry_io(tries, delay_ms, || fs::copy(tmp, dest))
        .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    retry_io(tries, delay_ms, || match fs::remove_file(tmp) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", tmp.display()))?;
    Ok(())
}
