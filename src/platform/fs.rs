// include-walker - platform/fs.rs
//
// Reading build logs from disk.
//
// Logs written by Visual Studio are not guaranteed to be UTF-8 (paths in the
// system code page are common), so every read is lossy rather than failing
// the whole scan on one bad byte.

use crate::util::constants::{LARGE_FILE_THRESHOLD, MAX_READ_RETRIES, READ_RETRY_DELAYS_MS};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Read the full content of a log file as a string.
///
/// Files above `LARGE_FILE_THRESHOLD` are read through a memory map; smaller
/// files are read into memory with transient-error retries.
pub fn read_log_file(path: &Path) -> io::Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size > LARGE_FILE_THRESHOLD {
        tracing::debug!(path = %path.display(), size, "Reading large log through memory map");
        read_large_file(path)
    } else {
        read_file_with_retry(path)
    }
}

/// Read using `memmap2` for large files (avoids a second full-size buffer
/// for the raw bytes).
fn read_large_file(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. External
    // modification of a finished build log while it is mapped is accepted.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Read a file with transient-error retries.
fn read_file_with_retry(path: &Path) -> io::Result<String> {
    let mut last_err: Option<io::Error> = None;

    for (attempt, delay_ms) in READ_RETRY_DELAYS_MS.iter().enumerate().take(MAX_READ_RETRIES) {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    path = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(*delay_ms));
                last_err = Some(e);
            }
            Err(e) => return Err(e), // Permanent error; do not retry.
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
