//! Capture `tracing` output produced inside a closure.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber recording every event at `DEBUG`
/// and above; returns `f`'s result plus the formatted log text (no ANSI).
pub fn capture_logs<F, R>(f: F) -> (R, String)
where
    F: FnOnce() -> R,
{
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(buffer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    (result, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_structured_fields() {
        let (value, logs) = capture_logs(|| {
            tracing::info!(hidden_count = 3, "refiltered entries");
            7
        });
        assert_eq!(value, 7);
        assert!(logs.contains("refiltered entries"));
        assert!(logs.contains("hidden_count=3"));
    }
}
