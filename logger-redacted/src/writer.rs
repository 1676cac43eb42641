use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use crate::redactor::PiiRedactor;

/// `MakeWriter` that runs every formatted log line through a [`PiiRedactor`]
/// before it reaches the underlying sink.
#[derive(Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: Option<Arc<PiiRedactor>>,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M, redactor: PiiRedactor) -> Self {
        Self {
            inner,
            redactor: Some(Arc::new(redactor)),
        }
    }

    /// Writer that forwards lines untouched (redaction disabled).
    pub fn passthrough(inner: M) -> Self {
        Self { inner, redactor: None }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            redactor: self.redactor.clone(),
        }
    }
}

pub struct RedactingWriter<W> {
    inner: W,
    redactor: Option<Arc<PiiRedactor>>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.redactor {
            None => self.inner.write(buf),
            Some(redactor) => {
                let line = String::from_utf8_lossy(buf);
                self.inner.write_all(redactor.redact(&line).as_bytes())?;
                // The caller's bytes were consumed even if the redacted line is shorter.
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactor::RedactionConfig;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_lines_are_redacted() {
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();
        let writer = RedactingMakeWriter::new(move || sink.clone(), PiiRedactor::new(RedactionConfig::default()));

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(appointment_id = "apt-1", "reminder sent to pat@example.com");
        });

        let output = buffer.contents();
        assert!(output.contains("apt-1"));
        assert!(output.contains("p***@e***"));
        assert!(!output.contains("pat@example.com"));
    }

    #[test]
    fn test_passthrough_leaves_lines_alone() {
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();
        let writer = RedactingMakeWriter::passthrough(move || sink.clone());

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("pat@example.com");
        });

        assert!(buffer.contents().contains("pat@example.com"));
    }
}
