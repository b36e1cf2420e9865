//! Per-run log context.

use crate::error::{PaparaError, PaparaResult};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Log handle owned by one run and passed by reference to every stage.
///
/// Messages go to the `log` facade and, when a sink is attached, are also
/// written line by line to it (normally `papara_log.<run>`).
#[derive(Default)]
pub struct RunLog {
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl RunLog {
    /// Log without a file sink.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Mutex::new(Box::new(sink))),
        }
    }

    /// Creates the log file for `run`. An existing file is replaced only when
    /// `overwrite` is set.
    pub fn create(path: &Path, run: &str, overwrite: bool) -> PaparaResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(overwrite)
            .create(overwrite)
            .create_new(!overwrite)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => PaparaError::RunExists {
                    run: run.to_string(),
                },
                _ => PaparaError::Io(e),
            })?;
        Ok(Self::with_sink(io::BufWriter::new(file)))
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        log::info!("{}", args);
        self.write_line(args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!("{}", args);
        self.write_line(args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!("{}", args);
        self.write_line(args);
    }

    pub fn flush(&self) -> PaparaResult<()> {
        if let Some(sink) = &self.sink {
            if let Ok(mut w) = sink.lock() {
                w.flush()?;
            }
        }
        Ok(())
    }

    fn write_line(&self, args: fmt::Arguments<'_>) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Ok(mut w) = sink.lock() {
            // best effort, write errors are dropped
            let _ = writeln!(w, "{}", args);
        }
    }
}

impl fmt::Debug for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLog")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// In-memory sink shared with the test body.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn sink_receives_lines() {
        let buf = SharedBuf::default();
        let log = RunLog::with_sink(buf.clone());
        log.info(format_args!("scoring {} queries", 3));
        log.debug(format_args!("done"));
        log.flush().unwrap();
        assert_eq!(buf.text(), "scoring 3 queries\ndone\n");
    }

    #[test]
    fn plain_log_has_no_sink() {
        let log = RunLog::new();
        assert!(!log.has_sink());
        log.info(format_args!("ignored"));
        log.flush().unwrap();
    }

    #[test]
    fn existing_log_file_needs_overwrite() {
        let dir = std::env::temp_dir().join(format!("papara_runlog_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("papara_log.exists");
        std::fs::write(&path, b"old").unwrap();
        match RunLog::create(&path, "exists", false) {
            Err(PaparaError::RunExists { run }) => assert_eq!(run, "exists"),
            other => panic!("expected run exists, got {other:?}"),
        }

        let log = RunLog::create(&path, "exists", true).unwrap();
        log.info(format_args!("fresh"));
        log.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
