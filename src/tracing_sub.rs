use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Level;

/// Where log lines go. A full-screen app owns stdout, so the usual choice is
/// a file; stderr is only useful when it is redirected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    #[default]
    Off,
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<File>),
    Stderr(io::Stderr),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(file) => (&**file).write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(file) => (&**file).flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    file: Option<Arc<File>>,
}

impl SubscriberMakeWriter {
    pub fn for_target(target: &LogTarget) -> io::Result<Option<Self>> {
        match target {
            LogTarget::Off => Ok(None),
            LogTarget::Stderr => Ok(Some(Self { file: None })),
            LogTarget::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Some(Self {
                    file: Some(Arc::new(file)),
                }))
            }
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.file {
            Some(file) => DelegatingInner::File(Arc::clone(file)),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

/// Install the global subscriber for `target`. Calling it again once a
/// subscriber is set is a no-op; only opening the log file can fail.
pub fn init_default(target: &LogTarget) -> io::Result<()> {
    let Some(writer) = SubscriberMakeWriter::for_target(target)? else {
        return Ok(());
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}
