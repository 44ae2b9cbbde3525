//! Logging setup shared by both tools.
//!
//! Interactive runs log to stderr. Runs without a terminal (cron, CI) log to
//! the local syslog daemon instead, so output is never lost silently.

use crate::{Result, TemplateToolError};
use std::io::{self, IsTerminal, Write};
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// syslog facility USER.
const FACILITY_USER: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Foreground,
    Syslog,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub program_name: String,
    pub level: Level,
    pub target: LogTarget,
}

impl LogConfig {
    /// Pick the log target from whether stdin is attached to a terminal.
    pub fn detect(program_name: &str, debug: bool) -> Self {
        Self::new(program_name, debug, io::stdin().is_terminal())
    }

    pub fn new(program_name: &str, debug: bool, interactive: bool) -> Self {
        let (target, default_level) = if interactive {
            (LogTarget::Foreground, Level::INFO)
        } else {
            (LogTarget::Syslog, Level::WARN)
        };

        Self {
            program_name: program_name.to_string(),
            level: if debug { Level::DEBUG } else { default_level },
            target,
        }
    }

    /// Install the global subscriber.
    pub fn init(&self) -> Result<()> {
        let installed = match self.target {
            LogTarget::Foreground => tracing_subscriber::fmt()
                .with_max_level(self.level)
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .try_init(),
            LogTarget::Syslog => tracing_subscriber::fmt()
                .with_max_level(self.level)
                .with_writer(SyslogMakeWriter::connect(&self.program_name))
                .with_ansi(false)
                .with_target(false)
                .without_time()
                .try_init(),
        };

        installed.map_err(|e| TemplateToolError::Logging(e.to_string()))
    }
}

fn syslog_socket_path() -> &'static Path {
    if cfg!(target_os = "macos") {
        Path::new("/var/run/syslog")
    } else {
        Path::new("/dev/log")
    }
}

fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// Hands out one [`SyslogWriter`] per formatted event.
pub struct SyslogMakeWriter {
    tag: String,
    socket: Option<Arc<UnixDatagram>>,
}

impl SyslogMakeWriter {
    /// Connect to the local syslog socket. Falls back to stderr if the socket is unavailable.
    pub fn connect(program_name: &str) -> Self {
        let socket = UnixDatagram::unbound()
            .and_then(|socket| {
                socket.connect(syslog_socket_path())?;
                Ok(socket)
            })
            .ok()
            .map(Arc::new);

        Self {
            tag: format!("{}[{}]", program_name, std::process::id()),
            socket,
        }
    }

    fn writer_for(&self, level: &Level) -> SyslogWriter {
        SyslogWriter {
            priority: FACILITY_USER * 8 + severity(level),
            tag: self.tag.clone(),
            socket: self.socket.clone(),
            buffer: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer_for(&Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer_for(meta.level())
    }
}

/// Buffers one event and sends it as a single datagram when dropped.
pub struct SyslogWriter {
    priority: u8,
    tag: String,
    socket: Option<Arc<UnixDatagram>>,
    buffer: Vec<u8>,
}

impl SyslogWriter {
    fn message(&self) -> String {
        format!(
            "<{}>{}: {}",
            self.priority,
            self.tag,
            String::from_utf8_lossy(&self.buffer).trim_end()
        )
    }
}

impl Write for SyslogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let message = self.message();
        let sent = self
            .socket
            .as_ref()
            .map(|socket| socket.send(message.as_bytes()).is_ok())
            .unwrap_or(false);

        if !sent {
            let _ = writeln!(io::stderr(), "{}", message);
        }
    }
}
