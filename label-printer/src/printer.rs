//! Printer adapters for sending finished documents
//!
//! Supports:
//! - Network printers (raw TCP port 9100)
//! - Spooler commands (`lp`, `lpr`, or any tool taking a file path)

use crate::error::{PrintError, PrintResult};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{info, instrument};

/// Argument placeholder replaced by the path of a spooled copy of the document
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Trait for printer adapters
pub trait Printer: Send + Sync {
    /// Send one complete document to the printer
    fn print(&self, data: &[u8]) -> impl Future<Output = PrintResult<()>> + Send;
}

/// Raw printing port spoken by most networked label printers
pub const RAW_PORT: u16 = 9100;

/// Printer reached over raw TCP
///
/// The whole document is streamed over one connection, which is then
/// shut down so the printer sees the end of the job.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl NetworkPrinter {
    /// `ip` or `ip:port`; the port defaults to [`RAW_PORT`]
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr = addr.trim();
        let parsed = addr
            .parse::<SocketAddr>()
            .or_else(|_| {
                addr.parse::<std::net::IpAddr>()
                    .map(|ip| SocketAddr::new(ip, RAW_PORT))
            })
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid printer address: {}", addr)))?;

        Ok(Self {
            addr: parsed,
            connect_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(30),
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connecting to {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        let write = async {
            stream.write_all(data).await?;
            stream.shutdown().await
        };
        tokio::time::timeout(self.write_timeout, write)
            .await
            .map_err(|_| PrintError::Timeout(format!("{} did not take the job", self.addr)))??;
        Ok(())
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.addr, bytes = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        self.send(data).await?;
        info!("Document streamed to printer");
        Ok(())
    }
}

/// Printer driven by an external spooler command
///
/// The document is spooled to a temporary `.pdf` file whose path replaces
/// [`FILE_PLACEHOLDER`] in the arguments. Without a placeholder the path is
/// passed as the last argument, the way `lp` and `lpr` expect it.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPrinter {
    pub fn new(program: impl Into<String>, mut args: Vec<String>) -> Self {
        if !args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            args.push(FILE_PLACEHOLDER.to_string());
        }
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(30),
        }
    }

    /// Parse a whitespace separated command line, e.g. `lp -d Zebra`
    pub fn parse(command_line: &str) -> PrintResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| PrintError::InvalidConfig("Empty print command".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Set how long the command may run
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, file: &str) -> PrintResult<()> {
        let mut command = Command::new(&self.program);
        command
            .args(self.args.iter().map(|a| a.replace(FILE_PLACEHOLDER, file)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| PrintError::Command(format!("{}: {}", self.program, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| PrintError::Timeout(format!("{} did not finish", self.program)))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrintError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Printer for CommandPrinter {
    #[instrument(skip(self, data), fields(program = %self.program, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let mut spool = tempfile::Builder::new()
            .prefix("label-")
            .suffix(".pdf")
            .tempfile()?;
        spool.write_all(data)?;
        spool.flush()?;

        let path = spool.path().to_string_lossy().into_owned();
        // spool must outlive the child
        self.run(&path).await?;
        drop(spool);

        info!("Print job spooled");
        Ok(())
    }
}

/// Printer chosen at startup from configuration
#[derive(Debug, Clone)]
pub enum AnyPrinter {
    Network(NetworkPrinter),
    Command(CommandPrinter),
}

impl Printer for AnyPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            AnyPrinter::Network(p) => p.print(data).await,
            AnyPrinter::Command(p) => p.print(data).await,
        }
    }
}
