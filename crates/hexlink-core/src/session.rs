//! Listener session - owns the socket, the registers and the session state.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::display::DisplayDriver;
use crate::events::{ListenerEvent, ListenerObserver, ShutdownReason, TracingObserver};
use crate::net::{DatagramSource, NetError};
use crate::params::load_parameters;
use crate::payload::{ImageAssembler, ImageSink};
use crate::protocol::constants::*;
use crate::register::{RegisterLayout, RegisterSpace};
use crate::state::handlers::{HandleResult, HandlerContext, handle_datagram, refresh_display};
use crate::state::Session;

/// Configuration for a listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind the UDP socket to.
    pub bind_addr: String,
    /// UDP port.
    pub port: u16,
    /// Nominal image chunk size; longer datagrams are dropped.
    pub max_chunk_size: usize,
    /// Datagram that starts an image transfer.
    pub start_token: String,
    /// Datagram that stops the listener.
    pub shutdown_token: String,
    /// Longest accepted command datagram.
    pub max_command_len: usize,
    /// Receive timeout between interrupt checks, in milliseconds.
    pub poll_interval_ms: u64,
    /// Physical memory device.
    pub device_path: String,
    /// Register window layout.
    pub registers: RegisterLayout,
    /// Where completed images are saved.
    pub image_path: String,
    /// Optional brightness/contrast parameter file.
    pub params_path: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_UDP_PORT,
            max_chunk_size: MAX_CHUNK_SIZE,
            start_token: String::from_utf8_lossy(IMAGE_START_TOKEN).into_owned(),
            shutdown_token: String::from_utf8_lossy(SHUTDOWN_TOKEN).into_owned(),
            max_command_len: MAX_COMMAND_LEN,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            device_path: "/dev/mem".to_string(),
            registers: RegisterLayout::default(),
            image_path: "hexlink_image.png".to_string(),
            params_path: None,
        }
    }
}

impl ListenerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ListenerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// The listener loop: receives datagrams and applies them one at a time.
pub struct Listener<R: RegisterSpace, S: DatagramSource, K: ImageSink, O: ListenerObserver> {
    config: ListenerConfig,
    driver: DisplayDriver<R>,
    source: S,
    sink: K,
    observer: Arc<O>,
    assembler: ImageAssembler,
    session: Session,
    interrupt: Option<&'static AtomicBool>,
}

impl<R: RegisterSpace, S: DatagramSource, K: ImageSink> Listener<R, S, K, TracingObserver> {
    /// Create a listener with the default tracing observer.
    pub fn new(config: ListenerConfig, regs: R, source: S, sink: K) -> Result<Self> {
        Self::with_observer(config, regs, source, sink, Arc::new(TracingObserver))
    }
}

impl<R: RegisterSpace, S: DatagramSource, K: ImageSink, O: ListenerObserver> Listener<R, S, K, O> {
    /// Create a listener with a custom observer.
    ///
    /// If a parameter file is configured and readable, the session starts
    /// from its values.
    pub fn with_observer(
        config: ListenerConfig,
        regs: R,
        source: S,
        sink: K,
        observer: Arc<O>,
    ) -> Result<Self> {
        let driver = DisplayDriver::new(regs, &config.registers)
            .context("Register layout does not fit the mapped window")?;

        let session = match &config.params_path {
            Some(path) if Path::new(path).exists() => match load_parameters(path) {
                Ok((brightness, contrast)) => {
                    info!(path = %path, brightness, contrast, "Restored parameters");
                    Session::with_values(brightness, contrast)
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Ignoring unreadable parameter file");
                    Session::new()
                }
            },
            _ => Session::new(),
        };

        Ok(Self {
            assembler: ImageAssembler::new(config.max_chunk_size),
            config,
            driver,
            source,
            sink,
            observer,
            session,
            interrupt: None,
        })
    }

    /// Stop at the next loop iteration once `flag` is set.
    pub fn with_interrupt(mut self, flag: &'static AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until the shutdown token, an interrupt, or a fatal receive error.
    ///
    /// The register space and the socket are released before returning on
    /// every path.
    #[instrument(skip(self), fields(port = self.config.port))]
    pub fn run(&mut self) -> Result<ShutdownReason> {
        let result = self.serve();
        self.release();

        let reason = match &result {
            Ok(reason) => *reason,
            Err(_) => ShutdownReason::Error,
        };
        self.observer.on_event(&ListenerEvent::Shutdown { reason });
        result
    }

    fn serve(&mut self) -> Result<ShutdownReason> {
        self.show_initial_state();
        self.observer.on_event(&ListenerEvent::Started {
            addr: self.source.local_addr(),
        });

        // One spare byte so a truncated oversize datagram is detectable.
        let max_len = self.config.max_chunk_size;
        let mut buf = vec![0u8; max_len + 1];
        let mut failures = 0u32;
        loop {
            if self.interrupted() {
                info!("Interrupted");
                return Ok(ShutdownReason::Interrupted);
            }

            let len = match self.source.recv(&mut buf) {
                Ok(Some((len, _peer))) => {
                    failures = 0;
                    len
                }
                Ok(None) => {
                    failures = 0;
                    continue;
                }
                Err(NetError::ReceiveFailed(e)) => {
                    failures += 1;
                    if failures >= MAX_RECEIVE_FAILURES {
                        return Err(NetError::ReceiveFailed(e))
                            .context(format!("{} consecutive receive failures", failures));
                    }
                    warn!(error = %e, failures, "Transient receive error, retrying...");
                    thread::sleep(Duration::from_millis(RECEIVE_RETRY_DELAY_MS));
                    continue;
                }
                Err(e) => return Err(e).context("Datagram source failed"),
            };

            if len > max_len {
                self.observer.on_event(&ListenerEvent::DatagramDropped {
                    len,
                    reason: format!("longer than {} bytes", max_len),
                });
                continue;
            }

            let mut ctx = HandlerContext {
                driver: &mut self.driver,
                sink: &mut self.sink,
                observer: self.observer.as_ref(),
                session: &mut self.session,
                assembler: &self.assembler,
                config: &self.config,
            };

            if handle_datagram(&buf[..len], &mut ctx) == HandleResult::Shutdown {
                return Ok(ShutdownReason::Sentinel);
            }
        }
    }

    fn show_initial_state(&mut self) {
        let mut ctx = HandlerContext {
            driver: &mut self.driver,
            sink: &mut self.sink,
            observer: self.observer.as_ref(),
            session: &mut self.session,
            assembler: &self.assembler,
            config: &self.config,
        };
        refresh_display(&mut ctx);
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn release(&mut self) {
        if let Err(e) = self.driver.close() {
            warn!(error = %e, "Failed to release register space");
        }
        self.source.close();
    }
}

impl<R: RegisterSpace, S: DatagramSource, K: ImageSink, O: ListenerObserver> Drop
    for Listener<R, S, K, O>
{
    fn drop(&mut self) {
        self.release();
    }
}
