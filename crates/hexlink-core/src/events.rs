//! Event system for UI decoupling.
//!
//! Allows CLI or other front-ends to subscribe to listener events without
//! tight coupling to the core loop.

use std::fmt;
use std::net::SocketAddr;

use crate::display::SignIndicator;
use crate::payload::ImageInfo;
use crate::protocol::Command;
use crate::state::Mode;

/// Log level for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Why the listener loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The shutdown token was received.
    Sentinel,
    /// The process was interrupted.
    Interrupted,
    /// The loop stopped on an error.
    Error,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Sentinel => write!(f, "shutdown token"),
            ShutdownReason::Interrupted => write!(f, "interrupt"),
            ShutdownReason::Error => write!(f, "error"),
        }
    }
}

/// Events emitted by the listener.
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    /// Listener is ready to receive.
    Started { addr: Option<SocketAddr> },
    /// Session mode changed.
    ModeChanged { from: Mode, to: Mode },
    /// A command was applied to the display.
    CommandApplied {
        command: Command,
        brightness: i32,
        contrast: i32,
    },
    /// A datagram was dropped without changing state.
    DatagramDropped { len: usize, reason: String },
    /// A full-size image chunk was buffered.
    ImageProgress { received: usize },
    /// An image was assembled and accepted by the sink.
    ImageComplete { len: usize, info: ImageInfo },
    /// An image was assembled but the sink rejected it.
    ImageFailed { len: usize, message: String },
    /// A sign indicator group was lit or cleared.
    IndicatorChanged { indicator: SignIndicator, on: bool },
    /// Log message.
    Log { level: LogLevel, message: String },
    /// The loop has stopped and released its resources.
    Shutdown { reason: ShutdownReason },
}

/// Observer trait for receiving listener events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait ListenerObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &ListenerEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl ListenerObserver for NullObserver {
    fn on_event(&self, _event: &ListenerEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl ListenerObserver for TracingObserver {
    fn on_event(&self, event: &ListenerEvent) {
        match event {
            ListenerEvent::Started { addr } => match addr {
                Some(addr) => tracing::info!(addr = %addr, "Listening"),
                None => tracing::info!("Listening"),
            },
            ListenerEvent::ModeChanged { from, to } => {
                tracing::info!(from = %from, to = %to, "Mode changed");
            }
            ListenerEvent::CommandApplied {
                command,
                brightness,
                contrast,
            } => {
                tracing::info!(command = %command, brightness, contrast, "Command applied");
            }
            ListenerEvent::DatagramDropped { len, reason } => {
                tracing::warn!(len, "Datagram dropped: {}", reason);
            }
            ListenerEvent::ImageProgress { received } => {
                tracing::debug!(received, "Image chunk buffered");
            }
            ListenerEvent::ImageComplete { len, info } => {
                tracing::info!(len, width = info.width, height = info.height, "Image complete");
            }
            ListenerEvent::ImageFailed { len, message } => {
                tracing::warn!(len, "Image discarded: {}", message);
            }
            ListenerEvent::IndicatorChanged { indicator, on } => {
                tracing::info!(indicator = %indicator, on, "Sign indicator changed");
            }
            ListenerEvent::Log { level, message } => match level {
                LogLevel::Trace => tracing::trace!("{}", message),
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
            ListenerEvent::Shutdown { reason } => {
                tracing::info!(reason = %reason, "Listener stopped");
            }
        }
    }
}
