//! Datagram handlers - dispatch logic for each datagram class.

use tracing::{debug, info, warn};

use crate::display::DisplayDriver;
use crate::events::{ListenerEvent, ListenerObserver, LogLevel};
use crate::params::save_parameters;
use crate::payload::{AssemblyState, ImageAssembler, ImageSink};
use crate::protocol::command::{Command, parse_with_limit};
use crate::register::RegisterSpace;
use crate::session::ListenerConfig;
use crate::state::machine::{Mode, Session};

/// Result of handling a datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// Keep receiving.
    Continue,
    /// Shutdown token received.
    Shutdown,
}

/// Datagram handler context containing all resources.
pub struct HandlerContext<'a, R: RegisterSpace, K: ImageSink, O: ListenerObserver> {
    pub driver: &'a mut DisplayDriver<R>,
    pub sink: &'a mut K,
    pub observer: &'a O,
    pub session: &'a mut Session,
    pub assembler: &'a ImageAssembler,
    pub config: &'a ListenerConfig,
}

impl<'a, R: RegisterSpace, K: ImageSink, O: ListenerObserver> HandlerContext<'a, R, K, O> {
    pub(crate) fn emit(&self, event: ListenerEvent) {
        self.observer.on_event(&event);
    }

    pub(crate) fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(ListenerEvent::Log {
            level,
            message: message.into(),
        });
    }

    fn drop_datagram(&self, len: usize, reason: impl Into<String>) {
        self.emit(ListenerEvent::DatagramDropped {
            len,
            reason: reason.into(),
        });
    }
}

/// Classify one datagram and apply it.
///
/// Order matters: the shutdown token wins over everything, the start token
/// over image data, and image data over commands.
pub fn handle_datagram<R: RegisterSpace, K: ImageSink, O: ListenerObserver>(
    datagram: &[u8],
    ctx: &mut HandlerContext<'_, R, K, O>,
) -> HandleResult {
    if datagram == ctx.config.shutdown_token.as_bytes() {
        info!(mode = %ctx.session.mode, "Shutdown token received");
        return HandleResult::Shutdown;
    }
    if datagram == ctx.config.start_token.as_bytes() {
        handle_image_start(ctx);
        return HandleResult::Continue;
    }
    if ctx.session.is_receiving_image() {
        handle_image_chunk(datagram, ctx);
        return HandleResult::Continue;
    }
    handle_command(datagram, ctx)
}

fn handle_image_start<R: RegisterSpace, K: ImageSink, O: ListenerObserver>(
    ctx: &mut HandlerContext<'_, R, K, O>,
) {
    if ctx.session.is_receiving_image() {
        ctx.log(
            LogLevel::Warn,
            format!(
                "Image restarted, discarding {} buffered bytes",
                ctx.session.image_buffer.len()
            ),
        );
    }
    let from = ctx.session.mode;
    ctx.assembler.start(ctx.session);
    if from != Mode::ReceivingImage {
        ctx.emit(ListenerEvent::ModeChanged {
            from,
            to: Mode::ReceivingImage,
        });
    }
}

fn handle_image_chunk<R: RegisterSpace, K: ImageSink, O: ListenerObserver>(
    chunk: &[u8],
    ctx: &mut HandlerContext<'_, R, K, O>,
) {
    match ctx.assembler.on_chunk(ctx.session, chunk) {
        AssemblyState::InProgress { received } => {
            ctx.emit(ListenerEvent::ImageProgress { received });
        }
        AssemblyState::Complete(image) => {
            ctx.emit(ListenerEvent::ModeChanged {
                from: Mode::ReceivingImage,
                to: Mode::Idle,
            });
            match ctx.sink.accept(&image) {
                Ok(info) => ctx.emit(ListenerEvent::ImageComplete {
                    len: image.len(),
                    info,
                }),
                Err(e) => ctx.emit(ListenerEvent::ImageFailed {
                    len: image.len(),
                    message: e.to_string(),
                }),
            }
        }
    }
}

fn handle_command<R: RegisterSpace, K: ImageSink, O: ListenerObserver>(
    datagram: &[u8],
    ctx: &mut HandlerContext<'_, R, K, O>,
) -> HandleResult {
    let command = match parse_with_limit(datagram, ctx.config.max_command_len) {
        Ok(c) => c,
        Err(e) => {
            ctx.drop_datagram(datagram.len(), e.to_string());
            return HandleResult::Continue;
        }
    };

    match command {
        Command::Brightness(v) => ctx.session.brightness = v,
        Command::Contrast(v) => ctx.session.contrast = v,
    }
    debug!(command = %command, "Command parsed");

    refresh_display(ctx);

    if let Some(path) = &ctx.config.params_path
        && let Err(e) = save_parameters(path, ctx.session.brightness, ctx.session.contrast)
    {
        warn!(path = %path, error = %e, "Failed to save parameters");
    }

    ctx.emit(ListenerEvent::CommandApplied {
        command,
        brightness: ctx.session.brightness,
        contrast: ctx.session.contrast,
    });
    HandleResult::Continue
}

/// Push the session's values to the sign LEDs and the HEX display.
///
/// Register failures are reported and otherwise ignored; the session keeps
/// the new values and the next command retries the write.
pub(crate) fn refresh_display<R: RegisterSpace, K: ImageSink, O: ListenerObserver>(
    ctx: &mut HandlerContext<'_, R, K, O>,
) {
    match ctx.driver.update_sign_indicators(ctx.session) {
        Ok(changed) => {
            for (indicator, on) in changed {
                ctx.emit(ListenerEvent::IndicatorChanged { indicator, on });
            }
        }
        Err(e) => ctx.log(LogLevel::Error, format!("Indicator update failed: {}", e)),
    }

    if let Err(e) = ctx
        .driver
        .render_digits(ctx.session.brightness, ctx.session.contrast)
    {
        ctx.log(LogLevel::Error, format!("Display update failed: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use crate::payload::MemoryImageSink;
    use crate::register::{MemoryRegisterSpace, RegisterLayout};

    struct Fixture {
        driver: DisplayDriver<MemoryRegisterSpace>,
        regs: MemoryRegisterSpace,
        sink: MemoryImageSink,
        session: Session,
        assembler: ImageAssembler,
        config: ListenerConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = ListenerConfig {
                registers: RegisterLayout {
                    span: 0x1000,
                    ..Default::default()
                },
                ..Default::default()
            };
            let regs = MemoryRegisterSpace::new(0x1000);
            Self {
                driver: DisplayDriver::new(regs.clone(), &config.registers).unwrap(),
                regs,
                sink: MemoryImageSink::new(),
                session: Session::new(),
                assembler: ImageAssembler::new(config.max_chunk_size),
                config,
            }
        }

        fn feed(&mut self, datagram: &[u8]) -> HandleResult {
            let mut ctx = HandlerContext {
                driver: &mut self.driver,
                sink: &mut self.sink,
                observer: &NullObserver,
                session: &mut self.session,
                assembler: &self.assembler,
                config: &self.config,
            };
            handle_datagram(datagram, &mut ctx)
        }
    }

    #[test]
    fn test_command_updates_session_and_display() {
        let mut fx = Fixture::new();
        assert_eq!(fx.feed(b"B87"), HandleResult::Continue);
        assert_eq!(fx.feed(b"C23"), HandleResult::Continue);
        assert_eq!((fx.session.brightness, fx.session.contrast), (87, 23));
        assert_eq!(fx.regs.peek(0x100, 4), vec![0x30, 0x12, 0x1E, 0x00]);
    }

    #[test]
    fn test_bad_command_leaves_state() {
        let mut fx = Fixture::new();
        fx.feed(b"B42");
        fx.regs.clear_writes();
        fx.feed(b"X5");
        fx.feed(b"B");
        fx.feed(b"Bnope");
        assert_eq!(fx.session.brightness, 42);
        assert!(fx.regs.get_writes().is_empty());
    }

    #[test]
    fn test_oversize_command_skipped() {
        let mut fx = Fixture::new();
        fx.feed(b"B0000000000000000001");
        assert_eq!(fx.session.brightness, 0);
        assert!(fx.regs.get_writes().is_empty());
    }

    #[test]
    fn test_shutdown_wins_in_any_mode() {
        let mut fx = Fixture::new();
        assert_eq!(fx.feed(b"END"), HandleResult::Shutdown);
        fx.feed(b"O%1");
        assert_eq!(fx.feed(b"END"), HandleResult::Shutdown);
    }

    #[test]
    fn test_commands_mid_image_are_image_bytes() {
        let mut fx = Fixture::new();
        fx.feed(b"B10");
        fx.feed(b"O%1");
        fx.feed(&[0xAB; 1024]);
        fx.feed(b"B99");
        assert_eq!(fx.session.brightness, 10);
        assert_eq!(fx.session.mode, Mode::Idle);
        // Not a valid image, so the sink saw nothing.
        assert!(fx.sink.images().is_empty());

        // Back to idle: commands apply again.
        fx.feed(b"B99");
        assert_eq!(fx.session.brightness, 99);
    }

    #[test]
    fn test_image_delivered_to_sink() {
        let mut fx = Fixture::new();
        let png = crate::payload::sink::tests::png_bytes(64, 64);
        fx.feed(b"O%1");
        let mut chunks = png.chunks(1024).peekable();
        while let Some(chunk) = chunks.next() {
            fx.feed(chunk);
            if chunks.peek().is_some() {
                assert!(fx.session.is_receiving_image());
            }
        }
        if png.len() % 1024 == 0 {
            fx.feed(b"");
        }
        assert_eq!(fx.sink.images(), vec![png]);
        assert_eq!(fx.session.mode, Mode::Idle);
    }
}
