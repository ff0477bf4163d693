use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use hexlink_core::{
    DevMemRegisterSpace, FileImageSink, Listener, ListenerConfig, MemoryRegisterSpace, RegisterSpace,
    UdpDatagramSource,
};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "UDP brightness/contrast listener for the HEX display", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind to
    #[arg(long)]
    bind: Option<String>,

    /// UDP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Physical memory device (default /dev/mem)
    #[arg(long)]
    device: Option<String>,

    /// Where completed images are saved
    #[arg(long)]
    image_out: Option<String>,

    /// Write brightness/contrast to this file after every command
    #[arg(long)]
    params_out: Option<String>,

    /// Use an in-memory register window instead of the device
    #[arg(long)]
    in_memory: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    dump_config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Set by SIGINT/SIGTERM, checked by the listener between datagrams.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

fn install_signal_handlers() {
    // SAFETY: the handler only stores to an atomic.
    unsafe {
        libc::signal(libc::SIGINT, on_signal as *const () as libc::sighandler_t);
        libc::signal(libc::SIGTERM, on_signal as *const () as libc::sighandler_t);
    }
}

fn build_config(args: &Args) -> Result<ListenerConfig> {
    let mut config = match &args.config {
        Some(path) => ListenerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => ListenerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(device) = &args.device {
        config.device_path = device.clone();
    }
    if let Some(path) = &args.image_out {
        config.image_path = path.clone();
    }
    if args.params_out.is_some() {
        config.params_path = args.params_out.clone();
    }
    Ok(config)
}

fn serve<R: RegisterSpace>(config: ListenerConfig, regs: R) -> Result<()> {
    let source = UdpDatagramSource::bind(&config.bind_addr, config.port, config.poll_interval())?;
    let sink = FileImageSink::new(&config.image_path);

    let mut listener = Listener::new(config, regs, source, sink)?.with_interrupt(&INTERRUPTED);
    let reason = listener.run()?;
    info!(reason = %reason, "Shut down");
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    if let Some(path) = &args.dump_config {
        config.save_to_file(path)?;
        info!(path = %path, "Configuration written");
        return Ok(());
    }

    if args.in_memory {
        warn!("Using in-memory register window; the display will not change");
        let regs = MemoryRegisterSpace::new(config.registers.span);
        serve(config, regs)
    } else {
        let regs = DevMemRegisterSpace::open(&config.device_path, &config.registers)
            .context("Cannot map the peripheral registers")?;
        serve(config, regs)
    }
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    install_signal_handlers();
    info!("Starting hexlink...");

    if let Err(e) = run(args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
