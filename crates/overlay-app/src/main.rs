mod cli;
mod presenter;
mod script;
mod stdio;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::task::JoinHandle;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use overlay_bridge::{
    run_dispatch_loop, EventBus, HostChannel, SharedTransport, StandaloneTransport,
};
use overlay_common::OverlayError;
use overlay_config::{toml_loader, OverlayConfig};
use overlay_ui::{OverlayContext, Overlays};

use cli::{Command, RunArgs};

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("\n--- overlay crashed ---");
        if let Some(location) = info.location() {
            eprintln!("at {}:{}", location.file(), location.line());
        }
        eprintln!("-----------------------\n");

        default_hook(info);
    }));
}

#[tokio::main]
async fn main() {
    install_panic_hook();

    let args = cli::parse();

    // Config is loaded before logging so its level can apply; the failure
    // is reported once the subscriber is up.
    let loaded = match &args.config {
        Some(path) => overlay_config::load_config_from(path),
        None => overlay_config::load_config(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (OverlayConfig::default(), Some(e)),
    };

    let log_directive = args
        .log_level
        .as_deref()
        .map(cli::log_directive)
        .unwrap_or_else(|| config.logging.level.directive().to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();

    tracing::info!("overlay v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let result = match args.command {
        Some(Command::PrintConfig) => {
            println!("{}", overlay_config::config_to_json(&config));
            Ok(())
        }
        Some(Command::InitConfig { force }) => init_config(args.config.as_deref(), force),
        Some(Command::Run(run_args)) => run(config, run_args).await,
        None => run(config, RunArgs::default()).await,
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_config(path: Option<&std::path::Path>, force: bool) -> Result<(), OverlayError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => toml_loader::default_config_path()?,
    };
    if path.exists() && !force {
        tracing::warn!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    toml_loader::create_default_config(&path)?;
    println!("{}", path.display());
    Ok(())
}

async fn run(config: OverlayConfig, args: RunArgs) -> Result<(), OverlayError> {
    let standalone = args.standalone || config.bridge.standalone;
    let script = match &args.script {
        Some(path) => Some(script::load_script(path)?),
        None => None,
    };

    let (link, mut host) = HostChannel::open(config.bridge.call_timeout());
    let inbound = link.receive()?;
    let transport: SharedTransport = if standalone {
        Arc::new(StandaloneTransport::new())
    } else {
        link.transport()
    };

    let bus = EventBus::new();
    let ctx = OverlayContext::new(bus.clone(), transport, config);
    let overlays = Overlays::mount(&ctx);
    tracing::info!(standalone, "host bridge ready");

    let mut tasks: Vec<JoinHandle<()>> = presenter::spawn_all(&overlays);
    tasks.push(tokio::spawn(async move {
        let dispatched = run_dispatch_loop(bus, inbound).await;
        tracing::info!(dispatched, "dispatch loop ended");
    }));

    if let Some(events) = script {
        let sender = host.sender();
        let delay = Duration::from_millis(args.script_delay_ms);
        tasks.push(tokio::spawn(async move {
            script::replay(events, delay, sender).await;
        }));
    }

    let sender = host.sender();
    let mut stdin_task = tokio::spawn(async move {
        stdio::pump_host_lines(BufReader::new(tokio::io::stdin()), &sender).await;
    });

    if !standalone {
        tasks.push(tokio::spawn(async move {
            match stdio::pump_calls(&mut host, tokio::io::stdout()).await {
                Ok(written) => tracing::info!(written, "host output ended"),
                Err(e) => tracing::warn!("Failed to write to host: {e}"),
            }
        }));
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        _ = &mut stdin_task, if !standalone => tracing::info!("Host closed the channel"),
    }

    overlays.unmount().await;
    stdin_task.abort();
    for task in tasks {
        task.abort();
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
