//! # Sync Probe
//!
//! Development utility for poking a gateway deployment: health sweeps,
//! broadcast syncs and export transfers from the command line.
//!
//! ## Usage
//! ```bash
//! # Sweep module health (default command)
//! cargo run -p atlas-sync --bin sync_probe
//!
//! # Export invoices from the financial module as CSV
//! cargo run -p atlas-sync --bin sync_probe -- export -s financial -e invoices -f CSV
//!
//! # Broadcast-sync products from the manager module
//! cargo run -p atlas-sync --bin sync_probe -- sync -s manager -e products
//!
//! # Point at a non-default gateway
//! cargo run -p atlas-sync --bin sync_probe -- health --gateway http://gateway.local/api
//! ```
//!
//! The bearer token, when one is needed, comes from `ATLAS_BEARER_TOKEN`.

use std::env;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use atlas_core::{ExportFormat, ModuleId, TransferRequest};
use atlas_sync::{
    deliver, BroadcastSyncController, ExportController, GatewayConfig, HealthMonitor,
    SessionContext, TransferFailure, Transport,
};

fn print_help() {
    println!("Atlas Sync Probe");
    println!();
    println!("Usage: sync_probe [COMMAND] [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  health             Probe every module on the roster (default)");
    println!("  export             Run an export transfer and deliver the artifact");
    println!("  sync               Dispatch a broadcast sync");
    println!();
    println!("Options:");
    println!("  -s, --source <MODULE>   Source module (manager|financial|production|cloud)");
    println!("  -e, --entity <NAME>     Entity to transfer (e.g. invoices, products)");
    println!("  -f, --format <FMT>      Export format: CSV, EXCEL or JSON (default: CSV)");
    println!("  -o, --out <DIR>         Delivery directory for export artifacts");
    println!("      --gateway <URL>     Gateway base URL override");
    println!("  -h, --help              Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(false)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut command = String::from("health");
    let mut source: Option<String> = None;
    let mut entity: Option<String> = None;
    let mut format = String::from("CSV");
    let mut out_dir: Option<String> = None;
    let mut gateway: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "health" | "export" | "sync" => command = args[i].clone(),
            "--source" | "-s" => {
                if i + 1 < args.len() {
                    source = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--entity" | "-e" => {
                if i + 1 < args.len() {
                    entity = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--format" | "-f" => {
                if i + 1 < args.len() {
                    format = args[i + 1].clone();
                    i += 1;
                }
            }
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    out_dir = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--gateway" => {
                if i + 1 < args.len() {
                    gateway = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = GatewayConfig::load_or_default(None);
    if let Some(url) = gateway {
        config.gateway.base_url = url;
    }

    let mut session = SessionContext::new();
    if let Ok(token) = env::var("ATLAS_BEARER_TOKEN") {
        session = session.with_bearer_token(token);
    }

    println!("Atlas Sync Probe");
    println!("================");
    println!("Gateway: {}", config.gateway.base_url);
    println!();

    let transport = Transport::new(config.clone(), session)?;

    match command.as_str() {
        "export" => {
            let source: ModuleId = required(source, "--source")?.parse()?;
            let entity = required(entity, "--entity")?;
            let format: ExportFormat = format.parse()?;

            let controller = ExportController::new(transport);
            let request = TransferRequest::new(source, entity, format);

            println!("Exporting {} from {} as {}...", request.entity, source, format);
            match controller.submit(request, |pct| println!("  progress: {}%", pct)).await {
                Ok(artifact) => {
                    println!("✓ Export complete ({} bytes)", artifact.size_bytes());
                    let dir = out_dir.map(Into::into).unwrap_or_else(|| config.download_dir());
                    let path = deliver(&artifact, &dir).await?;
                    println!("✓ Delivered to {}", path.display());
                }
                Err(TransferFailure::Cancelled) => println!("⚠ Transfer cancelled"),
                Err(TransferFailure::Error(error)) => {
                    println!("✗ Export failed: {}", error.message);
                    println!("  category: {}  code: {}", error.category, error.code);
                    if let Some(details) = &error.details {
                        println!("  details: {}", details);
                    }
                    if controller.should_offer_retry(&error) {
                        println!("  This failure is retryable; run the probe again.");
                    }
                }
            }
        }
        "sync" => {
            let source: ModuleId = required(source, "--source")?.parse()?;
            let entity = required(entity, "--entity")?;

            let controller = BroadcastSyncController::new(transport);
            let request = controller.roster_request(source, entity);

            println!(
                "Broadcasting {} from {} to {} modules...",
                request.entity,
                source,
                request.target_modules.len()
            );
            match controller.submit(request).await {
                Ok(ack) => println!("✓ {}", ack.message),
                Err(error) => {
                    println!("✗ Sync failed: {}", error.message);
                    println!("  category: {}  code: {}", error.category, error.code);
                }
            }
        }
        _ => {
            let monitor = HealthMonitor::new(transport);
            let health = monitor.check_all().await;

            println!("System status: {:?}", health.status);
            println!();
            for module in &health.modules {
                let marker = if module.online { "✓" } else { "✗" };
                let version = module.version.as_deref().unwrap_or("-");
                println!(
                    "  {} {:<12} {:>5}ms  version {}",
                    marker, module.module.to_string(), module.response_time_ms, version
                );
            }
        }
    }

    Ok(())
}

fn required(value: Option<String>, flag: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("{} is required for this command (see --help)", flag))
}
