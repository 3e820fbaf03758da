use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::info_span;

use crate::commands::{DiscoverArgs, ensure_root};
use crate::terminal::{colors, format, input::InputHandle, print, spinner::Spinner};
use crate::mprint;
use lanscope_common::config::{Config, DiscoveryConfig};
use lanscope_common::network::device::Device;
use lanscope_common::network::mac::NoVendorLookup;
use lanscope_common::network::target::TargetSpec;
use lanscope_common::signal::StopSignal;
use lanscope_common::{artifact, success, warn};
use lanscope_core::discovery::DiscoveryEngine;
use lanscope_core::resolver::SystemResolver;

pub async fn discover(args: DiscoverArgs, cfg: &Config) -> anyhow::Result<()> {
    if !ensure_root("Discovery") {
        return Ok(());
    }

    let discovery_cfg = DiscoveryConfig {
        timeout: Duration::from_secs(args.timeout),
        retries: args.retries,
        interface: args.interface.clone(),
    };

    let stop = StopSignal::new();
    spawn_ctrl_c(stop.clone());

    let mut engine = DiscoveryEngine::new(SystemResolver, discovery_cfg).with_stop_signal(stop.clone());
    if cfg.no_vendor {
        engine = engine.with_vendors(NoVendorLookup);
    }

    let span = info_span!("discovery", indicatif.pb_show = true);
    let guard = span.enter();
    let spinner = Spinner::start(span.clone(), "Probing for live hosts...");
    let mut input = InputHandle::new();
    input.start(stop.clone());

    let start_time: Instant = Instant::now();
    let result = match args.domain.as_deref() {
        Some(domain) => scan_domain(&engine, domain).await,
        None => match args.target.unwrap_or(TargetSpec::Lan) {
            TargetSpec::Lan => engine.scan_lan().await,
            TargetSpec::Explicit(targets) => engine.scan_all(&targets).await,
        },
    };

    input.stop();
    spinner.finish();
    drop(guard);

    let mut devices = result?;
    if stop.is_stopped() {
        warn!("Discovery interrupted, showing hosts found so far");
    }

    discovery_ends(&mut devices, start_time.elapsed(), cfg);

    if !devices.is_empty() {
        let path: PathBuf = args
            .output
            .unwrap_or_else(|| artifact::timestamped_path(&cfg.output_dir, "scan_results", "json"));
        artifact::save_devices(&path, &devices)
            .with_context(|| format!("saving scan results to {}", path.display()))?;
        success!("Results saved to {}", path.display());
    }
    print::rule();
    Ok(())
}

async fn scan_domain(
    engine: &DiscoveryEngine<SystemResolver>,
    domain: &str,
) -> anyhow::Result<Vec<Device>> {
    let scan = engine.scan_domain(domain).await?;
    if scan.addresses.is_empty() {
        warn!("Domain not resolved: {domain}");
    } else {
        let resolved: Vec<String> = scan.addresses.iter().map(Ipv4Addr::to_string).collect();
        print::field(domain, resolved.join(", ").color(colors::IPV4_ADDR));
    }
    Ok(scan.devices)
}

fn spawn_ctrl_c(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });
}

fn discovery_ends(devices: &mut [Device], total_time: Duration, cfg: &Config) {
    if devices.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    devices.sort_by_key(|device| device.ip);
    print_devices(devices, cfg);
    print_summary(devices.len(), total_time, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::nothing("no hosts answered", cfg.quiet);
}

fn print_devices(devices: &[Device], cfg: &Config) {
    for (idx, device) in devices.iter().enumerate() {
        match cfg.quiet {
            2 => print::status(device.ip.to_string()),
            _ => {
                print::item(idx, device.vendor_or_unknown());
                print::tree(&format::device_details(device, cfg.no_vendor));
                if idx + 1 != devices.len() {
                    mprint!();
                }
            }
        }
    }
}

fn print_summary(devices_len: usize, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{devices_len} active hosts").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Discovery complete: {active_hosts} identified in {total_time}");

    match cfg.quiet {
        0 => print::closing(&output),
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}
