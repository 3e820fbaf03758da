use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use colored::*;

use crate::commands::TopologyArgs;
use crate::terminal::{colors, format, print};
use crate::mprint;
use lanscope_common::config::Config;
use lanscope_common::{artifact, success};
use lanscope_core::resolver::SystemResolver;
use lanscope_core::topology::report::{self, NetworkStats};
use lanscope_core::topology::{Graph, Role, TopologyGraphBuilder};

pub fn topology(args: TopologyArgs, cfg: &Config) -> anyhow::Result<()> {
    let scan_path: PathBuf = match args.scan {
        Some(path) => path,
        None => artifact::latest_scan_results(&cfg.output_dir).with_context(|| {
            format!(
                "no scan results in {}, run `lanscope discover` first",
                cfg.output_dir.display()
            )
        })?,
    };

    let devices = artifact::load_devices(&scan_path)
        .with_context(|| format!("loading {}", scan_path.display()))?;
    let graph = TopologyGraphBuilder::from_resolver(&SystemResolver).build(&devices)?;

    print_graph(&graph, cfg);
    print_stats(&NetworkStats::from_devices(&devices), cfg);

    let dot_path = args
        .dot
        .unwrap_or_else(|| artifact::timestamped_path(&cfg.output_dir, "network_topology", "dot"));
    artifact::write_text_atomic(&dot_path, &graph.to_dot())
        .with_context(|| format!("writing {}", dot_path.display()))?;
    success!("Graph saved to {}", dot_path.display());

    let report_path = args
        .report
        .unwrap_or_else(|| artifact::timestamped_path(&cfg.output_dir, "network_report", "txt"));
    artifact::write_text_atomic(&report_path, &report::render_report(&devices, Local::now()))
        .with_context(|| format!("writing {}", report_path.display()))?;
    success!("Report saved to {}", report_path.display());

    print::rule();
    Ok(())
}

fn print_graph(graph: &Graph, cfg: &Config) {
    print::header("network topology", cfg.quiet);
    let gateway = graph.gateway();
    print::field("Gateway", gateway.id.to_string().color(colors::IPV4_ADDR));
    print::field("Nodes", graph.nodes().len().to_string());
    print::field("Links", graph.edges().len().to_string());

    if cfg.quiet > 1 {
        return;
    }
    mprint!();
    for (idx, node) in graph.nodes().iter().enumerate() {
        print::item(idx, &node.id.to_string());
        let mut details = vec![("Role".to_string(), format::role_to_colored(node.role))];
        if let Some(vendor) = &node.vendor {
            details.push(("Vendor".to_string(), vendor.as_str().color(colors::TEXT_DEFAULT)));
        }
        if node.role != Role::Gateway {
            details.push(("Link".to_string(), format!("-- {}", gateway.id).bright_black()));
        }
        print::tree(&details);
    }
}

fn print_stats(stats: &NetworkStats, cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }
    mprint!();
    print::header("vendor distribution", cfg.quiet);
    for (vendor, count) in &stats.vendor_distribution {
        print::field(vendor, count.to_string());
    }
    if let Some(range) = stats.ip_range {
        print::field("IP range", format!("{} - {}", range.first, range.last));
    }
}
