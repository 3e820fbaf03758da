use anyhow::Context;

use crate::terminal::{network_fmt, print};
use crate::mprint;
use lanscope_common::config::Config;
use lanscope_common::network::interface;
use lanscope_core::capture::capture_interfaces;

pub fn interfaces(cfg: &Config) -> anyhow::Result<()> {
    let interfaces = capture_interfaces().context("listing capture devices")?;
    if interfaces.is_empty() {
        print::nothing("no capture devices", cfg.quiet);
        return Ok(());
    }

    let default_name = interface::default_route_network().map(|(intf, _)| intf.name);

    print::header("capture interfaces", cfg.quiet);
    for (idx, intf) in interfaces.iter().enumerate() {
        if cfg.quiet > 1 {
            print::status(&intf.name);
            continue;
        }
        network_fmt::print_interface(intf, idx, default_name.as_deref() == Some(intf.name.as_str()));
        if idx + 1 != interfaces.len() {
            mprint!();
        }
    }
    print::rule();
    Ok(())
}
