use std::net::IpAddr;

use colored::*;
use lanscope_core::capture::CaptureInterface;

use crate::terminal::{colors, format::Detail, print};

pub fn address_details(addresses: &[IpAddr]) -> Vec<Detail> {
    addresses
        .iter()
        .map(|addr| match addr {
            IpAddr::V4(v4) => ("IPv4".to_string(), v4.to_string().color(colors::IPV4_ADDR)),
            IpAddr::V6(v6) => ("IPv6".to_string(), v6.to_string().color(colors::IPV4_PREFIX)),
        })
        .collect()
}

pub fn print_interface(interface: &CaptureInterface, idx: usize, is_default: bool) {
    let name = if is_default {
        format!("{} {}", interface.name, "(default route)".italic().bright_black())
    } else {
        interface.name.clone()
    };
    print::item(idx, &name);

    let mut details: Vec<Detail> = Vec::new();
    if let Some(description) = &interface.description {
        details.push(("Desc".to_string(), description.as_str().color(colors::TEXT_DEFAULT)));
    }
    details.extend(address_details(&interface.addresses));
    if details.is_empty() {
        details.push(("Addr".to_string(), "none".italic().bright_black()));
    }
    print::tree(&details);
}
