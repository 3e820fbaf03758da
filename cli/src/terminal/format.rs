use colored::*;
use lanscope_common::network::device::Device;
use lanscope_common::utils::format::format_mac;
use lanscope_core::topology::Role;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn device_details(device: &Device, no_vendor: bool) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), device.ip.to_string().color(colors::IPV4_ADDR)),
        (
            "MAC".to_string(),
            format_mac(&device.mac.to_string()).color(colors::MAC_ADDR),
        ),
    ];
    if !no_vendor {
        let vendor = match &device.vendor {
            Some(vendor) => vendor.as_str().color(colors::TEXT_DEFAULT),
            None => "Unknown".italic().bright_black(),
        };
        details.push(("Vendor".to_string(), vendor));
    }
    details
}

pub fn role_to_colored(role: Role) -> ColoredString {
    let color = match role {
        Role::Gateway => colors::ROLE_GATEWAY,
        Role::Local => colors::ROLE_LOCAL,
        Role::Device => colors::ROLE_DEVICE,
        Role::Vm => colors::ROLE_VM,
        Role::Unknown => colors::ROLE_UNKNOWN,
    };
    role.as_str().color(color).bold()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
