use dns_parser::Packet;

pub const DNS_PORT: u16 = 53;
pub const MDNS_PORT: u16 = 5353;

/// Parses a UDP payload as DNS when either port is a DNS port.
///
/// Malformed payloads are not an error here, they simply yield `None`.
pub fn message(src_port: u16, dst_port: u16, payload: &[u8]) -> Option<Packet<'_>> {
    let on_dns_port = [src_port, dst_port]
        .iter()
        .any(|port| matches!(*port, DNS_PORT | MDNS_PORT));
    if !on_dns_port {
        return None;
    }

    Packet::parse(payload)
        .inspect_err(|e| tracing::trace!("UDP payload on {src_port}->{dst_port} is not DNS: {e}"))
        .ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
