const MARKERS: [&str; 3] = ["GET", "POST", "HTTP"];

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

/// First line of a TCP payload that looks like HTTP, if any.
///
/// The payload is decoded as UTF-8 with invalid bytes dropped, and counts as
/// HTTP when it mentions `GET`, `POST` or `HTTP` anywhere.
pub fn request_line(payload: &[u8]) -> Option<String> {
    let text: String = String::from_utf8_lossy(payload)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect();

    if !MARKERS.iter().any(|marker| text.contains(marker)) {
        return None;
    }

    text.split(['\r', '\n']).next().map(str::to_owned)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
