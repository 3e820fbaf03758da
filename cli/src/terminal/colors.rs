use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 94, g: 196, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 196, b: 87 };
pub const SEPARATOR: Color = Color::TrueColor { r: 110, g: 110, b: 110 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 120, g: 220, b: 140 };
pub const IPV4_PREFIX: Color = Color::TrueColor { r: 80, g: 160, b: 100 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 200, g: 150, b: 255 };

pub const ROLE_GATEWAY: Color = Color::TrueColor { r: 215, g: 38, b: 61 };
pub const ROLE_LOCAL: Color = Color::TrueColor { r: 27, g: 154, b: 170 };
pub const ROLE_DEVICE: Color = Color::TrueColor { r: 68, g: 114, b: 202 };
pub const ROLE_VM: Color = Color::TrueColor { r: 242, g: 158, b: 76 };
pub const ROLE_UNKNOWN: Color = Color::TrueColor { r: 124, g: 124, b: 124 };
