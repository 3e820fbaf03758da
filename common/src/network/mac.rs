use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;

static OUI_DB: OnceLock<Oui> = OnceLock::new();

/// Retrieves or initializes the **Organizationally unique identifier** database.
///
/// Used for linking a vendor to a MAC address (LAN)
fn get_oui_db() -> &'static Oui {
    OUI_DB.get_or_init(|| Oui::default().expect("failed to load OUI database"))
}

/// Resolves device manufacturers from MAC addresses.
pub trait VendorLookup: Send + Sync {
    /// `None` when the OUI is unknown.
    fn vendor(&self, mac: MacAddr) -> Option<String>;
}

/// Lookup backed by the bundled IEEE OUI database.
pub struct OuiVendorLookup;

impl VendorLookup for OuiVendorLookup {
    fn vendor(&self, mac: MacAddr) -> Option<String> {
        get_vendor(mac)
    }
}

/// Lookup that never knows a vendor, used when enrichment is disabled.
pub struct NoVendorLookup;

impl VendorLookup for NoVendorLookup {
    fn vendor(&self, _mac: MacAddr) -> Option<String> {
        None
    }
}

/// Identify the vendor of a MAC address.
pub fn get_vendor(mac: MacAddr) -> Option<String> {
    let db = get_oui_db();
    let mac_str = mac.to_string();
    match db.lookup_by_mac(&mac_str) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
    }
}
