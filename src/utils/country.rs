//! Best-effort client country from edge geolocation headers.

use axum::http::HeaderMap;

/// Headers consulted when none are configured.
pub const DEFAULT_COUNTRY_HEADERS: &[&str] = &["cf-ipcountry", "x-vercel-ip-country", "x-country-code"];

/// Returns the uppercased ISO country code from the first configured header that carries one.
///
/// Placeholder codes used by CDNs for "unknown" (`XX`) and Tor exits (`T1`) are skipped, as is
/// anything that is not two ASCII letters. `None` means the country is unknown.
pub fn country_from_headers<S: AsRef<str>>(headers: &HeaderMap, names: &[S]) -> Option<String> {
    names.iter().find_map(|name| {
        let value = headers.get(name.as_ref())?.to_str().ok()?.trim();
        if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let code = value.to_ascii_uppercase();
        match code.as_str() {
            "XX" | "T1" => None,
            _ => Some(code),
        }
    })
}
