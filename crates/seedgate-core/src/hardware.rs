//! Hardware identifier (MAC address) validation

use crate::error::{Result, SeedError};

/// Separator characters permitted between MAC octets
const SEPARATORS: [char; 2] = [':', '-'];

/// Number of hex digits in a MAC address
const MAC_HEX_DIGITS: usize = 12;

/// Check a single hardware identifier.
///
/// After removing separators exactly 12 characters must remain, all of
/// them hex digits.
pub fn is_valid_hardware_identifier(identifier: &str) -> bool {
    let digits: Vec<char> = identifier
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .collect();

    digits.len() == MAC_HEX_DIGITS && digits.iter().all(char::is_ascii_hexdigit)
}

/// Validate every identifier, failing on the first malformed one
pub fn validate_hardware_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Result<()> {
    match identifiers
        .iter()
        .map(AsRef::as_ref)
        .find(|id| !is_valid_hardware_identifier(id))
    {
        Some(bad) => Err(SeedError::MalformedIdentifier(bad.to_string())),
        None => Ok(()),
    }
}
