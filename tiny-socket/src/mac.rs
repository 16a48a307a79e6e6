//! Hardware (MAC) address parsing.
//!
//! Only the canonical colon-separated form is accepted: six groups of exactly
//! two hexadecimal digits, e.g. `aa:bb:cc:dd:ee:ff`.  Case is ignored on input;
//! [`MacAddress`] always displays in lower case.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of octets in a MAC address.
pub const MAC_LEN: usize = 6;

const GROUP_SEPARATOR: char = ':';

/// A validated 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

/// Reasons a string is not a canonical MAC address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacAddressError {
    #[error("invalid mac address: expected 6 colon-separated groups, found {0}")]
    GroupCount(usize),
    #[error("invalid mac address: group {index} ({group:?}) is not two hex digits")]
    InvalidGroup { index: usize, group: String },
}

impl FromStr for MacAddress {
    type Err = MacAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.split(GROUP_SEPARATOR).collect();
        if groups.len() != MAC_LEN {
            return Err(MacAddressError::GroupCount(groups.len()));
        }

        let mut octets = [0u8; MAC_LEN];
        for (index, group) in groups.iter().enumerate() {
            // from_str_radix alone would also take "+f" or a single digit.
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(MacAddressError::InvalidGroup {
                    index,
                    group: group.to_string(),
                });
            }
            octets[index] = u8::from_str_radix(group, 16).map_err(|_| {
                MacAddressError::InvalidGroup {
                    index,
                    group: group.to_string(),
                }
            })?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
