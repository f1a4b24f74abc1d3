//! Memory address type.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Strongly typed memory address
///
/// This wrapper around `u64` is the identity of every node the graph builder
/// emits. Two values that live at the same address are the same node, no
/// matter how they were reached.
///
/// Addresses print the way a debugger prints pointers (`0x55555556aeb0`, no
/// zero padding), and that printed form is what ends up in the `id` field of
/// the graph payload.
///
/// ## Example
///
/// ```rust
/// use ferroscope_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x10;
/// assert_eq!(next_addr.value(), 0x1010);
/// assert_eq!(next_addr.to_string(), "0x1010");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use ferroscope_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Distance in bytes from `start` to `self`, or `None` if `start` lies above `self`.
    ///
    /// Used to size contiguous containers from their begin/end pointers.
    pub fn checked_distance_from(self, start: Address) -> Option<u64>
    {
        self.0.checked_sub(start.0)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:#x}", self.0)
    }
}

/// Error returned when a string is not a valid address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address literal: {0}")]
pub struct ParseAddressError(String);

impl FromStr for Address
{
    type Err = ParseAddressError;

    /// Parse `0x`-prefixed hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed.map(Address).map_err(|_| ParseAddressError(s.to_string()))
    }
}

impl Serialize for Address
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_display_is_unpadded_hex()
    {
        assert_eq!(Address::new(0x5555_5556_aeb0).to_string(), "0x55555556aeb0");
        assert_eq!(Address::ZERO.to_string(), "0x0");
    }

    #[test]
    fn test_parse_hex_and_decimal()
    {
        assert_eq!("0x1000".parse::<Address>().unwrap(), Address::new(0x1000));
        assert_eq!("4096".parse::<Address>().unwrap(), Address::new(0x1000));
        assert!("0xzz".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn test_distance()
    {
        let start = Address::new(0x5000);
        assert_eq!(Address::new(0x5014).checked_distance_from(start), Some(20));
        assert_eq!(Address::new(0x4000).checked_distance_from(start), None);
    }

    #[test]
    fn test_serde_round_trip_as_string()
    {
        let json = serde_json::to_string(&Address::new(0x10)).unwrap();
        assert_eq!(json, "\"0x10\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Address::new(0x10));
    }
}
