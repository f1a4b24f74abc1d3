//! Tests for the address and type-category types

use ferroscope_core::types::{Address, ParseAddressError, TypeCategory};

#[test]
fn test_address_display_is_unpadded_hex()
{
    assert_eq!(Address::new(0x1000).to_string(), "0x1000");
    assert_eq!(Address::ZERO.to_string(), "0x0");
}

#[test]
fn test_address_parse()
{
    assert_eq!("0x1000".parse::<Address>().unwrap(), Address::new(0x1000));
    assert_eq!("4096".parse::<Address>().unwrap(), Address::new(4096));
    assert!("0xzz".parse::<Address>().is_err());
    let err: ParseAddressError = "".parse::<Address>().unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_address_serializes_as_string()
{
    let json = serde_json::to_string(&Address::new(0x20)).unwrap();
    assert_eq!(json, r#""0x20""#);
    let back: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Address::new(0x20));
}

#[test]
fn test_address_arithmetic()
{
    let base = Address::new(0x1000);
    assert_eq!(base.checked_add(0x10), Some(Address::new(0x1010)));
    assert_eq!(Address::new(0x1010).checked_distance_from(base), Some(0x10));
    assert_eq!(base.checked_distance_from(Address::new(0x1010)), None);
    assert!(Address::ZERO.is_null());
}

#[test]
fn test_only_data_pointers_are_links()
{
    assert!(TypeCategory::Pointer.is_data_pointer());
    assert!(!TypeCategory::Function.is_data_pointer());
    assert!(!TypeCategory::Struct.is_data_pointer());
}
