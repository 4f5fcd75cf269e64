//! IPv4 dotted-quad validation
//!
//! Accepts exactly four decimal octets in 0..=255 separated by dots.
//! Octets with a leading zero ("01"), surrounding whitespace, IPv6
//! literals and hostnames are rejected.

use std::net::Ipv4Addr;

/// Parse a strict dotted-quad
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');

    for octet in octets.iter_mut() {
        *octet = parse_octet(parts.next()?)?;
    }

    if parts.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

pub fn is_valid_ipv4(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

fn parse_octet(part: &str) -> Option<u8> {
    let bytes = part.as_bytes();
    if bytes.is_empty() || bytes.len() > 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    part.parse::<u8>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_dotted_quads() {
        for ip in ["192.168.1.1", "0.0.0.0", "255.255.255.255", "8.8.8.8", "10.0.100.9"] {
            assert!(is_valid_ipv4(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn test_rejects_out_of_range_octets() {
        assert!(!is_valid_ipv4("256.1.1.1"));
        assert!(!is_valid_ipv4("1.2.3.999"));
        assert!(!is_valid_ipv4("1.2.3.1000"));
    }

    #[test]
    fn test_rejects_malformed() {
        for ip in [
            "",
            "::1",
            "2001:db8::1",
            "example.com",
            "1.2.3",
            "1.2.3.4.5",
            "1..2.3",
            "1.2.3.",
            ".1.2.3",
            " 1.2.3.4",
            "1.2.3.4 ",
            "+1.2.3.4",
            "1.2.3.4/24",
        ] {
            assert!(!is_valid_ipv4(ip), "{ip:?} should be invalid");
        }
    }

    #[test]
    fn test_rejects_leading_zeros() {
        assert!(!is_valid_ipv4("01.2.3.4"));
        assert!(!is_valid_ipv4("1.2.3.00"));
        assert!(is_valid_ipv4("1.2.3.0"));
    }

    #[test]
    fn test_parse_returns_address() {
        assert_eq!(parse_ipv4("9.9.9.9"), Some(Ipv4Addr::new(9, 9, 9, 9)));
    }
}
