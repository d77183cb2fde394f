//! Various small helper functions

use std::num::ParseIntError;
use std::time::Duration;

/// Parses a Duration from a string containing seconds.
/// Useful for command line parsing
pub fn parse_seconds(src: &str) -> Result<Duration, ParseIntError> {
    let seconds = src.parse::<u64>()?;
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn parse_seconds_from_string() {
        assert_eq!(parse_seconds("42").unwrap(), Duration::from_secs(42));
    }

    #[test]
    fn reject_invalid_seconds() {
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("ten").is_err());
    }
}
