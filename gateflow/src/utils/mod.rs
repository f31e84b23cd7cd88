//! Identifier and timestamp helpers.

mod ids;
pub mod timestamps;

pub use ids::{dedupe_key, generate_id};
pub use timestamps::{iso_timestamp, now_utc, parse_timestamp, Timestamp, TimestampError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_uuid() {
        let id = generate_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp(&now_utc());
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
