//! Timestamp conversion between the storage zone and the working zone
//!
//! Storage is always UTC. Reads convert into the configured working zone,
//! writes convert back. Conversion never changes the instant.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};

use crate::error::DomainError;

/// Converts timestamps between storage (UTC) and the working zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneConverter {
    storage: FixedOffset,
    working: FixedOffset,
}

impl ZoneConverter {
    /// Working zone given as an offset
    pub fn new(working: FixedOffset) -> Self {
        Self {
            storage: Utc.fix(),
            working,
        }
    }

    /// Working zone equal to storage
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Working zone parsed from `UTC`, `Z`, `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH`
    pub fn parse(working: &str) -> Result<Self, DomainError> {
        parse_offset(working).map(Self::new)
    }

    pub fn storage(&self) -> FixedOffset {
        self.storage
    }

    pub fn working(&self) -> FixedOffset {
        self.working
    }

    /// True when both zones share the same offset
    pub fn is_identity(&self) -> bool {
        self.storage == self.working
    }

    /// Storage → working zone. Null in, null out.
    pub fn read(&self, value: Option<DateTime<Utc>>) -> Option<DateTime<FixedOffset>> {
        value.map(|v| self.read_value(v))
    }

    /// Non-null variant of [`Self::read`]
    pub fn read_value(&self, value: DateTime<Utc>) -> DateTime<FixedOffset> {
        if self.is_identity() {
            return value.with_timezone(&self.storage);
        }
        value.with_timezone(&self.working)
    }

    /// Any zone → storage zone. Null in, null out.
    pub fn write<Tz: TimeZone>(&self, value: Option<DateTime<Tz>>) -> Option<DateTime<Utc>> {
        value.map(|v| v.with_timezone(&Utc))
    }
}

impl Default for ZoneConverter {
    fn default() -> Self {
        Self::utc()
    }
}

/// Parse a UTC offset designator
pub fn parse_offset(s: &str) -> Result<FixedOffset, DomainError> {
    let invalid = || DomainError::InvalidTimeZone(s.to_string());
    let trimmed = s.trim();

    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("utc")
        || trimmed.eq_ignore_ascii_case("z")
    {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes()[0] {
        b'+' => (1, &trimmed[1..]),
        b'-' => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let digits = match rest.len() {
        2 | 4 => rest.to_string(),
        5 if rest.as_bytes()[2] == b':' => format!("{}{}", &rest[0..2], &rest[3..5]),
        _ => return Err(invalid()),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours = digits[0..2].parse::<i32>().map_err(|_| invalid())?;
    let minutes = if digits.len() == 4 {
        digits[2..4].parse::<i32>().map_err(|_| invalid())?
    } else {
        0
    };

    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_offset("+09").unwrap().local_minus_utc(), 32400);
        assert!(parse_offset("Europe/London").is_err());
        assert!(parse_offset("+25:00").is_err());
        assert!(parse_offset("+1:2").is_err());
    }

    #[test]
    fn test_null_in_null_out() {
        let zones = ZoneConverter::parse("+03:00").unwrap();
        assert_eq!(zones.read(None), None);
        assert_eq!(zones.write::<FixedOffset>(None), None);
    }

    #[test]
    fn test_identity_is_noop() {
        let zones = ZoneConverter::utc();
        assert!(zones.is_identity());
        let now = Utc::now();
        let read = zones.read(Some(now)).unwrap();
        assert_eq!(read.offset().local_minus_utc(), 0);
        assert_eq!(read, now);
    }

    #[test]
    fn test_read_uses_working_zone() {
        let zones = ZoneConverter::parse("+02:00").unwrap();
        let stored = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let read = zones.read_value(stored);
        assert_eq!(read.offset().local_minus_utc(), 7200);
        assert_eq!(read.to_rfc3339(), "2024-01-01T14:00:00+02:00");
    }

    #[test]
    fn test_round_trip_preserves_instant() {
        let zone_a = FixedOffset::west_opt(5 * 3600).unwrap();
        let written_at = zone_a.with_ymd_and_hms(2024, 6, 30, 23, 15, 0).unwrap();

        for display in ["UTC", "+02:00", "-08:00", "+05:30"] {
            let zones = ZoneConverter::parse(display).unwrap();
            let stored = zones.write(Some(written_at));
            let read = zones.read(stored).unwrap();
            assert_eq!(read, written_at, "display zone {display}");
        }
    }
}
