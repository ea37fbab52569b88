//! Record codec: one measurement per line of comma-delimited text.
//!
//! Line layout:
//!
//! ```text
//! timestamp,download_mbps,upload_mbps,ping_ms[,server_id[,server_name]]
//! ```
//!
//! Encoding is pure and never fails. Decoding is tolerant: any line that
//! does not carry a timestamp and three numbers is rejected with a
//! [`DecodeError`] that readers log and skip.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Field separator on disk.
pub const DELIMITER: char = ',';

/// Server id substituted when a line carries none.
pub const UNKNOWN_SERVER_ID: &str = "unknown";

/// Timestamp layout written to disk. The fraction is omitted when zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepted on read, tried in order after [`TIMESTAMP_FORMAT`].
const LENIENT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single completed speed measurement, as handed over by whatever ran it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub server_id: String,
    pub server_name: String,
}

impl Measurement {
    /// Stamp the measurement, producing the record that will be logged.
    ///
    /// Server fields are sanitized here, so the record equals what a reader
    /// will decode from its line.
    pub fn into_record(self, timestamp: NaiveDateTime) -> Record {
        Record {
            timestamp,
            download_mbps: self.download_mbps,
            upload_mbps: self.upload_mbps,
            ping_ms: self.ping_ms,
            server_id: sanitize(&self.server_id),
            server_name: sanitize(&self.server_name),
        }
    }
}

/// One logged measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Local wall-clock time at logging. Not guaranteed monotonic.
    pub timestamp: NaiveDateTime,
    #[serde(rename = "download")]
    pub download_mbps: f64,
    #[serde(rename = "upload")]
    pub upload_mbps: f64,
    #[serde(rename = "ping")]
    pub ping_ms: f64,
    pub server_id: String,
    pub server_name: String,
}

impl Record {
    /// Encode as a single line, without the trailing newline.
    ///
    /// Delimiters and line breaks inside the server fields are replaced by
    /// spaces so the line splits back into the same fields.
    pub fn encode(&self) -> String {
        format!(
            "{}{d}{:?}{d}{:?}{d}{:?}{d}{}{d}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.download_mbps,
            self.upload_mbps,
            self.ping_ms,
            sanitize(&self.server_id),
            sanitize(&self.server_name),
            d = DELIMITER,
        )
    }

    /// Decode one line. A trailing `\n` or `\r\n` is ignored.
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let parts: Vec<&str> = line.split(DELIMITER).collect();
        if parts.len() < 4 {
            return Err(DecodeError::TooFewFields(parts.len()));
        }

        let timestamp = parse_timestamp(parts[0].trim())
            .ok_or_else(|| DecodeError::Timestamp(parts[0].to_string()))?;
        let download_mbps = parse_number("download", parts[1])?;
        let upload_mbps = parse_number("upload", parts[2])?;
        let ping_ms = parse_number("ping", parts[3])?;

        // Anything past the sixth field was split off a name that carried a
        // delimiter; it is dropped, not re-joined.
        let server_id = parts.get(4).map_or(UNKNOWN_SERVER_ID, |s| *s).to_string();
        let server_name = parts.get(5).map_or("", |s| *s).to_string();

        Ok(Self {
            timestamp,
            download_mbps,
            upload_mbps,
            ping_ms,
            server_id,
            server_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a logged timestamp.
///
/// Accepts the written layout, a space instead of `T`, minute precision, a
/// bare date (midnight) and RFC 3339 with an offset, which is converted to
/// local time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    for fmt in LENIENT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, DecodeError> {
    raw.trim().parse::<f64>().map_err(|_| DecodeError::Number {
        field,
        value: raw.to_string(),
    })
}

fn sanitize(field: &str) -> String {
    field.replace([DELIMITER, '\n', '\r'], " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    fn sample() -> Record {
        Record {
            timestamp: ts("2025-01-01T12:00:00"),
            download_mbps: 100.0,
            upload_mbps: 50.0,
            ping_ms: 10.0,
            server_id: "1234".to_string(),
            server_name: "Test Server (Oslo)".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_encode_layout() {
        assert_eq!(
            sample().encode(),
            "2025-01-01T12:00:00,100.0,50.0,10.0,1234,Test Server (Oslo)"
        );
    }

    #[test]
    fn test_encode_keeps_fraction() {
        let mut r = sample();
        r.timestamp = ts("2025-01-01T12:00:00.123456");
        r.download_mbps = 93.456789;
        assert!(
            r.encode()
                .starts_with("2025-01-01T12:00:00.123456,93.456789,")
        );
    }

    #[test]
    fn test_encode_sanitizes_server_fields() {
        let mut r = sample();
        r.server_id = "12,34".to_string();
        r.server_name = "Telia, Norway\nAS".to_string();
        let line = r.encode();
        assert_eq!(line.split(DELIMITER).count(), 6);
        assert!(!line.contains('\n'));
        assert!(line.ends_with("12 34,Telia  Norway AS"));
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    #[test]
    fn test_decode_roundtrip() {
        let r = sample();
        assert_eq!(Record::decode(&r.encode()).unwrap(), r);

        let mut odd = sample();
        odd.timestamp = ts("2024-02-29T23:59:59.000000001");
        odd.server_name = "  padded  ".to_string();
        odd.server_id = String::new();
        assert_eq!(Record::decode(&odd.encode()).unwrap(), odd);
    }

    #[test]
    fn test_decode_strips_line_terminator() {
        let r = Record::decode("2025-01-01T12:00:00,1.5,2.5,3.5,7,S\r\n").unwrap();
        assert_eq!(r.server_name, "S");
        assert_eq!(r.ping_ms, 3.5);
    }

    #[test]
    fn test_decode_four_fields_uses_sentinels() {
        let r = Record::decode("2025-01-01T12:00:00,100.0,50.0,10.0").unwrap();
        assert_eq!(r.server_id, UNKNOWN_SERVER_ID);
        assert_eq!(r.server_name, "");
    }

    #[test]
    fn test_decode_five_fields() {
        let r = Record::decode("2025-01-01T12:00:00,100.0,50.0,10.0,42").unwrap();
        assert_eq!(r.server_id, "42");
        assert_eq!(r.server_name, "");
    }

    #[test]
    fn test_decode_extra_fields_are_dropped() {
        let r = Record::decode("2025-01-01T12:00:00,1,2,3,9,Foo,Inc").unwrap();
        assert_eq!(r.server_name, "Foo");
    }

    #[test]
    fn test_decode_too_few_fields() {
        assert_eq!(
            Record::decode("garbage line"),
            Err(DecodeError::TooFewFields(1))
        );
        assert_eq!(
            Record::decode("2025-01-01T12:00:00,100.0"),
            Err(DecodeError::TooFewFields(2))
        );
        assert_eq!(Record::decode(""), Err(DecodeError::TooFewFields(1)));
    }

    #[test]
    fn test_decode_bad_number() {
        let err = Record::decode("2025-01-01T12:00:00,fast,50.0,10.0").unwrap_err();
        assert_eq!(
            err,
            DecodeError::Number {
                field: "download",
                value: "fast".to_string()
            }
        );
        assert!(Record::decode("2025-01-01T12:00:00,1.0,2.0,").is_err());
    }

    #[test]
    fn test_decode_bad_timestamp() {
        assert!(matches!(
            Record::decode("yesterday,1.0,2.0,3.0"),
            Err(DecodeError::Timestamp(_))
        ));
    }

    #[test]
    fn test_decode_trims_numeric_whitespace() {
        let r = Record::decode(" 2025-01-01T12:00:00 , 100.0 ,50.0, 10.0").unwrap();
        assert_eq!(r.download_mbps, 100.0);
        assert_eq!(r.ping_ms, 10.0);
    }

    // -----------------------------------------------------------------------
    // Timestamps
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_timestamp_variants() {
        let noon = ts("2025-01-01T12:00:00");
        assert_eq!(parse_timestamp("2025-01-01T12:00:00"), Some(noon));
        assert_eq!(parse_timestamp("2025-01-01 12:00:00"), Some(noon));
        assert_eq!(parse_timestamp("2025-01-01T12:00"), Some(noon));
        assert_eq!(
            parse_timestamp("2025-01-01"),
            Some(ts("2025-01-01T00:00:00"))
        );
        assert_eq!(
            parse_timestamp("2025-01-01T12:00:00.250"),
            Some(ts("2025-01-01T12:00:00.25"))
        );
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let parsed = parse_timestamp("2025-06-01T12:00:00+00:00").unwrap();
        let expected = DateTime::parse_from_rfc3339("2025-06-01T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2025-13-01T00:00:00"), None);
        assert_eq!(parse_timestamp("12:00:00"), None);
    }

    // -----------------------------------------------------------------------
    // Measurement
    // -----------------------------------------------------------------------

    #[test]
    fn test_measurement_into_record() {
        let m = Measurement {
            download_mbps: 1.0,
            upload_mbps: 2.0,
            ping_ms: 3.0,
            server_id: "N/A".to_string(),
            server_name: "Unknown ()".to_string(),
        };
        let r = m.into_record(ts("2025-01-01T00:00:00"));
        assert_eq!(r.server_id, "N/A");
        assert_eq!(r.upload_mbps, 2.0);
    }

    #[test]
    fn test_measurement_into_record_sanitizes() {
        let m = Measurement {
            download_mbps: 1.0,
            upload_mbps: 2.0,
            ping_ms: 3.0,
            server_id: "12,34".to_string(),
            server_name: "Acme, Inc\n(Oslo)".to_string(),
        };
        let r = m.into_record(ts("2025-01-01T00:00:00"));
        assert_eq!(r.server_id, "12 34");
        assert_eq!(r.server_name, "Acme  Inc (Oslo)");
        assert_eq!(Record::decode(&r.encode()).unwrap(), r);
    }

    #[test]
    fn test_record_json_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["timestamp"], "2025-01-01T12:00:00");
        assert_eq!(json["download"], 100.0);
        assert_eq!(json["upload"], 50.0);
        assert_eq!(json["ping"], 10.0);
        assert_eq!(json["server_id"], "1234");
    }
}
