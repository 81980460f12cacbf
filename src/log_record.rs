use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const FIELD_DELIMITER: char = ',';
const FIELD_COUNT: usize = 5;
const MINUTE_BUCKET_LEN: usize = 16;

/// One access-log entry: `ip,timestamp,url,status,user_agent`.
///
/// The timestamp is kept as the raw string (`YYYY-MM-DD HH:MM:SS`); the
/// parser only guarantees it is long enough for [`LogRecord::minute_bucket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub ip: String,
    pub timestamp: String,
    pub url: String,
    pub status: u16,
    pub user_agent: String,
}

impl LogRecord {
    /// Parse one comma-delimited line. No quoting or escaping: the line
    /// must split into exactly five fields.
    pub fn parse(line: &str) -> Result<LogRecord, ParseError> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount(fields.len()));
        }

        let status: u16 = fields[3]
            .parse()
            .map_err(|_| ParseError::InvalidStatus(fields[3].to_owned()))?;
        if !(100..=599).contains(&status) {
            return Err(ParseError::InvalidStatus(fields[3].to_owned()));
        }

        let timestamp = fields[1];
        if timestamp.len() < MINUTE_BUCKET_LEN || !timestamp.is_char_boundary(MINUTE_BUCKET_LEN) {
            return Err(ParseError::ShortTimestamp(timestamp.to_owned()));
        }

        Ok(LogRecord {
            ip: fields[0].to_owned(),
            timestamp: timestamp.to_owned(),
            url: fields[2].to_owned(),
            status,
            user_agent: fields[4].to_owned(),
        })
    }

    /// Re-serialize with the same delimiter [`LogRecord::parse`] splits on.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.ip, self.timestamp, self.url, self.status, self.user_agent
        )
    }

    /// Minute-granularity bucket: the `YYYY-MM-DD HH:MM` prefix.
    pub fn minute_bucket(&self) -> &str {
        &self.timestamp[..MINUTE_BUCKET_LEN]
    }

    /// Mask the last segment of the client address: `1.2.3.4` -> `1.2.3.X`.
    pub fn anonymize(&mut self) {
        let mut parts: Vec<&str> = self.ip.split('.').collect();
        if let Some(_) = parts.pop() {
            parts.push("X");
        }
        self.ip = parts.join(".");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_valid_line() {
        let record = LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,200,UA1").unwrap();
        assert_eq!(
            record,
            LogRecord {
                ip: "1.1.1.1".to_owned(),
                timestamp: "2024-02-25 12:34:56".to_owned(),
                url: "/home".to_owned(),
                status: 200,
                user_agent: "UA1".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,200"),
            Err(ParseError::FieldCount(4))
        );
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,200,UA1,extra"),
            Err(ParseError::FieldCount(6))
        );
        assert_eq!(LogRecord::parse(""), Err(ParseError::FieldCount(1)));
    }

    #[test]
    fn rejects_invalid_status() {
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,abc,UA1"),
            Err(ParseError::InvalidStatus("abc".to_owned()))
        );
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,99,UA1"),
            Err(ParseError::InvalidStatus("99".to_owned()))
        );
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,600,UA1"),
            Err(ParseError::InvalidStatus("600".to_owned()))
        );
    }

    #[test]
    fn accepts_status_range_bounds() {
        assert!(LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,100,UA1").is_ok());
        assert!(LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,599,UA1").is_ok());
    }

    #[test]
    fn rejects_short_timestamp() {
        assert_eq!(
            LogRecord::parse("1.1.1.1,2024-02-25,/home,200,UA1"),
            Err(ParseError::ShortTimestamp("2024-02-25".to_owned()))
        );
    }

    #[test]
    fn round_trips_through_the_delimiter() {
        let line = "1.1.1.2,2024-02-25 12:35:10,/home,500,UA2";
        assert_eq!(LogRecord::parse(line).unwrap().to_line(), line);
    }

    #[test]
    fn minute_bucket_truncates_seconds() {
        let record = LogRecord::parse("1.1.1.1,2024-02-25 12:34:56,/home,200,UA1").unwrap();
        assert_eq!(record.minute_bucket(), "2024-02-25 12:34");
    }

    #[test]
    fn anonymize_masks_the_last_segment() {
        let mut record = LogRecord::parse("1.2.3.4,2024-02-25 12:34:56,/home,200,UA1").unwrap();
        record.anonymize();
        assert_eq!(record.ip, "1.2.3.X");
    }
}
