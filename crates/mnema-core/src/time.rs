use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current wall-clock time as an RFC 3339 / ISO-8601 UTC string.
pub fn now_iso8601() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
