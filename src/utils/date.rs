use time::OffsetDateTime;
use time::macros::format_description;

/// UTC timestamp with millisecond precision, e.g. `2025-02-19T08:15:30.123Z`.
pub(crate) fn iso_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

pub(crate) fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

/// Fallback patient identifier for VCFs without a sample column.
pub(crate) fn generated_sample_id(at: OffsetDateTime) -> String {
    format!("SAMPLE_{}", unix_millis(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_utc_with_milliseconds() {
        let at = datetime!(2025-02-19 08:15:30.123_456 UTC);
        assert_eq!(iso_timestamp(at), "2025-02-19T08:15:30.123Z");
    }

    #[test]
    fn converts_offsets_to_utc() {
        let at = datetime!(2025-02-19 10:15:30 +02:00);
        assert_eq!(iso_timestamp(at), "2025-02-19T08:15:30.000Z");
    }

    #[test]
    fn sample_id_uses_unix_millis() {
        let at = datetime!(2024-01-01 00:00:00.5 UTC);
        assert_eq!(generated_sample_id(at), "SAMPLE_1704067200500");
    }
}
