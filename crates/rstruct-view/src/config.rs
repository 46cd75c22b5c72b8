/// Framing settings for sized records.
///
/// ```text
/// ┌────────────────────────┬─────────┬──────────────────────────────────────┐
/// │ Field                  │ Default │ Purpose                              │
/// ├────────────────────────┼─────────┼──────────────────────────────────────┤
/// │ size_format            │ "<i"    │ format of the length prefix          │
/// │ includes_size_in_total │ true    │ prefix value counts its own bytes    │
/// │ max_body_len           │ None    │ reject larger bodies before reading  │
/// └────────────────────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// With the defaults a record is a little-endian `i32` holding the
/// length of the whole record, header included, followed by the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordConfig {
    /// Format string of the size prefix. Must describe one integer scalar.
    pub size_format: String,

    /// Whether the prefix value counts its own bytes. When `true`, the
    /// body is `total - sizeof(size_format)` bytes long.
    pub includes_size_in_total: bool,

    /// Largest body accepted, checked before any body bytes are read.
    /// `None` accepts any length the size field can express.
    pub max_body_len: Option<usize>,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            size_format: "<i".to_string(),
            includes_size_in_total: true,
            max_body_len: None,
        }
    }
}

impl RecordConfig {
    pub fn new(size_format: impl Into<String>, includes_size_in_total: bool) -> Self {
        Self {
            size_format: size_format.into(),
            includes_size_in_total,
            max_body_len: None,
        }
    }

    #[must_use]
    pub fn with_max_body_len(mut self, limit: usize) -> Self {
        self.max_body_len = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RecordConfig::default();
        assert_eq!(config.size_format, "<i");
        assert!(config.includes_size_in_total);
        assert_eq!(config.max_body_len, None);
    }

    #[test]
    fn builder() {
        let config = RecordConfig::new(">H", false).with_max_body_len(512);
        assert_eq!(config.size_format, ">H");
        assert!(!config.includes_size_in_total);
        assert_eq!(config.max_body_len, Some(512));
    }
}
