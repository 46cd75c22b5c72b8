/// Byte-order marker carried at the front of a format string.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Marker │ Variant │ Wire order                       │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ @      │ Native  │ host order (cfg target_endian)   │
/// │ <      │ Little  │ little-endian                    │
/// │ >      │ Big     │ big-endian                       │
/// │ !      │ Network │ big-endian                       │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// Sizes never depend on the marker: every scalar uses its standard
/// packed size, with no alignment padding, in all four modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Native,
    Little,
    Big,
    Network,
}

impl ByteOrder {
    /// Map a marker character to a byte order, if it is one.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::Native),
            '<' => Some(Self::Little),
            '>' => Some(Self::Big),
            '!' => Some(Self::Network),
            _ => None,
        }
    }

    /// The marker character for this byte order.
    pub fn marker(self) -> char {
        match self {
            Self::Native => '@',
            Self::Little => '<',
            Self::Big => '>',
            Self::Network => '!',
        }
    }

    /// Whether bytes in this order are laid out little-endian on this host.
    pub fn is_little(self) -> bool {
        match self {
            Self::Little => true,
            Self::Big | Self::Network => false,
            Self::Native => cfg!(target_endian = "little"),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Native => "native",
            Self::Little => "little",
            Self::Big => "big",
            Self::Network => "network",
        };
        f.write_str(name)
    }
}
