use std::fmt;

/// 128-bit identifier as carried by the binary object format:
/// most significant half first, least significant half second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    most: i64,
    least: i64,
}

impl Guid {
    pub fn new(most: i64, least: i64) -> Self {
        Self { most, least }
    }

    pub fn most_significant_bits(&self) -> i64 {
        self.most
    }

    pub fn least_significant_bits(&self) -> i64 {
        self.least
    }

    /// 16 bytes, big-endian
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.most.to_be_bytes());
        out[8..].copy_from_slice(&self.least.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut most = [0u8; 8];
        let mut least = [0u8; 8];
        most.copy_from_slice(&bytes[..8]);
        least.copy_from_slice(&bytes[8..]);
        Self {
            most: i64::from_be_bytes(most),
            least: i64::from_be_bytes(least),
        }
    }

    /// Parse the canonical `8-4-4-4-12` hex form. Braces are accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or(text);
        let groups: Vec<&str> = text.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups.iter().zip(lengths).any(|(g, len)| g.len() != len)
        {
            return None;
        }
        let hex: String = groups.concat();
        let value = u128::from_str_radix(&hex, 16).ok()?;
        Some(Self {
            most: (value >> 64) as u64 as i64,
            least: value as u64 as i64,
        })
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let most = self.most as u64;
        let least = self.least as u64;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            most >> 32,
            (most >> 16) & 0xFFFF,
            most & 0xFFFF,
            least >> 48,
            least & 0xFFFF_FFFF_FFFF
        )
    }
}

#[cfg(feature = "with-uuid")]
impl From<uuid::Uuid> for Guid {
    fn from(value: uuid::Uuid) -> Self {
        let bits = value.as_u128();
        Self {
            most: (bits >> 64) as u64 as i64,
            least: bits as u64 as i64,
        }
    }
}

#[cfg(feature = "with-uuid")]
impl From<Guid> for uuid::Uuid {
    fn from(value: Guid) -> Self {
        let bits = (u128::from(value.most as u64) << 64) | u128::from(value.least as u64);
        uuid::Uuid::from_u128(bits)
    }
}
