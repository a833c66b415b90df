use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the media properties sharing the admin backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    SauceCaviar,
    TrapGlow,
    SauceWire,
    TrapFrequency,
}

impl Brand {
    pub const ALL: [Brand; 4] = [
        Brand::SauceCaviar,
        Brand::TrapGlow,
        Brand::SauceWire,
        Brand::TrapFrequency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Brand::SauceCaviar => "saucecaviar",
            Brand::TrapGlow => "trapglow",
            Brand::SauceWire => "saucewire",
            Brand::TrapFrequency => "trapfrequency",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Brand::SauceCaviar => "SauceCaviar",
            Brand::TrapGlow => "TrapGlow",
            Brand::SauceWire => "SauceWire",
            Brand::TrapFrequency => "TrapFrequency",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        Brand::ALL
            .into_iter()
            .find(|b| b.as_str() == normalized)
            .ok_or_else(|| format!("Unknown brand: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brand_variants() {
        assert_eq!("trapglow".parse::<Brand>().unwrap(), Brand::TrapGlow);
        assert_eq!("SauceCaviar".parse::<Brand>().unwrap(), Brand::SauceCaviar);
        assert_eq!("trap-frequency".parse::<Brand>().unwrap(), Brand::TrapFrequency);
        assert!("glowwire".parse::<Brand>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_slug() {
        let json = serde_json::to_string(&Brand::SauceWire).unwrap();
        assert_eq!(json, "\"saucewire\"");
        let brand: Brand = serde_json::from_str("\"trapfrequency\"").unwrap();
        assert_eq!(brand, Brand::TrapFrequency);
    }
}
