/// Execution context detection
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where the application is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native or hybrid shell (Capacitor, mobile)
    Hybrid,
    #[default]
    Web,
}

impl Platform {
    pub fn is_hybrid(&self) -> bool {
        matches!(self, Platform::Hybrid)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" | "capacitor" | "native" => Ok(Platform::Hybrid),
            "web" => Ok(Platform::Web),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// Capability answering "native or web?"
pub trait PlatformDetector: Send + Sync {
    fn platform(&self) -> Platform;
}

impl PlatformDetector for Platform {
    fn platform(&self) -> Platform {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform() {
        assert_eq!("capacitor".parse::<Platform>().unwrap(), Platform::Hybrid);
        assert_eq!(" Web ".parse::<Platform>().unwrap(), Platform::Web);
        assert!("desktop".parse::<Platform>().is_err());
    }

    #[test]
    fn test_fixed_platform_detects_itself() {
        assert!(Platform::Hybrid.platform().is_hybrid());
        assert!(!Platform::Web.platform().is_hybrid());
    }
}
