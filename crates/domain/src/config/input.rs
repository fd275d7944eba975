use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::ConfigError;

/// How the input file is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Sniff the file header: libpcap magic → `Pcap`, anything else → `Text`
    #[default]
    Auto,
    /// Classic libpcap capture
    Pcap,
    /// One domain per line, `#` starts a comment
    Text,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Auto => "auto",
            InputFormat::Pcap => "pcap",
            InputFormat::Text => "text",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "pcap" | "cap" => Ok(InputFormat::Pcap),
            "text" | "txt" => Ok(InputFormat::Text),
            other => Err(ConfigError::invalid(
                "input.format",
                format!("unknown format '{}' (expected auto, pcap or text)", other),
            )),
        }
    }
}

/// Domain source configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Capture or domain list to analyze
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: InputFormat,
}
