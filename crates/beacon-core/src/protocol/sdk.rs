//! SDK identification

use serde::{Deserialize, Serialize};

/// Name reported by this SDK when no other name is configured
pub const SDK_NAME: &str = "beacon.rust";

/// A package bundled into the reporting SDK
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name, e.g. `cargo:beacon-client`
    pub name: String,
    /// Package version
    pub version: String,
}

/// Describes the SDK that produced a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkInfo {
    /// SDK name
    pub name: String,
    /// SDK version
    pub version: String,
    /// Packages that make up the SDK
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageInfo>,
}

impl SdkInfo {
    /// Create an SDK description without packages
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            packages: Vec::new(),
        }
    }

    /// Record a package, ignoring exact duplicates
    pub fn add_package(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let package = PackageInfo {
            name: name.into(),
            version: version.into(),
        };
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
    }

    /// Replace name and version, keeping recorded packages
    pub fn updated(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.name = name.into();
        self.version = version.into();
        self
    }
}

impl Default for SdkInfo {
    fn default() -> Self {
        let mut sdk = Self::new(SDK_NAME, env!("CARGO_PKG_VERSION"));
        sdk.add_package("cargo:beacon-core", env!("CARGO_PKG_VERSION"));
        sdk
    }
}
