//! Target assembly dialects

use std::fmt;
use std::str::FromStr;
use log::warn;

/// Environment variable selecting the dialect
pub const VERSION_ENV_VAR: &str = "IRB_LLVM_VERSION";

/// LLVM assembly dialect to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialectVersion {
    /// LLVM 3.2: typed pointers only, `*` after vararg callee types
    #[default]
    V32,
    /// LLVM 3.8: explicit source element types on loads and getelementptr
    V38,
}

impl DialectVersion {
    /// Dialect named by `IRB_LLVM_VERSION`, 3.2 when unset or unknown
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(VERSION_ENV_VAR).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::parse::<DialectVersion>) {
            Some(Ok(version)) => version,
            Some(Err(err)) => {
                warn!("{VERSION_ENV_VAR}: {err}, using {}", DialectVersion::V32);
                DialectVersion::V32
            }
            None => DialectVersion::V32,
        }
    }

    /// Loads and getelementptr name the pointee type explicitly
    pub fn explicit_pointee_types(self) -> bool {
        self == DialectVersion::V38
    }

    /// Callee function types are printed as pointers (`i32 (i8*, ...)*`)
    pub fn callee_type_is_pointer(self) -> bool {
        self == DialectVersion::V32
    }
}

impl fmt::Display for DialectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectVersion::V32 => write!(f, "3.2"),
            DialectVersion::V38 => write!(f, "3.8"),
        }
    }
}

impl FromStr for DialectVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3.2" => Ok(DialectVersion::V32),
            "3.8" => Ok(DialectVersion::V38),
            other => Err(format!("unsupported LLVM version '{other}' (expected 3.2 or 3.8)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("3.2".parse::<DialectVersion>(), Ok(DialectVersion::V32));
        assert_eq!(" 3.8 ".parse::<DialectVersion>(), Ok(DialectVersion::V38));
        assert!("4.0".parse::<DialectVersion>().is_err());
    }

    #[test]
    fn test_env_value_fallback() {
        assert_eq!(DialectVersion::from_env_value(None), DialectVersion::V32);
        assert_eq!(DialectVersion::from_env_value(Some("3.8")), DialectVersion::V38);
        assert_eq!(DialectVersion::from_env_value(Some("nonsense")), DialectVersion::V32);
    }

    #[test]
    fn test_display_round_trip() {
        for version in [DialectVersion::V32, DialectVersion::V38] {
            assert_eq!(version.to_string().parse::<DialectVersion>(), Ok(version));
        }
    }
}
