use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Lifecycle flag carried by every back-office document.
///
/// Records are never physically removed; deleting one moves it to `Inactive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(CoreError::InvalidInput(
                "status".to_string(),
                format!("unknown status '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_active() {
        assert_eq!(Status::default(), Status::Active);
        assert!(Status::default().is_active());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("inactive".parse::<Status>().unwrap(), Status::Inactive);
        assert_eq!("Active".parse::<Status>().unwrap(), Status::Active);
        assert!("archived".parse::<Status>().is_err());
    }

    #[test]
    fn serializes_as_variant_name() {
        let json = serde_json::to_string(&Status::Inactive).unwrap();
        assert_eq!(json, "\"Inactive\"");
    }
}
