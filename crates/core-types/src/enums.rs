use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A test stage in the back-end flow.
///
/// Variants are declared in downstream order, so the derived `Ord` is the
/// flow order: a unit tested at `Pgsrt` goes on to `Burn`, `Hsrt`, then `Cfin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Step {
    Pgsrt,
    Burn,
    Hsrt,
    Cfin,
}

impl Step {
    /// All steps in downstream order.
    pub const ALL: [Step; 4] = [Step::Pgsrt, Step::Burn, Step::Hsrt, Step::Cfin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Pgsrt => "PGSRT",
            Step::Burn => "BURN",
            Step::Hsrt => "HSRT",
            Step::Cfin => "CFIN",
        }
    }

    /// Steps strictly after this one in the flow.
    pub fn downstream(&self) -> &'static [Step] {
        let position = Step::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or(Step::ALL.len() - 1);
        &Step::ALL[position + 1..]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PGSRT" => Ok(Step::Pgsrt),
            "BURN" => Ok(Step::Burn),
            "HSRT" => Ok(Step::Hsrt),
            "CFIN" => Ok(Step::Cfin),
            _ => Err(CoreError::UnknownStep(s.to_string())),
        }
    }
}

/// The data-directory configuration a table was pulled from.
///
/// `Combo` means the source data is not broken out by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    X4,
    X8,
    X16,
    Combo,
}

impl Configuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::X4 => "x4",
            Configuration::X8 => "x8",
            Configuration::X16 => "x16",
            Configuration::Combo => "combo",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x4" => Ok(Configuration::X4),
            "x8" => Ok(Configuration::X8),
            "x16" => Ok(Configuration::X16),
            "combo" => Ok(Configuration::Combo),
            _ => Err(CoreError::UnknownConfiguration(s.to_string())),
        }
    }
}

/// Package type: single or dual die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Package {
    Sdp,
    Ddp,
}

impl Package {
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Sdp => "SDP",
            Package::Ddp => "DDP",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SDP" => Ok(Package::Sdp),
            "DDP" => Ok(Package::Ddp),
            _ => Err(CoreError::UnknownPackage(s.to_string())),
        }
    }
}

/// Which of the two reported weeks a figure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Week {
    ThisWeek,
    LastWeek,
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::ThisWeek => f.write_str("this week"),
            Week::LastWeek => f.write_str("last week"),
        }
    }
}

/// Which rows the cross-step composite ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeSource {
    #[default]
    Groups,
    Registers,
}

impl fmt::Display for CompositeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeSource::Groups => f.write_str("groups"),
            CompositeSource::Registers => f.write_str("registers"),
        }
    }
}

impl FromStr for CompositeSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groups" => Ok(CompositeSource::Groups),
            "registers" => Ok(CompositeSource::Registers),
            _ => Err(CoreError::InvalidInput(
                "composite source".to_string(),
                format!("'{s}' is neither 'groups' nor 'registers'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_downstream() {
        assert!(Step::Pgsrt < Step::Burn);
        assert!(Step::Hsrt < Step::Cfin);
        assert_eq!(Step::Pgsrt.downstream(), &[Step::Burn, Step::Hsrt, Step::Cfin]);
        assert_eq!(Step::Hsrt.downstream(), &[Step::Cfin]);
        assert!(Step::Cfin.downstream().is_empty());
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("cfin".parse::<Step>().unwrap(), Step::Cfin);
        assert_eq!("X16".parse::<Configuration>().unwrap(), Configuration::X16);
        assert_eq!("ddp".parse::<Package>().unwrap(), Package::Ddp);
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(
            "FT".parse::<Step>(),
            Err(CoreError::UnknownStep("FT".to_string()))
        );
        assert!("x32".parse::<Configuration>().is_err());
        assert!("QDP".parse::<Package>().is_err());
    }
}
