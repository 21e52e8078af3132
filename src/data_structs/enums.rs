use std::convert::Infallible;
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// Cytosine methylation context.
///
/// CG is the symmetric dinucleotide context; CHG and CHH are the
/// plant-specific asymmetric contexts.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "console", derive(clap::ValueEnum))]
pub enum Context {
    /// CG context.
    CG,
    /// CHG context.
    CHG,
    /// CHH context.
    CHH,
}

impl Context {
    /// True for the symmetric context, where the complementary-strand
    /// cytosine sits one base downstream.
    pub const fn is_symmetric(&self) -> bool {
        matches!(self, Context::CG)
    }
}

impl Display for Context {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Context::CG => write!(f, "CG"),
            Context::CHG => write!(f, "CHG"),
            Context::CHH => write!(f, "CHH"),
        }
    }
}

impl FromStr for Context {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CG" => Ok(Context::CG),
            "CHG" => Ok(Context::CHG),
            "CHH" => Ok(Context::CHH),
            other => {
                Err(anyhow::anyhow!(
                    "unsupported cytosine context '{}', expected CG, CHG or \
                     CHH",
                    other
                ))
            },
        }
    }
}

impl Serialize for Context {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// DNA strand of a cytosine call.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum Strand {
    /// Watson (forward) strand.
    Watson,
    /// Crick (reverse) strand.
    Crick,
}

impl FromStr for Strand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(Strand::Crick),
            _ => Ok(Strand::Watson),
        }
    }
}

impl From<Strand> for char {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Watson => '+',
            Strand::Crick => '-',
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        Ok(FromStr::from_str(&s).unwrap_or(Strand::Watson))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_roundtrip() {
        for context in [Context::CG, Context::CHG, Context::CHH] {
            let parsed: Context = context.to_string().parse().unwrap();
            assert_eq!(parsed, context);
        }
        assert!("CpG".parse::<Context>().is_err());
    }

    #[test]
    fn context_symmetry() {
        assert!(Context::CG.is_symmetric());
        assert!(!Context::CHG.is_symmetric());
        assert!(!Context::CHH.is_symmetric());
    }

    #[test]
    fn strand_display() {
        assert_eq!(Strand::Watson.to_string(), "+");
        assert_eq!(Strand::Crick.to_string(), "-");
    }
}
