use std::fmt;
use std::str::FromStr;

/// One of the fixed BIRD benchmark databases served by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    CodebaseCommunity,
    Financial,
    Formula1,
    StudentClub,
    Superhero,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::CodebaseCommunity,
        Domain::Financial,
        Domain::Formula1,
        Domain::StudentClub,
        Domain::Superhero,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::CodebaseCommunity => "codebase_community",
            Domain::Financial => "financial",
            Domain::Formula1 => "formula_1",
            Domain::StudentClub => "student_club",
            Domain::Superhero => "superhero",
        }
    }

    /// File name of the domain's database inside the data directory.
    pub fn file_name(self) -> String {
        format!("{}.sqlite", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Domain {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| UnknownDomain(s.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown benchmark domain: {0}")]
pub struct UnknownDomain(String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn domain_names_round_trip() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().ok(), Some(domain));
        }
        assert!("thrombosis_prediction".parse::<Domain>().is_err());
    }

    #[test]
    fn file_names_carry_sqlite_extension() {
        assert_eq!(Domain::Formula1.file_name(), "formula_1.sqlite");
    }
}
