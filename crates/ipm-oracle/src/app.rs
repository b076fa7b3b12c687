use core::fmt;

use crate::error::{OracleError, OracleResult};

/// Engine application addressed by a parameter path or command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum App {
    Prosper,
    Mbal,
    Gap,
    Pvt,
    Resolve,
    Reveal,
}

impl App {
    /// Extracts the application from the prefix of a path or command.
    ///
    /// The prefix runs up to the first '.', and must be at least two
    /// characters long.
    pub fn from_path(path: &str) -> OracleResult<Self> {
        let pos = match path.find('.') {
            Some(pos) if pos >= 2 => pos,
            _ => {
                return Err(OracleError::BadPath {
                    path: path.to_string(),
                });
            }
        };
        let name = &path[..pos];
        match name.to_ascii_lowercase().as_str() {
            "prosper" => Ok(Self::Prosper),
            "mbal" => Ok(Self::Mbal),
            "gap" => Ok(Self::Gap),
            "pvt" => Ok(Self::Pvt),
            "resolve" => Ok(Self::Resolve),
            "reveal" => Ok(Self::Reveal),
            _ => Err(OracleError::UnknownApp {
                name: name.to_string(),
                path: path.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prosper => "PROSPER",
            Self::Mbal => "MBAL",
            Self::Gap => "GAP",
            Self::Pvt => "PVT",
            Self::Resolve => "RESOLVE",
            Self::Reveal => "REVEAL",
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(App::from_path("PROSPER.ANL.SYS.CALC"), Ok(App::Prosper));
        assert_eq!(App::from_path("Prosper.ANL.VMT.Data[0].PIamend"), Ok(App::Prosper));
        assert_eq!(App::from_path("gap.SOLVENETWORK(0)"), Ok(App::Gap));
    }

    #[test]
    fn short_or_missing_prefix_is_rejected() {
        assert!(matches!(App::from_path("G.X"), Err(OracleError::BadPath { .. })));
        assert!(matches!(App::from_path(".X"), Err(OracleError::BadPath { .. })));
        assert!(matches!(App::from_path("NODOT"), Err(OracleError::BadPath { .. })));
    }

    #[test]
    fn unknown_app_is_rejected() {
        let err = App::from_path("EXCEL.Sheet1").unwrap_err();
        assert_eq!(
            err,
            OracleError::UnknownApp {
                name: "EXCEL".into(),
                path: "EXCEL.Sheet1".into()
            }
        );
    }
}
