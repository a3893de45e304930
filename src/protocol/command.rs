use std::{fmt, str::Split};

use thiserror::Error;

pub(crate) const CMD_CD: &str = "cd";
pub(crate) const CMD_MKDIR: &str = "mkdir";
pub(crate) const CMD_RM: &str = "rm";
pub(crate) const CMD_UL: &str = "ul";
pub(crate) const CMD_DL: &str = "dl";
pub(crate) const CMD_EXIT: &str = "exit";

/// Why a command was refused. The reason travels back to the client
/// inside a failure [`Reply`](super::Reply); the session stays open.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("{0}: missing operand")]
    MissingOperand(&'static str),
    #[error("command line is not valid utf-8")]
    NotUtf8,
    #[error("not a directory: {0}")]
    NotDirectory(String),
    #[error("no such file or directory: {0}")]
    NoSuchPath(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Failure(String),
}

impl CommandError {
    /// Attach the user-supplied name to an I/O failure, collapsing the
    /// common kinds into their own variants.
    pub(crate) fn io(err: std::io::Error, name: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NoSuchPath(name.to_owned()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(name.to_owned()),
            _ => Self::Failure(format!("{name}: {err}")),
        }
    }
}

/// One parsed command line.
///
/// The wire form is the verb and, for all verbs but `exit`, one operand
/// separated by a single space. Operands cannot contain spaces; anything
/// after the second word is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cd(String),
    Mkdir(String),
    Rm(String),
    Ul(String),
    Dl(String),
    Exit,
}

fn operand(words: &mut Split<'_, char>, verb: &'static str) -> Result<String, CommandError> {
    match words.next() {
        Some(arg) => Ok(arg.to_owned()),
        None => Err(CommandError::MissingOperand(verb)),
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = CommandError;

    fn try_from(line: &[u8]) -> Result<Self, Self::Error> {
        let line = std::str::from_utf8(line).map_err(|_| CommandError::NotUtf8)?;
        let mut words = line.split(' ');

        // split() always yields at least one word, the empty one included
        let verb = words.next().unwrap_or_default();

        match verb {
            CMD_CD => Ok(Self::Cd(operand(&mut words, CMD_CD)?)),
            CMD_MKDIR => Ok(Self::Mkdir(operand(&mut words, CMD_MKDIR)?)),
            CMD_RM => Ok(Self::Rm(operand(&mut words, CMD_RM)?)),
            CMD_UL => Ok(Self::Ul(operand(&mut words, CMD_UL)?)),
            CMD_DL => Ok(Self::Dl(operand(&mut words, CMD_DL)?)),
            CMD_EXIT => Ok(Self::Exit),
            unknown => Err(CommandError::UnknownCommand(unknown.to_owned())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cd(path) => write!(f, "{CMD_CD} {path}"),
            Self::Mkdir(name) => write!(f, "{CMD_MKDIR} {name}"),
            Self::Rm(name) => write!(f, "{CMD_RM} {name}"),
            Self::Ul(name) => write!(f, "{CMD_UL} {name}"),
            Self::Dl(name) => write!(f, "{CMD_DL} {name}"),
            Self::Exit => f.write_str(CMD_EXIT),
        }
    }
}

#[cfg(test)]
mod test_command {
    use super::*;

    #[test]
    fn test_parse_each_verb() {
        assert_eq!(
            Command::try_from(b"cd docs".as_slice()),
            Ok(Command::Cd("docs".into()))
        );
        assert_eq!(
            Command::try_from(b"mkdir out".as_slice()),
            Ok(Command::Mkdir("out".into()))
        );
        assert_eq!(
            Command::try_from(b"rm old.txt".as_slice()),
            Ok(Command::Rm("old.txt".into()))
        );
        assert_eq!(
            Command::try_from(b"ul report.pdf".as_slice()),
            Ok(Command::Ul("report.pdf".into()))
        );
        assert_eq!(
            Command::try_from(b"dl notes.txt".as_slice()),
            Ok(Command::Dl("notes.txt".into()))
        );
        assert_eq!(Command::try_from(b"exit".as_slice()), Ok(Command::Exit));
    }

    #[test]
    fn test_extra_words_ignored() {
        assert_eq!(
            Command::try_from(b"cd docs and more".as_slice()),
            Ok(Command::Cd("docs".into()))
        );
    }

    // "cd  docs" carries an empty operand between the two spaces; it is
    // accepted here and refused later by the filesystem if meaningless.
    #[test]
    fn test_double_space_yields_empty_operand() {
        assert_eq!(
            Command::try_from(b"cd  docs".as_slice()),
            Ok(Command::Cd(String::new()))
        );
    }

    #[test]
    fn test_exit_takes_no_operand() {
        assert_eq!(Command::try_from(b"exit now".as_slice()), Ok(Command::Exit));
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            Command::try_from(b"chmod docs".as_slice()),
            Err(CommandError::UnknownCommand("chmod".into()))
        );
        assert_eq!(
            Command::try_from(b"".as_slice()),
            Err(CommandError::UnknownCommand(String::new()))
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            Command::try_from(b"mkdir".as_slice()),
            Err(CommandError::MissingOperand("mkdir"))
        );
        assert_eq!(
            Command::try_from(b"cd".as_slice()),
            Err(CommandError::MissingOperand("cd"))
        );
    }

    #[test]
    fn test_not_utf8() {
        assert_eq!(
            Command::try_from(b"cd \xff\xfe".as_slice()),
            Err(CommandError::NotUtf8)
        );
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(Command::Cd("docs".into()).to_string(), "cd docs");
        assert_eq!(Command::Exit.to_string(), "exit");
    }
}
