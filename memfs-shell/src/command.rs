use std::str::FromStr;

use memfs::HandleId;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// One line of input to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkfs(usize),
    Stat(String),
    Ls(Option<String>),
    Create(String),
    Open(String),
    Close(HandleId),
    Seek(HandleId, usize),
    Read(HandleId, usize),
    Write(HandleId, usize),
    Link(String, String),
    Unlink(String),
    Truncate(String, usize),
    Mkdir(String),
    Rmdir(String),
    Cd(String),
    Pwd,
    Symlink(String, String),
    Help,
    Exit,
}

pub const USAGE: &[(&str, &str)] = &[
    ("mkfs <descriptors>", "initialize the file system"),
    ("stat <path>", "describe a file"),
    ("ls [path]", "list a directory"),
    ("create <path>", "create a regular file"),
    ("open <path>", "open a regular file, prints the handle"),
    ("close <handle>", "close a handle"),
    ("seek <handle> <offset>", "move a handle's offset"),
    ("read <handle> <bytes>", "read at the handle's offset"),
    ("write <handle> <bytes>", "write the fill pattern at the handle's offset"),
    ("link <path> <new-path>", "add a hard link"),
    ("unlink <path>", "remove a file or symbolic link"),
    ("truncate <path> <bytes>", "resize a regular file"),
    ("mkdir <path>", "create a directory"),
    ("rmdir <path>", "remove a directory and its contents"),
    ("cd <path>", "change the current directory"),
    ("pwd", "print the current directory"),
    ("symlink <path> <target>", "create a symbolic link to target"),
    ("help", "show this message"),
    ("exit", "leave the shell"),
];

impl Command {
    /// Parses a line of input. Blank lines and lines starting with '#' hold no
    /// command.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match (name, args.as_slice()) {
            ("mkfs", [n]) => Command::Mkfs(number(n)?),
            ("mkfs", _) => return Err(ParseError::Usage("mkfs <descriptors>")),
            ("stat", [path]) => Command::Stat(path.to_string()),
            ("stat", _) => return Err(ParseError::Usage("stat <path>")),
            ("ls", []) => Command::Ls(None),
            ("ls", [path]) => Command::Ls(Some(path.to_string())),
            ("ls", _) => return Err(ParseError::Usage("ls [path]")),
            ("create", [path]) => Command::Create(path.to_string()),
            ("create", _) => return Err(ParseError::Usage("create <path>")),
            ("open", [path]) => Command::Open(path.to_string()),
            ("open", _) => return Err(ParseError::Usage("open <path>")),
            ("close", [h]) => Command::Close(number(h)?),
            ("close", _) => return Err(ParseError::Usage("close <handle>")),
            ("seek", [h, offset]) => Command::Seek(number(h)?, number(offset)?),
            ("seek", _) => return Err(ParseError::Usage("seek <handle> <offset>")),
            ("read", [h, n]) => Command::Read(number(h)?, number(n)?),
            ("read", _) => return Err(ParseError::Usage("read <handle> <bytes>")),
            ("write", [h, n]) => Command::Write(number(h)?, number(n)?),
            ("write", _) => return Err(ParseError::Usage("write <handle> <bytes>")),
            ("link", [path, new_path]) => Command::Link(path.to_string(), new_path.to_string()),
            ("link", _) => return Err(ParseError::Usage("link <path> <new-path>")),
            ("unlink", [path]) => Command::Unlink(path.to_string()),
            ("unlink", _) => return Err(ParseError::Usage("unlink <path>")),
            ("truncate", [path, n]) => Command::Truncate(path.to_string(), number(n)?),
            ("truncate", _) => return Err(ParseError::Usage("truncate <path> <bytes>")),
            ("mkdir", [path]) => Command::Mkdir(path.to_string()),
            ("mkdir", _) => return Err(ParseError::Usage("mkdir <path>")),
            ("rmdir", [path]) => Command::Rmdir(path.to_string()),
            ("rmdir", _) => return Err(ParseError::Usage("rmdir <path>")),
            ("cd", [path]) => Command::Cd(path.to_string()),
            ("cd", _) => return Err(ParseError::Usage("cd <path>")),
            ("pwd", []) => Command::Pwd,
            ("pwd", _) => return Err(ParseError::Usage("pwd")),
            ("symlink", [path, target]) => Command::Symlink(path.to_string(), target.to_string()),
            ("symlink", _) => return Err(ParseError::Usage("symlink <path> <target>")),
            ("help", _) => Command::Help,
            ("exit", _) | ("quit", _) => Command::Exit,
            (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, ParseError> {
    s.parse()
        .map_err(|_| ParseError::InvalidNumber(s.to_string()))
}
