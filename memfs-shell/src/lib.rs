//! A line-oriented command shell over an in-memory file system.
//!
//! Every line names one operation (`mkfs`, `create`, `open`, `read`, ...) and its
//! arguments. Results are printed to the shell's output, errors are reported and
//! the shell moves on to the next line unless the error leaves no usable file
//! system behind.
pub mod command;
pub mod console;

use std::io::{BufRead, Write};

use log::debug;
use memfs::{FsConfig, FsError, Volume};
use thiserror::Error;

use crate::command::{Command, ParseError, USAGE};

/// Printed in place of a handle when `open` fails.
pub const INVALID_HANDLE: i64 = -1;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {0} is not valid UTF-8")]
    Encoding(usize),
}

impl ShellError {
    /// Fatal errors end the session.
    pub fn is_fatal(&self) -> bool {
        match self {
            ShellError::Fs(err) => err.is_fatal(),
            ShellError::Parse(_) | ShellError::Encoding(_) => false,
            ShellError::Io(_) => true,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    volume: Volume,
    out: W,
    color: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(out: W) -> Self {
        Self {
            volume: Volume::new(),
            out,
            color: true,
        }
    }

    /// Enables or disables ANSI colors in listings.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs every line of `input` until it ends or an `exit` command is read.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned, anything else is printed and skipped.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<(), ShellError> {
        for (index, bytes) in input.split(b'\n').enumerate() {
            let result = match String::from_utf8(bytes?) {
                Ok(line) => self.execute_line(&line),
                Err(_) => Err(ShellError::Encoding(index + 1)),
            };
            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => writeln!(self.out, "error: {}", err)?,
            }
        }
        Ok(())
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!("Executing {:?}.", command);
        match command {
            Command::Mkfs(descriptors) => self.mkfs(descriptors)?,
            Command::Stat(path) => {
                let stat = self.volume.fs()?.stat(&path)?;
                writeln!(self.out, "{}", console::stat(&stat))?;
            }
            Command::Ls(path) => {
                let fs = self.volume.fs()?;
                let entries = match path {
                    Some(path) => fs.list_at(&path)?,
                    None => fs.list(),
                };
                writeln!(self.out, "{}", console::listing(&entries, self.color))?;
            }
            Command::Create(path) => {
                let descriptor = self.volume.fs_mut()?.create(&path)?;
                writeln!(self.out, "Created {} with descriptor {}", path, descriptor)?;
            }
            Command::Open(path) => match self.volume.fs_mut()?.open(&path) {
                Ok(handle) => writeln!(self.out, "File descriptor of file {} = {}", path, handle)?,
                Err(err) => {
                    writeln!(
                        self.out,
                        "File descriptor of file {} = {}",
                        path, INVALID_HANDLE
                    )?;
                    return Err(err.into());
                }
            },
            Command::Close(handle) => self.volume.fs_mut()?.close(handle)?,
            Command::Seek(handle, offset) => self.volume.fs_mut()?.seek(handle, offset)?,
            Command::Read(handle, len) => {
                let data = self.volume.fs()?.read(handle, len)?;
                writeln!(self.out, "{}", console::bytes(&data))?;
            }
            Command::Write(handle, len) => {
                let written = self.volume.fs_mut()?.write(handle, len)?;
                writeln!(self.out, "Wrote {} bytes", written)?;
            }
            Command::Link(path, new_path) => self.volume.fs_mut()?.link(&path, &new_path)?,
            Command::Unlink(path) => self.volume.fs_mut()?.unlink(&path)?,
            Command::Truncate(path, size) => self.volume.fs_mut()?.truncate(&path, size)?,
            Command::Mkdir(path) => self.volume.fs_mut()?.mkdir(&path)?,
            Command::Rmdir(path) => self.volume.fs_mut()?.rmdir(&path)?,
            Command::Cd(path) => self.volume.fs_mut()?.cd(&path)?,
            Command::Pwd => {
                let pwd = self.volume.fs()?.pwd();
                writeln!(self.out, "PWD: {}", pwd)?;
            }
            Command::Symlink(path, target) => self.volume.fs_mut()?.symlink(&path, &target)?,
            Command::Help => {
                for (usage, description) in USAGE {
                    writeln!(self.out, "  {:<26}{}", usage, description)?;
                }
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    pub fn mkfs(&mut self, descriptors: usize) -> Result<(), ShellError> {
        let config = FsConfig::builder().with_descriptors(descriptors).build();
        self.volume.mkfs(config)?;
        writeln!(
            self.out,
            "File system was initialized with {} file descriptors",
            descriptors
        )?;
        Ok(())
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (Result<(), ShellError>, String) {
        let mut shell = Shell::new(Vec::new()).with_color(false);
        let result = shell.run(script.as_bytes());
        (result, String::from_utf8(shell.into_inner()).unwrap())
    }

    #[test]
    fn commands_before_mkfs_are_fatal() {
        let (result, output) = run("ls\nmkfs 4\n");
        match result {
            Err(ShellError::Fs(FsError::NotInitialized)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn second_mkfs_is_fatal() {
        let (result, _) = run("mkfs 4\nmkfs 4\n");
        assert!(matches!(
            result,
            Err(ShellError::Fs(FsError::AlreadyInitialized))
        ));
    }

    #[test]
    fn recoverable_errors_are_printed() {
        let (result, output) = run("mkfs 4\ncd nope\nbogus\npwd\n");
        assert!(result.is_ok());
        assert_eq!(
            output,
            "File system was initialized with 4 file descriptors\n\
             error: no such file or directory: nope\n\
             error: unknown command: bogus\n\
             PWD: /\n"
        );
    }

    #[test]
    fn failed_open_prints_invalid_handle() {
        let (_, output) = run("mkfs 4\nopen missing\n");
        assert!(output.contains("File descriptor of file missing = -1\n"));
    }

    #[test]
    fn oversized_mkfs_is_reported() {
        let (result, output) = run("mkfs 18446744073709551615\nmkfs 2\npwd\n");
        assert!(result.is_ok());
        assert!(output.starts_with("error: invalid argument: 18446744073709551615 descriptors"));
        assert!(output.ends_with("File system was initialized with 2 file descriptors\nPWD: /\n"));
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut shell = Shell::new(Vec::new()).with_color(false);
        let result = shell.run(&b"mkfs 4\nmkdir \xff\npwd\r\n"[..]);
        assert!(result.is_ok());
        assert!(shell.volume().is_initialized());
        assert_eq!(
            String::from_utf8(shell.into_inner()).unwrap(),
            "File system was initialized with 4 file descriptors\n\
             error: line 2 is not valid UTF-8\n\
             PWD: /\n"
        );
    }

    #[test]
    fn exit_stops_reading() {
        let (result, output) = run("mkfs 4\nexit\npwd\n");
        assert!(result.is_ok());
        assert!(!output.contains("PWD"));
    }
}
