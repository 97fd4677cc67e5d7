//! File selection: the interactive prompt loop and the positional-path walk
//!
//! Both check each path before handing it to the analysis callback, number
//! the files they accept, and keep going after a failed file. Status text
//! goes to the supplied writer so reports on stdout stay clean.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::constants::EXIT_SENTINEL;

/// What a path turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCheck {
    Missing,
    Directory,
    File,
}

pub fn check_path(path: &Path) -> PathCheck {
    if !path.exists() {
        PathCheck::Missing
    } else if !path.is_file() {
        PathCheck::Directory
    } else {
        PathCheck::File
    }
}

/// Whether to keep processing after a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Continue,
    Stop,
}

/// Prompt for paths on `input` until `exit` (any case) or end of input.
///
/// Returns the number of files handed to `on_file`.
pub fn run_prompt_loop<R, W, F>(input: R, status: &mut W, mut on_file: F) -> Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Path, usize) -> Result<Next>,
{
    let mut file_count = 0;
    let mut lines = input.lines();

    loop {
        writeln!(status, "Enter a log file path ('{}' to quit):", EXIT_SENTINEL)?;
        status.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let entry = line?;
        let entry = entry.trim();

        if entry.eq_ignore_ascii_case(EXIT_SENTINEL) {
            break;
        }
        if entry.is_empty() {
            continue;
        }

        if handle_path(Path::new(entry), &mut file_count, status, &mut on_file)? == Next::Stop {
            break;
        }
    }

    Ok(file_count)
}

/// Process paths given up front, with the same checks as the prompt loop
pub fn run_paths<W, F>(paths: &[PathBuf], status: &mut W, mut on_file: F) -> Result<usize>
where
    W: Write,
    F: FnMut(&Path, usize) -> Result<Next>,
{
    let mut file_count = 0;
    for path in paths {
        if handle_path(path, &mut file_count, status, &mut on_file)? == Next::Stop {
            break;
        }
    }
    Ok(file_count)
}

fn handle_path<W, F>(path: &Path, file_count: &mut usize, status: &mut W, on_file: &mut F) -> Result<Next>
where
    W: Write,
    F: FnMut(&Path, usize) -> Result<Next>,
{
    match check_path(path) {
        PathCheck::Missing => {
            writeln!(status, "File does not exist: {}", path.display())?;
            Ok(Next::Continue)
        }
        PathCheck::Directory => {
            writeln!(status, "Path is a directory, not a file: {}", path.display())?;
            Ok(Next::Continue)
        }
        PathCheck::File => {
            *file_count += 1;
            writeln!(status, "Analyzing file #{}: {}", file_count, path.display())?;
            match on_file(path, *file_count) {
                Ok(next) => Ok(next),
                Err(err) => {
                    writeln!(status, "Error: {:#}", err)?;
                    Ok(Next::Continue)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_check_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("access.log");
        std::fs::write(&file, "").unwrap();

        assert_eq!(check_path(&file), PathCheck::File);
        assert_eq!(check_path(dir.path()), PathCheck::Directory);
        assert_eq!(check_path(&dir.path().join("nope.log")), PathCheck::Missing);
    }

    #[test]
    fn test_prompt_loop_until_exit() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("access.log");
        std::fs::write(&file, "").unwrap();

        let input = format!(
            "{}\n/no/such/file.log\n\n{}\n{}\nEXIT\n{}\n",
            file.display(),
            dir.path().display(),
            file.display(),
            file.display()
        );
        let mut status = Vec::new();
        let mut seen = Vec::new();

        let count = run_prompt_loop(Cursor::new(input), &mut status, |path, n| {
            seen.push((path.to_path_buf(), n));
            Ok(Next::Continue)
        })
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, vec![(file.clone(), 1), (file.clone(), 2)]);

        let status = String::from_utf8(status).unwrap();
        assert!(status.contains("File does not exist: /no/such/file.log"));
        assert!(status.contains("Path is a directory, not a file"));
        assert!(status.contains("Analyzing file #2"));
        assert!(!status.contains("Analyzing file #3"));
    }

    #[test]
    fn test_prompt_loop_ends_at_eof() {
        let mut status = Vec::new();
        let count = run_prompt_loop(Cursor::new(""), &mut status, |_, _| Ok(Next::Continue)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_failed_file_does_not_stop_loop() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("access.log");
        std::fs::write(&file, "").unwrap();
        let paths = vec![file.clone(), file.clone()];

        let mut status = Vec::new();
        let mut calls = 0;
        let count = run_paths(&paths, &mut status, |_, _| {
            calls += 1;
            anyhow::bail!("boom")
        })
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(calls, 2);
        assert!(String::from_utf8(status).unwrap().contains("Error: boom"));
    }

    #[test]
    fn test_stop_ends_processing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("access.log");
        std::fs::write(&file, "").unwrap();
        let paths = vec![file.clone(), file.clone(), file];

        let mut status = Vec::new();
        let count = run_paths(&paths, &mut status, |_, _| Ok(Next::Stop)).unwrap();
        assert_eq!(count, 1);
    }
}
