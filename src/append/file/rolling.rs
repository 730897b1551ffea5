// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

use crate::Error;
use crate::ErrorKind;
use crate::append::file::clock::Clock;
use crate::append::file::rotation::STAMP_LEN;
use crate::append::file::rotation::hour_stamp;
use crate::append::file::rotation::next_hour_timestamp;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A writer for rolling files.
///
/// Records go to backing files named `{filename}-{stamp}` where the stamp is the hour bucket
/// (for example `app.log-2024081017`). A size rollover within the same hour appends a
/// generation number (`app.log-2024081017.1`). The path `{filename}` itself is kept as a link to
/// the backing file being written.
#[derive(Debug)]
pub struct RollingFileWriter {
    state: State,
    writer: File,
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = Error::new(ErrorKind::Unexpected, "failed to flush file writer on dropped")
                .with_source(err);
            self.state.trap.trap(&err);
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.state.clock.now();
        if let Some(rollover) = self.state.should_rollover(&now) {
            self.state.refresh_writer(&now, rollover, &mut self.writer);
        }

        self.writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    // required
    basedir: PathBuf,
    filename: String,

    // has default
    max_size: Option<NonZeroUsize>,
    max_files: Option<NonZeroUsize>,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl RollingFileWriterBuilder {
    /// Creates a new [`RollingFileWriterBuilder`].
    #[must_use]
    pub fn new(basedir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            basedir: basedir.into(),
            filename: filename.into(),
            max_size: None,
            max_files: None,
            clock: Clock::DefaultClock,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the trap for the rolling file writer.
    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the maximum number of backing files to keep.
    #[must_use]
    pub fn max_log_files(mut self, n: Option<NonZeroUsize>) -> Self {
        self.max_files = n;
        self
    }

    /// Set the maximum size of a backing file in bytes.
    #[must_use]
    pub fn max_file_size(mut self, n: Option<NonZeroUsize>) -> Self {
        self.max_size = n;
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the [`RollingFileWriter`].
    pub fn build(self) -> Result<RollingFileWriter, Error> {
        let Self {
            basedir,
            filename,
            max_size,
            max_files,
            clock,
            trap,
        } = self;

        if filename.is_empty() {
            return Err(Error::new(
                ErrorKind::SinkConstruction,
                "filename must not be empty",
            ));
        }

        let (state, writer) = State::new(basedir, filename, max_size, max_files, clock, trap)?;

        Ok(RollingFileWriter { state, writer })
    }
}

#[derive(Debug)]
struct LogFile {
    filepath: PathBuf,
    stamp: String,
    generation: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollover {
    Hour,
    Size,
}

#[derive(Debug)]
struct State {
    log_dir: PathBuf,
    log_filename: String,
    current_stamp: String,
    current_generation: usize,
    current_filepath: PathBuf,
    current_filesize: usize,
    next_hour_timestamp_ms: Option<i64>,
    max_size: Option<NonZeroUsize>,
    max_files: Option<NonZeroUsize>,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl State {
    fn new(
        dir: impl AsRef<Path>,
        log_filename: String,
        max_size: Option<NonZeroUsize>,
        max_files: Option<NonZeroUsize>,
        clock: Clock,
        trap: Box<dyn Trap>,
    ) -> Result<(Self, File), Error> {
        let now = clock.now();
        let log_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir).map_err(|err| {
            Error::new(ErrorKind::SinkConstruction, "failed to create log directory")
                .with_context("path", log_dir.display())
                .with_source(err)
        })?;

        let mut state = State {
            current_stamp: hour_stamp(&now),
            current_generation: 0,
            current_filepath: PathBuf::new(),
            current_filesize: 0,
            next_hour_timestamp_ms: next_hour_timestamp(&now),
            log_dir,
            log_filename,
            max_size,
            max_files,
            clock,
            trap,
        };

        // continue the newest backing file of this hour, if any
        let generation = state
            .list_logfiles()
            .map_err(|err| {
                Error::new(ErrorKind::SinkConstruction, "failed to list log files").with_source(err)
            })?
            .into_iter()
            .filter(|file| file.stamp == state.current_stamp)
            .map(|file| file.generation)
            .max()
            .unwrap_or(0);

        let (file, filepath, filesize) = state
            .open_log_file(&state.current_stamp, generation)
            .map_err(|err| {
                Error::new(ErrorKind::SinkConstruction, "failed to open log file").with_source(err)
            })?;
        state.current_generation = generation;
        state.current_filepath = filepath;
        state.current_filesize = filesize;

        state.link_current().map_err(|err| {
            Error::new(ErrorKind::SinkConstruction, "failed to link current log").with_source(err)
        })?;
        state.delete_oldest_logs_or_trap();

        Ok((state, file))
    }

    fn link_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_filename)
    }

    fn join_date(&self, stamp: &str, generation: usize) -> PathBuf {
        let filename = &self.log_filename;
        let filename = match generation {
            0 => format!("{filename}-{stamp}"),
            n => format!("{filename}-{stamp}.{n}"),
        };
        self.log_dir.join(filename)
    }

    fn open_log_file(&self, stamp: &str, generation: usize) -> Result<(File, PathBuf, usize), Error> {
        let filepath = self.join_date(stamp, generation);
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&filepath)
            .map_err(|err| {
                Error::new(ErrorKind::Unexpected, "failed to create log file")
                    .with_context("path", filepath.display())
                    .with_source(err)
            })?;
        let filesize = file.metadata().map_or(0, |metadata| metadata.len() as usize);
        Ok((file, filepath, filesize))
    }

    // create the new link aside and rename it over the old one, so the link path never dangles
    fn link_current(&self) -> Result<(), Error> {
        let link = self.link_path();
        let staging = self.log_dir.join(format!("{}_symlink", self.log_filename));
        let target = match self.current_filepath.file_name() {
            Some(name) => PathBuf::from(name),
            None => self.current_filepath.clone(),
        };

        if fs::symlink_metadata(&staging).is_ok() {
            fs::remove_file(&staging).map_err(|err| {
                Error::new(ErrorKind::Unexpected, "failed to remove stale link")
                    .with_context("path", staging.display())
                    .with_source(err)
            })?;
        }

        symlink(&target, &staging).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to create link")
                .with_context("path", staging.display())
                .with_source(err)
        })?;

        fs::rename(&staging, &link).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to replace link")
                .with_context("path", link.display())
                .with_source(err)
        })
    }

    fn list_logfiles(&self) -> Result<Vec<LogFile>, Error> {
        let read_dir = fs::read_dir(&self.log_dir).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to read log dir")
                .with_context("path", self.log_dir.display())
                .with_source(err)
        })?;

        let files = read_dir
            .filter_map(|entry| {
                let entry = entry.ok()?;

                // the writer only creates files; the link and anything else is left alone
                if !entry.file_type().ok()?.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                // if the filename is not a UTF-8 string, skip it.
                let filename = filename.to_str()?;
                let rest = filename
                    .strip_prefix(self.log_filename.as_str())?
                    .strip_prefix('-')?;

                let (stamp, generation) = match rest.split_once('.') {
                    None => (rest, 0),
                    Some((stamp, generation)) => (stamp, generation.parse::<usize>().ok()?),
                };
                if stamp.len() != STAMP_LEN
                    || !stamp.bytes().all(|b| b.is_ascii_digit())
                {
                    return None;
                }

                Some(LogFile {
                    filepath: entry.path(),
                    stamp: stamp.to_string(),
                    generation,
                })
            })
            .collect::<Vec<_>>();

        Ok(files)
    }

    fn delete_oldest_logs(&self, max_files: usize) -> Result<(), Error> {
        let mut files = self.list_logfiles()?;
        if files.len() <= max_files {
            return Ok(());
        }

        // oldest first; stamps have a fixed width so they order lexically
        files.sort_by(|a, b| {
            a.stamp
                .cmp(&b.stamp)
                .then_with(|| a.generation.cmp(&b.generation))
        });

        let excess = files.len() - max_files;
        for file in files
            .iter()
            .filter(|file| file.filepath != self.current_filepath)
            .take(excess)
        {
            let filepath = &file.filepath;
            fs::remove_file(filepath).map_err(|err| {
                Error::new(ErrorKind::Unexpected, "failed to remove old log")
                    .with_context("path", filepath.display())
                    .with_source(err)
            })?;
        }

        Ok(())
    }

    fn delete_oldest_logs_or_trap(&self) {
        if let Some(max_files) = self.max_files {
            if let Err(err) = self.delete_oldest_logs(max_files.get()) {
                let err = Error::new(ErrorKind::Unexpected, "failed to delete oldest logs")
                    .with_source(err);
                self.trap.trap(&err);
            }
        }
    }

    // a new hour takes precedence; the size limit is only consulted within an hour
    fn should_rollover(&self, now: &Zoned) -> Option<Rollover> {
        let on_hour = self
            .next_hour_timestamp_ms
            .is_some_and(|ts| now.timestamp().as_millisecond() >= ts);
        if on_hour {
            return Some(Rollover::Hour);
        }

        let on_size = self
            .max_size
            .is_some_and(|n| self.current_filesize >= n.get());
        if on_size {
            return Some(Rollover::Size);
        }

        None
    }

    fn refresh_writer(&mut self, now: &Zoned, rollover: Rollover, file: &mut File) {
        let (stamp, generation) = match rollover {
            Rollover::Hour => {
                self.next_hour_timestamp_ms = next_hour_timestamp(now);
                let stamp = hour_stamp(now);
                if stamp == self.current_stamp {
                    // the wall clock repeated an hour, e.g. leaving daylight saving time
                    return;
                }
                (stamp, 0)
            }
            Rollover::Size => (self.current_stamp.clone(), self.current_generation + 1),
        };
        self.current_filesize = 0;

        match self.open_log_file(&stamp, generation) {
            Ok((new_file, filepath, filesize)) => {
                if let Err(err) = file.flush() {
                    let err = Error::new(ErrorKind::Unexpected, "failed to flush previous writer")
                        .with_source(err);
                    self.trap.trap(&err);
                }
                *file = new_file;
                self.current_stamp = stamp;
                self.current_generation = generation;
                self.current_filepath = filepath;
                self.current_filesize = filesize;

                if let Err(err) = self.link_current() {
                    self.trap.trap(&err);
                }
                self.delete_oldest_logs_or_trap();
            }
            Err(err) => {
                let err = Error::new(ErrorKind::Unexpected, "failed to rotate log writer")
                    .with_source(err);
                self.trap.trap(&err);
            }
        }
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_: &Path, _: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
