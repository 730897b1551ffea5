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

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::ErrorKind;
use crate::Trap;
use crate::append::Append;
use crate::append::file::rolling::RollingFileWriter;
use crate::append::file::rolling::RollingFileWriterBuilder;
use crate::layout::Layout;
use crate::layout::TextLayout;
use crate::record::Record;

/// A builder to configure and create an [`File`] appender.
#[derive(Debug)]
pub struct FileBuilder {
    path: PathBuf,
    max_size: Option<NonZeroUsize>,
    max_files: Option<NonZeroUsize>,
    layout: Box<dyn Layout>,
    trap: Option<Box<dyn Trap>>,
}

impl FileBuilder {
    /// Create a new file appender builder.
    ///
    /// `path` is the stable path of the log, such as `logs/app.log`. Backing files are created
    /// next to it and `path` itself always links to the one being written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: None,
            max_files: None,
            layout: Box::new(TextLayout::default()),
            trap: None,
        }
    }

    /// Build the [`File`] appender.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The path has no file name.
    /// * The log directory cannot be created.
    /// * The backing file or the link to it cannot be created.
    pub fn build(self) -> Result<File, Error> {
        let FileBuilder {
            path,
            max_size,
            max_files,
            layout,
            trap,
        } = self;

        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            return Err(
                Error::new(ErrorKind::SinkConstruction, "log path has no valid file name")
                    .with_context("path", path.display()),
            );
        };
        let basedir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut builder = RollingFileWriterBuilder::new(basedir, filename)
            .max_file_size(max_size)
            .max_log_files(max_files);
        if let Some(trap) = trap {
            builder = builder.trap(trap);
        }

        let writer = builder
            .build()
            .map_err(|err| err.with_context("path", path.display()))?;
        Ok(File::new(writer, layout))
    }

    /// Set the layout for the logs.
    ///
    /// Default to [`TextLayout`].
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logforth_channel::append::FileBuilder;
    /// use logforth_channel::layout::TextLayout;
    ///
    /// let builder = FileBuilder::new("logs/app.log");
    /// builder.layout(TextLayout::default().timezone(TimeZone::UTC));
    /// ```
    pub fn layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the trap for errors that occur while rotating files.
    ///
    /// Default to [`DefaultTrap`](crate::trap::DefaultTrap).
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = Some(trap.into());
        self
    }

    /// Roll over to a new backing file once the current one reaches the given size.
    ///
    /// Files always roll over at the start of each local hour. The hour is checked first and the
    /// size only within the same hour, so one write never triggers two rollovers.
    pub fn rollover_size(mut self, n: NonZeroUsize) -> Self {
        self.max_size = Some(n);
        self
    }

    /// Set the maximum number of backing files to keep, including the one being written.
    ///
    /// Unlimited by default.
    pub fn max_log_files(mut self, n: NonZeroUsize) -> Self {
        self.max_files = Some(n);
        self
    }
}

/// An appender that writes log records to rolling files.
#[derive(Debug)]
pub struct File {
    writer: Mutex<RollingFileWriter>,
    layout: Box<dyn Layout>,
}

impl File {
    fn new(writer: RollingFileWriter, layout: Box<dyn Layout>) -> Self {
        let writer = Mutex::new(writer);
        Self { writer, layout }
    }

    fn writer(&self) -> MutexGuard<'_, RollingFileWriter> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for File {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        let mut writer = self.writer();
        writer.write_all(&bytes).map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer();
        writer.flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}

impl Drop for File {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = writer.flush();
    }
}
