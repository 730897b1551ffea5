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

use std::fmt::Write;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that formats log record as human-readable text.
///
/// Output format:
///
/// ```text
/// [2024-08-11.22:44:57] ERROR app: Hello error!
/// [2024-08-11.22:44:57]  WARN app: Hello warn!
/// [2024-08-11.22:44:57]  INFO app: main.rs:53 Hello info!
/// ```
///
/// The source location is printed only when the record carries one.
///
/// You can customize the timezone of the timestamp by setting a [`TimeZone`]. Otherwise, the
/// system timezone is used.
///
/// # Examples
///
/// ```
/// use logforth_channel::layout::TextLayout;
///
/// let text_layout = TextLayout::default();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    tz: Option<TimeZone>,
}

impl TextLayout {
    /// Set the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logforth_channel::layout::TextLayout;
    ///
    /// let layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = Timestamp::try_from(record.time()).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to convert record time").with_source(err)
        })?;
        let time = match self.tz.clone() {
            Some(tz) => time.to_zoned(tz),
            None => time.to_zoned(TimeZone::system()),
        }
        .strftime("%Y-%m-%d.%H:%M:%S");

        let mut text = String::new();
        let level = record.level();
        let channel = record.channel();
        write!(&mut text, "[{time}] {level:>5} {channel}: ").map_err(Error::from_fmt_error)?;
        if let Some(file) = record.file() {
            let line = record.line().unwrap_or_default();
            write!(&mut text, "{file}:{line} ").map_err(Error::from_fmt_error)?;
        }
        text.push_str(record.payload());

        Ok(text.into_bytes())
    }
}
