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

use jiff::ToSpan;
use jiff::Zoned;

/// The `strftime` pattern of the hour stamp in backing file names.
pub(crate) const STAMP_FORMAT: &str = "%Y%m%d%H";

/// The length of a stamp rendered with [`STAMP_FORMAT`].
pub(crate) const STAMP_LEN: usize = 10;

/// Render the hour bucket of `now`, such as `2024081017`.
pub(crate) fn hour_stamp(now: &Zoned) -> String {
    now.strftime(STAMP_FORMAT).to_string()
}

/// Return the start of the hour after `now` in milliseconds since the epoch.
///
/// Return `None` if the next hour is out of the representable range.
pub(crate) fn next_hour_timestamp(now: &Zoned) -> Option<i64> {
    let start = now
        .with()
        .minute(0)
        .second(0)
        .subsec_nanosecond(0)
        .build()
        .ok()?;
    let next = start.checked_add(1.hour()).ok()?;
    Some(next.timestamp().as_millisecond())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Zoned;

    use super::*;

    #[test]
    fn test_next_hour_timestamp() {
        let now = Zoned::from_str("2024-08-10T17:12:52+08[+08]").unwrap();
        let expected = Zoned::from_str("2024-08-10T18:00:00+08[+08]").unwrap();
        assert_eq!(
            next_hour_timestamp(&now),
            Some(expected.timestamp().as_millisecond())
        );

        let now = Zoned::from_str("2024-08-10T23:59:59.999+08[+08]").unwrap();
        let expected = Zoned::from_str("2024-08-11T00:00:00+08[+08]").unwrap();
        assert_eq!(
            next_hour_timestamp(&now),
            Some(expected.timestamp().as_millisecond())
        );
    }

    #[test]
    fn test_hour_stamp() {
        let now = Zoned::from_str("2024-08-10T07:12:52+08[+08]").unwrap();
        let stamp = hour_stamp(&now);
        assert_eq!(stamp, "2024081007");
        assert_eq!(stamp.len(), STAMP_LEN);
    }
}
