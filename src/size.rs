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

/// Parse a human-readable size such as `"100M"` into a number of bytes.
///
/// The text is a decimal integer optionally followed by one case-insensitive suffix: `K` for
/// `multiplier`, `M` for `multiplier^2` and `G` for `multiplier^3`. A lone suffix letter is not a
/// size.
///
/// Malformed or overflowing input yields `0` rather than an error.
///
/// # Examples
///
/// ```
/// use logforth_channel::parse_size;
///
/// assert_eq!(parse_size("100M", 1024), 100 * 1024 * 1024);
/// assert_eq!(parse_size("2k", 1000), 2000);
/// assert_eq!(parse_size("10", 1024), 10);
/// assert_eq!(parse_size("ten", 1024), 0);
/// ```
pub fn parse_size(text: &str, multiplier: i64) -> i64 {
    let (digits, exponent) = match text.as_bytes() {
        [_, .., last] => match last.to_ascii_uppercase() {
            b'K' => (&text[..text.len() - 1], 1),
            b'M' => (&text[..text.len() - 1], 2),
            b'G' => (&text[..text.len() - 1], 3),
            _ => (text, 0),
        },
        _ => (text, 0),
    };

    let Ok(value) = digits.parse::<i64>() else {
        return 0;
    };

    multiplier
        .checked_pow(exponent)
        .and_then(|scale| value.checked_mul(scale))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("100M", 1024), 104_857_600);
        assert_eq!(parse_size("1K", 1000), 1000);
        assert_eq!(parse_size("1k", 1024), 1024);
        assert_eq!(parse_size("3g", 1000), 3_000_000_000);
        assert_eq!(parse_size("1G", 1024), 1 << 30);
        assert_eq!(parse_size("5", 1024), 5);
        assert_eq!(parse_size("-5", 1024), -5);
    }

    #[test]
    fn test_parse_size_malformed_is_zero() {
        assert_eq!(parse_size("", 1024), 0);
        assert_eq!(parse_size("M", 1024), 0);
        assert_eq!(parse_size("abc", 1024), 0);
        assert_eq!(parse_size("10MB", 1024), 0);
        assert_eq!(parse_size(" 10M", 1024), 0);
        assert_eq!(parse_size("1.5M", 1024), 0);
        assert_eq!(parse_size("99999999999G", 1024), 0);
    }
}
