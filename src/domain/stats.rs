//! Decode statistics.

use std::fmt;

/// Bits per character of the fixed-width baseline the savings compare against.
pub const DEFAULT_BASELINE_BITS: u32 = 16;

/// One-decimal text of `value`, rounded half away from zero.
///
/// Rounds the shortest decimal form of the double, not its binary value:
/// `63.949999999999996` gives `63.9` and `0.25` gives `0.3`.
pub fn format_one_decimal(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value:.1}");
    }

    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let mut frac = frac_part.bytes();
    let tenths = frac.next().unwrap_or(b'0');
    let round_up = frac.next().is_some_and(|d| d >= b'5');

    // Integer digits followed by the tenths digit, least significant last
    let mut digits: Vec<u8> = int_part.bytes().chain([tenths]).map(|d| d - b'0').collect();
    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let (int_digits, tenths) = digits.split_at(digits.len() - 1);
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.extend(int_digits.iter().map(|d| char::from(b'0' + d)));
    out.push('.');
    out.push(char::from(b'0' + tenths[0]));
    out
}

/// Numeric counterpart of [`format_one_decimal`].
pub fn round1(value: f64) -> f64 {
    format_one_decimal(value).parse().unwrap_or(value)
}

/// Compression figures for one decoded message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Length of the consumed bit string
    pub encoded_bits: usize,
    /// Number of decoded characters
    pub total_characters: usize,
    /// Fixed-width bits per character used as the savings baseline
    pub baseline_bits: u32,
}

impl Statistics {
    pub fn new(encoded_bits: usize, total_characters: usize) -> Self {
        Self::with_baseline(encoded_bits, total_characters, DEFAULT_BASELINE_BITS)
    }

    pub fn with_baseline(encoded_bits: usize, total_characters: usize, baseline_bits: u32) -> Self {
        Self {
            encoded_bits,
            total_characters,
            baseline_bits,
        }
    }

    /// `None` when nothing was decoded.
    pub fn avg_bits_per_char(&self) -> Option<f64> {
        (self.total_characters > 0)
            .then(|| self.encoded_bits as f64 / self.total_characters as f64)
    }

    /// Percentage saved against the baseline; negative if the code is wider.
    pub fn space_saving_percent(&self) -> Option<f64> {
        let baseline = self.total_characters as f64 * f64::from(self.baseline_bits);
        (baseline > 0.0).then(|| (1.0 - self.encoded_bits as f64 / baseline) * 100.0)
    }
}

fn one_decimal(value: Option<f64>) -> String {
    value
        .map(format_one_decimal)
        .unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Avg bits/char: {}", one_decimal(self.avg_bits_per_char()))?;
        writeln!(f, "Total Characters: {}", self.total_characters)?;
        write!(f, "Space Saving: {}%", one_decimal(self.space_saving_percent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_chars_eight_bits() {
        let stats = Statistics::new(8, 4);
        assert_eq!(stats.avg_bits_per_char(), Some(2.0));
        assert_eq!(stats.space_saving_percent(), Some(87.5));
        assert_eq!(
            stats.to_string(),
            "Avg bits/char: 2.0\nTotal Characters: 4\nSpace Saving: 87.5%"
        );
    }

    #[test]
    fn test_negative_saving_when_wider_than_baseline() {
        let stats = Statistics::new(20, 1);
        assert_eq!(round1(stats.space_saving_percent().unwrap()), -25.0);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(2.0 / 3.0), 0.7);
        assert_eq!(round1(-0.25), -0.3);
    }

    #[test]
    fn test_format_rounds_shortest_decimal_form() {
        assert_eq!(format_one_decimal(63.949999999999996), "63.9");
        assert_eq!(format_one_decimal(0.25), "0.3");
        assert_eq!(format_one_decimal(0.35), "0.4");
        assert_eq!(format_one_decimal(9.96), "10.0");
        assert_eq!(format_one_decimal(99.95), "100.0");
        assert_eq!(format_one_decimal(2.0), "2.0");
        assert_eq!(format_one_decimal(-25.0), "-25.0");
        assert_eq!(format_one_decimal(-0.25), "-0.3");
    }

    #[test]
    fn test_nothing_decoded_renders_na() {
        let stats = Statistics::new(3, 0);
        assert_eq!(stats.avg_bits_per_char(), None);
        assert!(stats.to_string().contains("Avg bits/char: n/a"));
        assert!(stats.to_string().contains("Space Saving: n/a%"));
    }

    #[test]
    fn test_custom_baseline() {
        let stats = Statistics::with_baseline(8, 4, 8);
        assert_eq!(stats.space_saving_percent(), Some(75.0));
    }
}
