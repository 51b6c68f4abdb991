//! Locale-aware number-to-words conversion.

use std::fmt::Debug;

/// Converts numbers into their spoken form for one locale.
pub trait NumberSpeller: Debug + Send + Sync {
    /// Spoken cardinal, e.g. `123` -> "one hundred and twenty-three".
    fn cardinal(&self, n: u64) -> String;

    /// Word read for the decimal separator.
    fn point_word(&self) -> &'static str;

    /// Spoken decimal: the integer part as a cardinal, then each fractional digit.
    fn decimal(&self, integer: u64, fraction: &str) -> String {
        let fraction = fraction.trim_end_matches('0');
        let fraction = if fraction.is_empty() { "0" } else { fraction };
        let mut out = self.cardinal(integer);
        out.push(' ');
        out.push_str(self.point_word());
        for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
            out.push(' ');
            out.push_str(&self.cardinal(u64::from(digit)));
        }
        out
    }
}

const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// British-style English cardinals with hyphenated tens and "and".
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishSpeller;

impl EnglishSpeller {
    fn below_hundred(n: u64) -> String {
        if n < 20 {
            return ONES[n as usize].to_string();
        }
        let tens = TENS[(n / 10) as usize];
        match n % 10 {
            0 => tens.to_string(),
            ones => format!("{}-{}", tens, ONES[ones as usize]),
        }
    }

    fn below_thousand(n: u64) -> String {
        let hundreds = n / 100;
        let rest = n % 100;
        match (hundreds, rest) {
            (0, _) => Self::below_hundred(rest),
            (h, 0) => format!("{} hundred", ONES[h as usize]),
            (h, r) => format!("{} hundred and {}", ONES[h as usize], Self::below_hundred(r)),
        }
    }
}

impl NumberSpeller for EnglishSpeller {
    fn cardinal(&self, n: u64) -> String {
        if n == 0 {
            return ONES[0].to_string();
        }

        let mut words: Vec<String> = Vec::new();
        let mut remaining = n;
        for (scale, name) in SCALES {
            if remaining >= scale {
                words.push(format!("{} {}", self.cardinal(remaining / scale), name));
                remaining %= scale;
            }
        }
        if remaining > 0 {
            if !words.is_empty() && remaining < 100 {
                words.push("and".to_string());
            }
            words.push(Self::below_thousand(remaining));
        }
        words.join(" ")
    }

    fn point_word(&self) -> &'static str {
        "point"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers() {
        let s = EnglishSpeller;
        assert_eq!(s.cardinal(0), "zero");
        assert_eq!(s.cardinal(7), "seven");
        assert_eq!(s.cardinal(19), "nineteen");
        assert_eq!(s.cardinal(40), "forty");
        assert_eq!(s.cardinal(87), "eighty-seven");
    }

    #[test]
    fn test_hundreds_and_scales() {
        let s = EnglishSpeller;
        assert_eq!(s.cardinal(100), "one hundred");
        assert_eq!(s.cardinal(123), "one hundred and twenty-three");
        assert_eq!(s.cardinal(1000), "one thousand");
        assert_eq!(s.cardinal(2005), "two thousand and five");
        assert_eq!(
            s.cardinal(1_234_567),
            "one million two hundred and thirty-four thousand five hundred and sixty-seven"
        );
    }

    #[test]
    fn test_decimal() {
        let s = EnglishSpeller;
        assert_eq!(s.decimal(3, "14"), "three point one four");
        assert_eq!(s.decimal(3, "50"), "three point five");
        assert_eq!(s.decimal(2, "00"), "two point zero");
    }
}
