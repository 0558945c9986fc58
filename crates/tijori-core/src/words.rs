//! # Amount in Words
//!
//! Spells rupee amounts the way they are printed on Indian invoices:
//! crore / lakh / thousand grouping, paise appended only when present,
//! and a closing "only".
//!
//! ```text
//!   12,34,56,789.05
//!   └┬┘ └┬┘ └┬┘ └┬┘ └┬┘
//!    │   │   │   │   └── "five paise"
//!    │   │   │   └────── three-digit remainder: "seven hundred eighty nine"
//!    │   │   └────────── thousand: "fifty six thousand"
//!    │   └────────────── lakh:     "thirty four lakh"
//!    └────────────────── crore:    "twelve crore"
//! ```

use crate::money::Money;
use crate::numeric::coerce_f64;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Spells an amount in rupees and paise.
///
/// Negative and non-finite amounts are spoken as zero.
///
/// ## Example
/// ```rust
/// use tijori_core::words::inr_words;
///
/// assert_eq!(inr_words(0.0), "zero rupees only");
/// assert_eq!(inr_words(100.0), "one hundred rupees only");
/// assert_eq!(inr_words(1_000_000.0), "ten lakh rupees only");
/// assert_eq!(inr_words(21.5), "twenty one rupees and fifty paise only");
/// ```
pub fn inr_words(amount: f64) -> String {
    money_words(Money::from_amount(amount))
}

/// Like [`inr_words`] for raw text input; unparseable text is zero.
pub fn inr_words_str(raw: &str) -> String {
    inr_words(coerce_f64(Some(raw)))
}

/// Spells a [`Money`] value.
pub fn money_words(amount: Money) -> String {
    let paise = amount.paise().max(0) as u64;
    let rupees = paise / 100;
    let minor = paise % 100;

    let mut out = number_words(rupees);
    out.push_str(" rupees");
    if minor > 0 {
        out.push_str(" and ");
        out.push_str(&number_words(minor));
        out.push_str(" paise");
    }
    out.push_str(" only");
    out
}

/// Spells a whole number with Indian grouping.
///
/// Zero-valued groups are omitted, so one million is "ten lakh", never
/// "ten lakh zero thousand".
///
/// ## Example
/// ```rust
/// use tijori_core::words::number_words;
///
/// assert_eq!(number_words(105), "one hundred five");
/// assert_eq!(number_words(1_000_000_000), "one hundred crore");
/// ```
pub fn number_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::with_capacity(4);

    let crore = n / CRORE;
    let rem = n % CRORE;
    if crore > 0 {
        parts.push(format!("{} crore", number_words(crore)));
    }

    let lakh = rem / LAKH;
    let rem = rem % LAKH;
    if lakh > 0 {
        parts.push(format!("{} lakh", number_words(lakh)));
    }

    let thousand = rem / THOUSAND;
    let rem = rem % THOUSAND;
    if thousand > 0 {
        parts.push(format!("{} thousand", number_words(thousand)));
    }

    if rem > 0 {
        parts.push(three_digits(rem));
    }

    parts.join(" ")
}

fn two_digits(n: u64) -> String {
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        ones => format!("{} {}", tens, ONES[ones as usize]),
    }
}

fn three_digits(n: u64) -> String {
    let hundreds = n / 100;
    let rem = n % 100;
    match (hundreds, rem) {
        (0, rem) => two_digits(rem),
        (h, 0) => format!("{} hundred", ONES[h as usize]),
        (h, rem) => format!("{} hundred {}", ONES[h as usize], two_digits(rem)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_small() {
        assert_eq!(inr_words(0.0), "zero rupees only");
        assert_eq!(inr_words(1.0), "one rupees only");
        assert_eq!(inr_words(19.0), "nineteen rupees only");
        assert_eq!(inr_words(40.0), "forty rupees only");
        assert_eq!(inr_words(99.0), "ninety nine rupees only");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(inr_words(100.0), "one hundred rupees only");
        assert_eq!(inr_words(320.0), "three hundred twenty rupees only");
        assert_eq!(inr_words(999.0), "nine hundred ninety nine rupees only");
    }

    #[test]
    fn test_indian_groups_skip_zero_groups() {
        assert_eq!(inr_words(1_000.0), "one thousand rupees only");
        assert_eq!(inr_words(100_000.0), "one lakh rupees only");
        assert_eq!(inr_words(1_000_000.0), "ten lakh rupees only");
        assert_eq!(inr_words(10_000_000.0), "one crore rupees only");
        assert_eq!(inr_words(10_000_001.0), "one crore one rupees only");
        assert_eq!(
            inr_words(123_456_789.0),
            "twelve crore thirty four lakh fifty six thousand seven hundred eighty nine rupees only"
        );
    }

    #[test]
    fn test_crore_count_recurses() {
        assert_eq!(number_words(2_500_000_000), "two hundred fifty crore");
        assert_eq!(number_words(1_000_000_000_000), "one lakh crore");
    }

    #[test]
    fn test_paise() {
        assert_eq!(inr_words(0.5), "zero rupees and fifty paise only");
        assert_eq!(inr_words(270.05), "two hundred seventy rupees and five paise only");
        assert_eq!(inr_words(10.99), "ten rupees and ninety nine paise only");
    }

    #[test]
    fn test_negative_and_garbage_are_zero() {
        assert_eq!(inr_words(-42.0), "zero rupees only");
        assert_eq!(inr_words(f64::NAN), "zero rupees only");
        assert_eq!(inr_words_str("not money"), "zero rupees only");
        assert_eq!(inr_words_str("12,50"), "twelve rupees and fifty paise only");
    }
}
