//! Code 128 subset B encoder.
//!
//! ```text
//!  ┌───────┬─────────────────────┬──────────┬────────┐
//!  │ START │ data symbols ...    │ checksum │  STOP  │
//!  │  104  │ char - 32           │  mod 103 │  106   │
//!  │ 11 mod│ 11 modules each     │  11 mod  │ 13 mod │
//!  └───────┴─────────────────────┴──────────┴────────┘
//! ```
//!
//! Each pattern lists alternating bar/space widths, starting with a bar.

use crate::error::{CoreError, CoreResult};

const START_B: usize = 104;
const STOP_PATTERN: &str = "2331112";

#[rustfmt::skip]
const PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312",
    "132212", "221213", "221312", "231212", "112232", "122132", "122231", "113222",
    "123122", "123221", "223211", "221132", "221231", "213212", "223112", "312131",
    "311222", "321122", "321221", "312212", "322112", "322211", "212123", "212321",
    "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121",
    "313121", "211331", "231131", "213113", "213311", "213131", "311123", "311321",
    "331121", "312113", "312311", "332111", "314111", "221411", "431111", "111224",
    "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112",
    "421211", "212141", "214121", "412121", "111143", "111341", "131141", "114113",
    "114311", "411113", "411311", "113141", "114131", "311141", "411131", "211412",
    "211214", "211232",
];

/// Symbol values for `value`, without start, checksum or stop.
fn symbol_values(value: &str) -> CoreResult<Vec<usize>> {
    if value.is_empty() {
        return Err(CoreError::Unencodable {
            value: String::new(),
            reason: "empty value".to_string(),
        });
    }

    value
        .chars()
        .map(|c| match c {
            ' '..='~' => Ok(c as usize - 32),
            _ => Err(CoreError::Unencodable {
                value: value.to_string(),
                reason: format!("'{c}' is outside printable ASCII"),
            }),
        })
        .collect()
}

/// Checksum symbol: `(104 + Σ value × position) mod 103`.
pub fn checksum(value: &str) -> CoreResult<usize> {
    let weighted: usize = symbol_values(value)?
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1))
        .sum();
    Ok((START_B + weighted) % 103)
}

fn push_pattern(modules: &mut Vec<bool>, pattern: &str) {
    for (i, width) in pattern.bytes().enumerate() {
        let bar = i % 2 == 0;
        modules.extend(std::iter::repeat(bar).take(usize::from(width - b'0')));
    }
}

/// Encodes `value` into modules (`true` = bar), without quiet zones.
pub fn encode(value: &str) -> CoreResult<Vec<bool>> {
    let values = symbol_values(value)?;
    let check = checksum(value)?;

    let mut modules = Vec::with_capacity((values.len() + 2) * 11 + 13);
    push_pattern(&mut modules, PATTERNS[START_B]);
    for v in values {
        push_pattern(&mut modules, PATTERNS[v]);
    }
    push_pattern(&mut modules, PATTERNS[check]);
    push_pattern(&mut modules, STOP_PATTERN);
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_is_eleven_modules() {
        for pattern in PATTERNS {
            let width: u32 = pattern.bytes().map(|b| u32::from(b - b'0')).sum();
            assert_eq!(width, 11, "{pattern}");
        }
    }

    #[test]
    fn test_checksum() {
        // 'A' = 33; (104 + 33) mod 103 = 34
        assert_eq!(checksum("A").unwrap(), 34);
        // 'A' = 33, 'B' = 34; (104 + 33 + 68) mod 103 = 102
        assert_eq!(checksum("AB").unwrap(), 102);
    }

    #[test]
    fn test_encode_length_and_edges() {
        let modules = encode("A").unwrap();
        assert_eq!(modules.len(), 46);
        assert!(modules[0]);
        assert!(modules[modules.len() - 1]);

        assert_eq!(encode("TSH-RED-M").unwrap().len(), 11 * 11 + 13);
    }

    #[test]
    fn test_rejects_non_ascii_and_empty() {
        assert!(matches!(encode("₹10"), Err(CoreError::Unencodable { .. })));
        assert!(encode("").is_err());
    }
}
