//! Code 128 barcode encoding
//!
//! Digits-only data is packed two per symbol with code set C (an odd
//! trailing digit switches to code set B); anything else printable ASCII
//! uses code set B.

use crate::error::{PrintError, PrintResult};

/// Bar/space widths of symbol values 0..=105, stop is separate
const PATTERNS: [&[u8; 6]; 106] = [
    b"212222", b"222122", b"222221", b"121223", b"121322", b"131222", b"122213", b"122312",
    b"132212", b"221213", b"221312", b"231212", b"112232", b"122132", b"122231", b"113222",
    b"123122", b"123221", b"223211", b"221132", b"221231", b"213212", b"223112", b"312131",
    b"311222", b"321122", b"321221", b"312212", b"322112", b"322211", b"212123", b"212321",
    b"232121", b"111323", b"131123", b"131321", b"112313", b"132113", b"132311", b"211313",
    b"231113", b"231311", b"112133", b"112331", b"132131", b"113123", b"113321", b"133121",
    b"313121", b"211331", b"231131", b"213113", b"213311", b"213131", b"311123", b"311321",
    b"331121", b"312113", b"312311", b"332111", b"314111", b"221411", b"431111", b"111224",
    b"111422", b"121124", b"121421", b"141122", b"141221", b"112214", b"112412", b"122114",
    b"122411", b"142112", b"142211", b"241211", b"221114", b"413111", b"241112", b"134111",
    b"111242", b"121142", b"121241", b"114212", b"124112", b"124211", b"411212", b"421112",
    b"421211", b"212141", b"214121", b"412121", b"111143", b"111341", b"131141", b"114113",
    b"114311", b"411113", b"411311", b"113141", b"114131", b"311141", b"411131", b"211412",
    b"211214", b"211232",
];
const STOP: &[u8; 7] = b"2331112";

const CODE_B: u8 = 100;
const START_B: u8 = 104;
const START_C: u8 = 105;

/// Quiet zone on each side, in modules
const QUIET_ZONE: usize = 10;

/// An encoded Code 128 symbol sequence (start, data, check, stop excluded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    values: Vec<u8>,
}

impl Code128 {
    /// Encode `data`; fails on empty input or characters outside ASCII 32..=126
    pub fn encode(data: &str) -> PrintResult<Self> {
        if data.is_empty() {
            return Err(PrintError::Barcode("Empty barcode data".to_string()));
        }
        if let Some(c) = data.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(PrintError::Barcode(format!(
                "Character {:?} cannot be encoded",
                c
            )));
        }

        let bytes = data.as_bytes();
        let mut values = Vec::with_capacity(bytes.len() + 3);

        if bytes.len() >= 2 && bytes.iter().all(u8::is_ascii_digit) {
            values.push(START_C);
            let pairs = bytes.chunks_exact(2);
            let rest = pairs.remainder();
            for pair in pairs {
                values.push((pair[0] - b'0') * 10 + (pair[1] - b'0'));
            }
            if let Some(&last) = rest.first() {
                values.push(CODE_B);
                values.push(last - b' ');
            }
        } else {
            values.push(START_B);
            values.extend(bytes.iter().map(|b| b - b' '));
        }

        values.push(Self::checksum(&values));
        Ok(Self { values })
    }

    /// Modulo-103 weighted sum; the start symbol has weight 1 like the first data symbol
    fn checksum(values: &[u8]) -> u8 {
        let sum: u32 = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i.max(1) as u32) * (*v as u32))
            .sum();
        (sum % 103) as u8
    }

    /// Symbol values including start and check symbol
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Modules left to right, `true` for bar, quiet zones included
    pub fn modules(&self) -> Vec<bool> {
        let mut modules = vec![false; QUIET_ZONE];
        let widths = self
            .values
            .iter()
            .flat_map(|v| PATTERNS[*v as usize].iter())
            .chain(STOP.iter());

        for (i, w) in widths.enumerate() {
            let bar = i % 2 == 0;
            modules.extend(std::iter::repeat_n(bar, (w - b'0') as usize));
        }

        modules.extend(std::iter::repeat_n(false, QUIET_ZONE));
        modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_is_eleven_modules() {
        for (value, pattern) in PATTERNS.iter().enumerate() {
            let sum: u32 = pattern.iter().map(|w| (w - b'0') as u32).sum();
            assert_eq!(sum, 11, "symbol {}", value);
        }
        let stop: u32 = STOP.iter().map(|w| (w - b'0') as u32).sum();
        assert_eq!(stop, 13);
    }

    #[test]
    fn test_even_digits_use_code_c() {
        let code = Code128::encode("1234").unwrap();
        // (105 + 1*12 + 2*34) % 103 = 82
        assert_eq!(code.values(), &[START_C, 12, 34, 82]);
    }

    #[test]
    fn test_odd_digits_switch_to_code_b() {
        let code = Code128::encode("20713").unwrap();
        let values = code.values();
        assert_eq!(&values[..5], &[START_C, 20, 71, CODE_B, b'3' - b' ']);
        assert_eq!(values.len(), 6);
    }

    #[test]
    fn test_text_uses_code_b() {
        let code = Code128::encode("A1").unwrap();
        assert_eq!(code.values()[..3], [START_B, 33, 17]);
    }

    #[test]
    fn test_module_count() {
        let code = Code128::encode("1234").unwrap();
        let modules = code.modules();
        assert_eq!(modules.len(), QUIET_ZONE * 2 + 4 * 11 + 13);
        assert!(!modules[0]);
        assert!(modules[QUIET_ZONE]);
    }

    #[test]
    fn test_rejects_unencodable_data() {
        assert!(Code128::encode("").is_err());
        assert!(Code128::encode("Ժ").is_err());
        assert!(Code128::encode("tab\there").is_err());
    }
}
