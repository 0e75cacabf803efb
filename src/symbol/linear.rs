//! One-dimensional encoders.
//!
//! Every encoder produces a flat module row: `true` for a dark module. Wide
//! elements are expanded into several modules so renderers only deal with a
//! single unit width.

use super::{LinearSymbol, SymbolError, SymbolFormat};
use crate::validate::check_digit;

/// Code 128 code set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code128Set {
    /// Upper case, digits and control characters
    A,
    /// Full printable ASCII
    B,
    /// Digit pairs
    C,
}

impl Code128Set {
    fn start(self) -> usize {
        match self {
            Code128Set::A => 103,
            Code128Set::B => 104,
            Code128Set::C => 105,
        }
    }

    fn format(self) -> SymbolFormat {
        match self {
            Code128Set::A => SymbolFormat::Code128A,
            Code128Set::B => SymbolFormat::Code128B,
            Code128Set::C => SymbolFormat::Code128C,
        }
    }
}

/// Bar/space widths per symbol value, starting with a bar.
static CODE128_PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212", "221213",
    "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221", "223211", "221132",
    "221231", "213212", "223112", "312131", "311222", "321122", "321221", "312212", "322112", "322211",
    "212123", "212321", "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121", "313121", "211331",
    "231131", "213113", "213311", "213131", "311123", "311321", "331121", "312113", "312311", "332111",
    "314111", "221411", "431111", "111224", "111422", "121124", "121421", "141122", "141221", "112214",
    "112412", "122114", "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311", "113141",
    "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const CODE128_STOP: usize = 106;

fn push_widths(modules: &mut Vec<bool>, widths: &str) {
    for (i, w) in widths.bytes().enumerate() {
        let dark = i % 2 == 0;
        modules.extend(std::iter::repeat(dark).take(usize::from(w - b'0')));
    }
}

fn push_bits(modules: &mut Vec<bool>, bits: &str) {
    modules.extend(bits.bytes().map(|b| b == b'1'));
}

fn all_digits(data: &str) -> bool {
    !data.is_empty() && data.bytes().all(|b| b.is_ascii_digit())
}

fn pick_code128_set(data: &str) -> Option<Code128Set> {
    if data.len() >= 4 && data.len() % 2 == 0 && all_digits(data) {
        Some(Code128Set::C)
    } else if data.bytes().all(|b| (32..=127).contains(&b)) {
        Some(Code128Set::B)
    } else if data.bytes().all(|b| b <= 95) {
        Some(Code128Set::A)
    } else {
        None
    }
}

fn code128_values(data: &str, set: Code128Set) -> Result<Vec<usize>, SymbolError> {
    let format = set.format();
    match set {
        Code128Set::C => {
            if !all_digits(data) || data.len() % 2 != 0 {
                return Err(SymbolError::invalid(format, "code set C needs an even number of digits"));
            }
            Ok(data
                .as_bytes()
                .chunks(2)
                .map(|pair| usize::from(pair[0] - b'0') * 10 + usize::from(pair[1] - b'0'))
                .collect())
        }
        Code128Set::B => data
            .bytes()
            .map(|b| match b {
                32..=127 => Ok(usize::from(b - 32)),
                _ => Err(SymbolError::invalid(format, format!("byte {b:#04x} is outside code set B"))),
            })
            .collect(),
        Code128Set::A => data
            .bytes()
            .map(|b| match b {
                0..=31 => Ok(usize::from(b) + 64),
                32..=95 => Ok(usize::from(b - 32)),
                _ => Err(SymbolError::invalid(format, format!("byte {b:#04x} is outside code set A"))),
            })
            .collect(),
    }
}

const CODE128_SHIFT: usize = 98;
const CODE128_TO_B: usize = 100;
const CODE128_TO_A: usize = 101;

fn fits_code128_set(b: u8, set: Code128Set) -> bool {
    match set {
        Code128Set::A => b <= 95,
        Code128Set::B => (32..=127).contains(&b),
        Code128Set::C => false,
    }
}

fn code128_value(b: u8, set: Code128Set) -> usize {
    match (set, b) {
        (Code128Set::A, 0..=31) => usize::from(b) + 64,
        _ => usize::from(b - 32),
    }
}

/// Encodes ASCII data that no single code set covers, moving between sets A
/// and B. A lone character of the other set is sent with SHIFT, a longer run
/// switches the set.
fn code128_mixed_values(data: &str) -> Result<(Code128Set, Vec<usize>), SymbolError> {
    let bytes = data.as_bytes();
    if let Some(b) = bytes.iter().find(|b| **b > 127) {
        return Err(SymbolError::invalid(
            SymbolFormat::Code128,
            format!("byte {b:#04x} is outside every code set"),
        ));
    }

    // Start in the set the first set-specific character needs.
    let start = match bytes.iter().find(|b| **b < 32 || **b > 95) {
        Some(b) if *b < 32 => Code128Set::A,
        _ => Code128Set::B,
    };

    let mut set = start;
    let mut values = Vec::with_capacity(bytes.len() + 4);
    for (i, &b) in bytes.iter().enumerate() {
        if fits_code128_set(b, set) {
            values.push(code128_value(b, set));
            continue;
        }
        let other = match set {
            Code128Set::A => Code128Set::B,
            _ => Code128Set::A,
        };
        let next_fits = bytes.get(i + 1).is_some_and(|n| fits_code128_set(*n, set));
        if next_fits {
            values.push(CODE128_SHIFT);
        } else {
            values.push(if other == Code128Set::A { CODE128_TO_A } else { CODE128_TO_B });
            set = other;
        }
        values.push(code128_value(b, other));
    }
    Ok((start, values))
}

/// Code 128. `None` picks a single code set for the whole payload when one
/// covers it and falls back to switching between sets A and B otherwise.
pub fn code128(data: &str, set: Option<Code128Set>) -> Result<LinearSymbol, SymbolError> {
    let (set, values) = match set.or_else(|| pick_code128_set(data)) {
        Some(set) => (set, code128_values(data, set)?),
        None => code128_mixed_values(data)?,
    };

    let checksum = values
        .iter()
        .enumerate()
        .fold(set.start(), |acc, (i, v)| acc + v * (i + 1))
        % 103;

    let mut modules = Vec::with_capacity((values.len() + 3) * 11 + 2);
    push_widths(&mut modules, CODE128_PATTERNS[set.start()]);
    for &value in &values {
        push_widths(&mut modules, CODE128_PATTERNS[value]);
    }
    push_widths(&mut modules, CODE128_PATTERNS[checksum]);
    push_widths(&mut modules, CODE128_PATTERNS[CODE128_STOP]);

    Ok(LinearSymbol {
        modules,
        text: data.to_string(),
    })
}

/// Narrow/wide elements per character, starting with a bar.
static CODE39_PATTERNS: &[(u8, &str)] = &[
    (b'0', "nnnwwnwnn"), (b'1', "wnnwnnnnw"), (b'2', "nnwwnnnnw"), (b'3', "wnwwnnnnn"),
    (b'4', "nnnwwnnnw"), (b'5', "wnnwwnnnn"), (b'6', "nnwwwnnnn"), (b'7', "nnnwnnwnw"),
    (b'8', "wnnwnnwnn"), (b'9', "nnwwnnwnn"), (b'A', "wnnnnwnnw"), (b'B', "nnwnnwnnw"),
    (b'C', "wnwnnwnnn"), (b'D', "nnnnwwnnw"), (b'E', "wnnnwwnnn"), (b'F', "nnwnwwnnn"),
    (b'G', "nnnnnwwnw"), (b'H', "wnnnnwwnn"), (b'I', "nnwnnwwnn"), (b'J', "nnnnwwwnn"),
    (b'K', "wnnnnnnww"), (b'L', "nnwnnnnww"), (b'M', "wnwnnnnwn"), (b'N', "nnnnwnnww"),
    (b'O', "wnnnwnnwn"), (b'P', "nnwnwnnwn"), (b'Q', "nnnnnnwww"), (b'R', "wnnnnnwwn"),
    (b'S', "nnwnnnwwn"), (b'T', "nnnnwnwwn"), (b'U', "wwnnnnnnw"), (b'V', "nwwnnnnnw"),
    (b'W', "wwwnnnnnn"), (b'X', "nwnnwnnnw"), (b'Y', "wwnnwnnnn"), (b'Z', "nwwnwnnnn"),
    (b'-', "nwnnnnwnw"), (b'.', "wwnnnnwnn"), (b' ', "nwwnnnwnn"), (b'$', "nwnwnwnnn"),
    (b'/', "nwnwnnnwn"), (b'+', "nwnnnwnwn"), (b'%', "nnnwnwnwn"), (b'*', "nwnnwnwnn"),
];

fn push_narrow_wide(modules: &mut Vec<bool>, pattern: &str, wide: usize) {
    for (i, e) in pattern.bytes().enumerate() {
        let width = if e == b'w' { wide } else { 1 };
        modules.extend(std::iter::repeat(i % 2 == 0).take(width));
    }
}

/// Code 39 with `*` start/stop and a narrow inter-character gap.
pub fn code39(data: &str) -> Result<LinearSymbol, SymbolError> {
    let upper = data.to_ascii_uppercase();
    let mut modules = Vec::new();
    let framed = std::iter::once(b'*').chain(upper.bytes()).chain(std::iter::once(b'*'));
    for (i, b) in framed.enumerate() {
        if b == b'*' && i != 0 && i != upper.len() + 1 {
            return Err(SymbolError::invalid(SymbolFormat::Code39, "'*' is reserved for start/stop"));
        }
        let pattern = CODE39_PATTERNS
            .iter()
            .find(|(c, _)| *c == b)
            .map(|(_, p)| *p)
            .ok_or_else(|| SymbolError::invalid(SymbolFormat::Code39, format!("character {:?} not in Code 39", b as char)))?;
        if i != 0 {
            modules.push(false);
        }
        push_narrow_wide(&mut modules, pattern, 2);
    }
    Ok(LinearSymbol { modules, text: upper })
}

/// EAN left-hand odd parity (L) codes as 7 bit values.
const EAN_L: [u8; 10] = [0x0D, 0x19, 0x13, 0x3D, 0x23, 0x31, 0x2F, 0x3B, 0x37, 0x0B];

/// Parity of the six left-hand digits keyed by the leading EAN-13 digit.
const EAN_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL", "LGGLGL",
];

#[derive(Clone, Copy)]
enum EanSet {
    L,
    G,
    R,
}

fn ean_digit(digit: u8, set: EanSet) -> u8 {
    let l = EAN_L[usize::from(digit)];
    match set {
        EanSet::L => l,
        EanSet::R => !l & 0x7F,
        EanSet::G => (!l & 0x7F).reverse_bits() >> 1,
    }
}

fn push_ean_digit(modules: &mut Vec<bool>, digit: u8, set: EanSet) {
    let code = ean_digit(digit, set);
    modules.extend((0..7).rev().map(|bit| (code >> bit) & 1 == 1));
}

/// Accepts the payload with or without its check digit and returns all digits.
fn with_check_digit(data: &str, payload_len: usize, format: SymbolFormat) -> Result<Vec<u8>, SymbolError> {
    if !all_digits(data) {
        return Err(SymbolError::invalid(format, "only digits are allowed"));
    }
    let payload = match data.len() {
        n if n == payload_len => data,
        n if n == payload_len + 1 => &data[..payload_len],
        n => {
            return Err(SymbolError::invalid(
                format,
                format!("expected {} or {} digits, got {n}", payload_len, payload_len + 1),
            ))
        }
    };
    let check = check_digit(payload).ok_or_else(|| SymbolError::invalid(format, "only digits are allowed"))?;
    if data.len() == payload_len + 1 && data.as_bytes()[payload_len] - b'0' != check {
        return Err(SymbolError::invalid(format, format!("check digit should be {check}")));
    }
    let mut digits: Vec<u8> = payload.bytes().map(|b| b - b'0').collect();
    digits.push(check);
    Ok(digits)
}

fn digits_text(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn ean13_modules(digits: &[u8]) -> Vec<bool> {
    let parity = EAN_PARITY[usize::from(digits[0])].as_bytes();
    let mut modules = Vec::with_capacity(95);
    push_bits(&mut modules, "101");
    for (i, &d) in digits[1..7].iter().enumerate() {
        let set = if parity[i] == b'G' { EanSet::G } else { EanSet::L };
        push_ean_digit(&mut modules, d, set);
    }
    push_bits(&mut modules, "01010");
    for &d in &digits[7..13] {
        push_ean_digit(&mut modules, d, EanSet::R);
    }
    push_bits(&mut modules, "101");
    modules
}

/// EAN-13 from 12 digits (check digit computed) or 13 (check digit verified).
pub fn ean13(data: &str) -> Result<LinearSymbol, SymbolError> {
    let digits = with_check_digit(data, 12, SymbolFormat::Ean13)?;
    Ok(LinearSymbol {
        modules: ean13_modules(&digits),
        text: digits_text(&digits),
    })
}

/// UPC-A, drawn as an EAN-13 with a leading zero.
pub fn upca(data: &str) -> Result<LinearSymbol, SymbolError> {
    let digits = with_check_digit(data, 11, SymbolFormat::Upc)?;
    let mut ean = Vec::with_capacity(13);
    ean.push(0);
    ean.extend_from_slice(&digits);
    Ok(LinearSymbol {
        modules: ean13_modules(&ean),
        text: digits_text(&digits),
    })
}

/// EAN-8 from 7 or 8 digits.
pub fn ean8(data: &str) -> Result<LinearSymbol, SymbolError> {
    let digits = with_check_digit(data, 7, SymbolFormat::Ean8)?;
    let mut modules = Vec::with_capacity(67);
    push_bits(&mut modules, "101");
    for &d in &digits[..4] {
        push_ean_digit(&mut modules, d, EanSet::L);
    }
    push_bits(&mut modules, "01010");
    for &d in &digits[4..] {
        push_ean_digit(&mut modules, d, EanSet::R);
    }
    push_bits(&mut modules, "101");
    Ok(LinearSymbol {
        modules,
        text: digits_text(&digits),
    })
}

const ITF_PATTERNS: [&str; 10] = [
    "nnwwn", "wnnnw", "nwnnw", "wwnnn", "nnwnw", "wnwnn", "nwwnn", "nnnww", "wnnwn", "nwnwn",
];

fn itf_modules(digits: &[u8]) -> Vec<bool> {
    let mut modules = Vec::new();
    push_bits(&mut modules, "1010");
    for pair in digits.chunks(2) {
        let bars = ITF_PATTERNS[usize::from(pair[0])].as_bytes();
        let spaces = ITF_PATTERNS[usize::from(pair[1])].as_bytes();
        for k in 0..5 {
            let bar = if bars[k] == b'w' { 3 } else { 1 };
            let space = if spaces[k] == b'w' { 3 } else { 1 };
            modules.extend(std::iter::repeat(true).take(bar));
            modules.extend(std::iter::repeat(false).take(space));
        }
    }
    push_bits(&mut modules, "11101");
    modules
}

/// Interleaved 2 of 5. Needs an even number of digits.
pub fn itf(data: &str) -> Result<LinearSymbol, SymbolError> {
    if !all_digits(data) || data.len() % 2 != 0 {
        return Err(SymbolError::invalid(SymbolFormat::Itf, "needs an even number of digits"));
    }
    let digits: Vec<u8> = data.bytes().map(|b| b - b'0').collect();
    Ok(LinearSymbol {
        modules: itf_modules(&digits),
        text: data.to_string(),
    })
}

/// ITF-14 from 13 digits (check digit computed) or 14 (verified).
pub fn itf14(data: &str) -> Result<LinearSymbol, SymbolError> {
    let digits = with_check_digit(data, 13, SymbolFormat::Itf14)?;
    Ok(LinearSymbol {
        modules: itf_modules(&digits),
        text: digits_text(&digits),
    })
}

/// MSI Plessey check digit scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsiCheck {
    None,
    Mod10,
    Mod11,
    Mod1010,
    Mod1110,
}

fn msi_mod10(number: &str) -> u32 {
    let len = number.len();
    let sum: u32 = number
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let n = u32::from(b - b'0');
            if (i + len) % 2 == 0 {
                n
            } else {
                (n * 2) % 10 + (n * 2) / 10
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

/// Mod 11 check value, 0 to 10. A value of 10 is written as the two digits
/// `1` `0`.
fn msi_mod11(number: &str) -> u32 {
    const WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];
    let sum: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| WEIGHTS[i % WEIGHTS.len()] * u32::from(b - b'0'))
        .sum();
    (11 - sum % 11) % 11
}

/// MSI Plessey with optional check digits.
pub fn msi(data: &str, check: MsiCheck) -> Result<LinearSymbol, SymbolError> {
    if !all_digits(data) {
        return Err(SymbolError::invalid(SymbolFormat::Msi, "only digits are allowed"));
    }
    let mut text = data.to_string();
    match check {
        MsiCheck::None => {}
        MsiCheck::Mod10 => text.push_str(&msi_mod10(&text).to_string()),
        MsiCheck::Mod11 => text.push_str(&msi_mod11(&text).to_string()),
        MsiCheck::Mod1010 => {
            text.push_str(&msi_mod10(&text).to_string());
            text.push_str(&msi_mod10(&text).to_string());
        }
        MsiCheck::Mod1110 => {
            text.push_str(&msi_mod11(&text).to_string());
            text.push_str(&msi_mod10(&text).to_string());
        }
    }

    let mut modules = Vec::new();
    push_bits(&mut modules, "110");
    for b in text.bytes() {
        let n = b - b'0';
        for bit in (0..4).rev() {
            push_bits(&mut modules, if (n >> bit) & 1 == 1 { "110" } else { "100" });
        }
    }
    push_bits(&mut modules, "1001");
    Ok(LinearSymbol { modules, text })
}

/// Pharmacode (one-track), for values 3 to 131070.
pub fn pharmacode(data: &str) -> Result<LinearSymbol, SymbolError> {
    let mut z: u32 = data
        .parse()
        .ok()
        .filter(|n| (3..=131_070).contains(n))
        .ok_or_else(|| SymbolError::invalid(SymbolFormat::Pharmacode, "value must be between 3 and 131070"))?;

    let mut bits = String::new();
    while z != 0 {
        if z % 2 == 0 {
            bits.insert_str(0, "11100");
            z = (z - 2) / 2;
        } else {
            bits.insert_str(0, "100");
            z = (z - 1) / 2;
        }
    }
    bits.truncate(bits.len() - 2);

    let mut modules = Vec::with_capacity(bits.len());
    push_bits(&mut modules, &bits);
    Ok(LinearSymbol {
        modules,
        text: data.to_string(),
    })
}

static CODABAR_PATTERNS: &[(u8, &str)] = &[
    (b'0', "101010011"), (b'1', "101011001"), (b'2', "101001011"), (b'3', "110010101"),
    (b'4', "101101001"), (b'5', "110101001"), (b'6', "100101011"), (b'7', "100101101"),
    (b'8', "100110101"), (b'9', "110100101"), (b'-', "101001101"), (b'$', "101100101"),
    (b':', "1101011011"), (b'/', "1101101011"), (b'.', "1101101101"), (b'+', "1011011011"),
    (b'A', "1011001001"), (b'B', "1001001011"), (b'C', "1010010011"), (b'D', "1010011001"),
];

fn is_codabar_guard(b: u8) -> bool {
    matches!(b, b'A'..=b'D')
}

/// Codabar. Data without start/stop characters is framed with `A`.
pub fn codabar(data: &str) -> Result<LinearSymbol, SymbolError> {
    let mut text = data.to_ascii_uppercase();
    let bytes = text.as_bytes();
    let framed = bytes.len() >= 2 && is_codabar_guard(bytes[0]) && is_codabar_guard(bytes[bytes.len() - 1]);
    if !framed {
        text = format!("A{text}A");
    }

    let mut modules = Vec::new();
    for (i, b) in text.bytes().enumerate() {
        let pattern = CODABAR_PATTERNS
            .iter()
            .find(|(c, _)| *c == b)
            .map(|(_, p)| *p)
            .ok_or_else(|| SymbolError::invalid(SymbolFormat::Codabar, format!("character {:?} not in Codabar", b as char)))?;
        if i != 0 {
            modules.push(false);
        }
        push_bits(&mut modules, pattern);
    }
    Ok(LinearSymbol { modules, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(symbol: &LinearSymbol) -> String {
        symbol.modules.iter().map(|&m| if m { '1' } else { '0' }).collect()
    }

    #[test]
    fn test_code128_pattern_widths() {
        for (i, pattern) in CODE128_PATTERNS.iter().enumerate() {
            let total: u32 = pattern.bytes().map(|b| u32::from(b - b'0')).sum();
            let expected = if i == CODE128_STOP { 13 } else { 11 };
            assert_eq!(total, expected, "pattern {i}");
        }
    }

    #[test]
    fn test_code128_set_selection() {
        assert_eq!(pick_code128_set("123456"), Some(Code128Set::C));
        assert_eq!(pick_code128_set("12345"), Some(Code128Set::B));
        assert_eq!(pick_code128_set("Hello"), Some(Code128Set::B));
        assert_eq!(pick_code128_set("AB\tC"), Some(Code128Set::A));
        assert_eq!(pick_code128_set("é"), None);
    }

    #[test]
    fn test_code128_checksum() {
        let values = code128_values("PJJ123C", Code128Set::B).unwrap();
        assert_eq!(values, vec![48, 42, 42, 17, 18, 19, 35]);
        let sum = values
            .iter()
            .enumerate()
            .fold(104, |acc, (i, v)| acc + v * (i + 1));
        assert_eq!(sum % 103, 55);

        let symbol = code128("PJJ123C", Some(Code128Set::B)).unwrap();
        // start + 7 data + check at 11 modules each, stop at 13
        assert_eq!(symbol.modules.len(), 9 * 11 + 13);
        assert!(bits(&symbol).starts_with("11010010000"));
        assert!(bits(&symbol).ends_with("1100011101011"));
    }

    #[test]
    fn test_code128c_rejects_odd_length() {
        assert!(code128("123", Some(Code128Set::C)).is_err());
        assert!(code128("abc", Some(Code128Set::C)).is_err());
    }

    #[test]
    fn test_code128_shift_for_single_character() {
        let (start, values) = code128_mixed_values("ab\tc").unwrap();
        assert_eq!(start, Code128Set::B);
        assert_eq!(values, vec![65, 66, CODE128_SHIFT, 73, 67]);

        let symbol = code128("ab\tc", None).unwrap();
        // start, five values, checksum and the 13 module stop
        assert_eq!(symbol.modules.len(), 7 * 11 + 13);
        assert_eq!(symbol.text, "ab\tc");
        // 104 + 65 + 2*66 + 3*98 + 4*73 + 5*67 = 1222, 1222 % 103 = 89
        let checksum = &symbol.modules[66..77];
        let mut expected = Vec::new();
        push_widths(&mut expected, CODE128_PATTERNS[89]);
        assert_eq!(checksum, expected.as_slice());
    }

    #[test]
    fn test_code128_switches_for_runs() {
        let (start, values) = code128_mixed_values("\t\nab").unwrap();
        assert_eq!(start, Code128Set::A);
        assert_eq!(values, vec![73, 74, CODE128_TO_B, 65, 66]);

        let (start, values) = code128_mixed_values("xy\r\nz").unwrap();
        assert_eq!(start, Code128Set::B);
        assert_eq!(values, vec![88, 89, CODE128_TO_A, 77, 74, CODE128_TO_B, 90]);

        assert!(code128("ab\u{e9}\t", None).is_err());
    }

    #[test]
    fn test_code39_patterns_have_three_wide_elements() {
        for (c, pattern) in CODE39_PATTERNS {
            assert_eq!(pattern.len(), 9, "{}", *c as char);
            assert_eq!(pattern.bytes().filter(|&e| e == b'w').count(), 3, "{}", *c as char);
        }
    }

    #[test]
    fn test_code39() {
        let symbol = code39("ab-1").unwrap();
        assert_eq!(symbol.text, "AB-1");
        // six characters of 12 modules plus five gaps
        assert_eq!(symbol.modules.len(), 6 * 12 + 5);
        assert!(code39("A*B").is_err());
        assert!(code39("a~").is_err());
    }

    #[test]
    fn test_ean_code_sets() {
        assert_eq!(ean_digit(0, EanSet::L), 0b0001101);
        assert_eq!(ean_digit(0, EanSet::R), 0b1110010);
        assert_eq!(ean_digit(0, EanSet::G), 0b0100111);
        assert_eq!(ean_digit(9, EanSet::G), 0b0010111);
    }

    #[test]
    fn test_ean13() {
        let symbol = ean13("590123412345").unwrap();
        assert_eq!(symbol.text, "5901234123457");
        assert_eq!(symbol.modules.len(), 95);
        let b = bits(&symbol);
        assert!(b.starts_with("101"));
        assert_eq!(&b[45..50], "01010");
        assert!(b.ends_with("101"));

        assert_eq!(ean13("5901234123457").unwrap(), symbol);
        assert!(ean13("5901234123450").is_err());
        assert!(ean13("12345").is_err());
    }

    #[test]
    fn test_ean8_and_upca() {
        let ean = ean8("9638507").unwrap();
        assert_eq!(ean.text, "96385074");
        assert_eq!(ean.modules.len(), 67);

        let upc = upca("03600029145").unwrap();
        assert_eq!(upc.text, "036000291452");
        assert_eq!(upc.modules.len(), 95);
    }

    #[test]
    fn test_itf() {
        let symbol = itf("1234").unwrap();
        let b = bits(&symbol);
        assert!(b.starts_with("1010"));
        assert!(b.ends_with("11101"));
        // each pair is 2 * (3 narrow + 2 wide) elements, wide = 3
        assert_eq!(symbol.modules.len(), 4 + 2 * 18 + 5);
        assert!(itf("123").is_err());

        let itf14 = itf14("1540014128876").unwrap();
        assert_eq!(itf14.text.len(), 14);
    }

    #[test]
    fn test_msi_check_digits() {
        assert_eq!(msi_mod10("1234"), 4);
        assert_eq!(msi("1234", MsiCheck::Mod10).unwrap().text, "12344");
        assert_eq!(msi("1234", MsiCheck::Mod1010).unwrap().text.len(), 6);
        // a Mod 11 value of 10 is written as two digits
        assert_eq!(msi_mod11("6"), 10);
        assert_eq!(msi("6", MsiCheck::Mod11).unwrap().text, "610");
        assert_eq!(msi("1", MsiCheck::Mod11).unwrap().text, "19");
        let plain = msi("1", MsiCheck::None).unwrap();
        assert_eq!(bits(&plain), "1101001001001101001");
    }

    #[test]
    fn test_pharmacode() {
        assert_eq!(bits(&pharmacode("3").unwrap()), "1001");
        assert_eq!(bits(&pharmacode("4").unwrap()), "100111");
        assert!(pharmacode("2").is_err());
        assert!(pharmacode("131071").is_err());
        assert!(pharmacode("abc").is_err());
    }

    #[test]
    fn test_codabar_framing() {
        assert_eq!(codabar("1234").unwrap().text, "A1234A");
        assert_eq!(codabar("b12c").unwrap().text, "B12C");
        assert!(codabar("12x").is_err());
    }
}
