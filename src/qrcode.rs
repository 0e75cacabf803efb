//! QR code encoding.
//!
//! Encodes text or bytes into a QR Code Model 2 symbol: versions 1 to 40, the
//! four error correction levels, and numeric, alphanumeric and byte segments.
//! The result is an owned square grid of dark and light modules that the
//! renderers and the advanced composition pipeline draw from.

use std::str::FromStr;

use thiserror::Error;

/// A QR Code symbol, a square grid of dark and light modules.
///
/// Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use barforge::qrcode::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// assert_eq!(qr.size(), 21);
/// assert!(qr.get_module(0, 0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,
    /// Width and height in modules, `version * 4 + 17`.
    size: i32,
    ecl: QrCodeEcc,
    mask: Mask,
    /// Row-major, `true` is dark.
    modules: Vec<bool>,
    /// Marks function modules so masking skips them. Emptied once encoding ends.
    is_function: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string, picking the most compact segment mode and the
    /// smallest version that fits. The error correction level may be raised
    /// when that does not grow the symbol.
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self, DataTooLong> {
        let segs = QrSegment::make_segments(text);
        Self::encode_segments(&segs, ecl, Version::MIN, Version::MAX, None, true)
    }

    /// Encodes arbitrary bytes in byte mode.
    pub fn encode_binary(data: &[u8], ecl: QrCodeEcc) -> Result<Self, DataTooLong> {
        let segs = [QrSegment::make_bytes(data)];
        Self::encode_segments(&segs, ecl, Version::MIN, Version::MAX, None, true)
    }

    /// Encodes the given segments.
    ///
    /// The smallest version within `minversion..=maxversion` that holds the data
    /// is chosen. With `boostecl` the level may be higher than `ecl` if it fits
    /// the same version. `mask` of `None` selects the mask with the lowest penalty.
    pub fn encode_segments(
        segs: &[QrSegment],
        mut ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<Self, DataTooLong> {
        debug_assert!(minversion <= maxversion);

        let mut version = minversion;
        let datausedbits = loop {
            let capacity = Self::num_data_codewords(version, ecl) * 8;
            let used = QrSegment::total_bits(segs, version);
            match used {
                Some(n) if n <= capacity => break n,
                _ if version >= maxversion => {
                    return Err(match used {
                        None => DataTooLong::SegmentTooLong,
                        Some(n) => DataTooLong::DataOverCapacity(n, capacity),
                    });
                }
                _ => version = Version::new(version.value() + 1),
            }
        };

        for newecl in [QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            if boostecl && datausedbits <= Self::num_data_codewords(version, newecl) * 8 {
                ecl = newecl;
            }
        }

        let mut bb = BitBuffer::default();
        for seg in segs {
            bb.append_bits(seg.mode.mode_bits(), 4);
            bb.append_bits(seg.numchars as u32, seg.mode.num_char_count_bits(version));
            bb.0.extend_from_slice(&seg.data);
        }
        debug_assert_eq!(bb.0.len(), datausedbits);

        // Terminator, then pad to a byte boundary
        let capacity = Self::num_data_codewords(version, ecl) * 8;
        let terminator = (capacity - bb.0.len()).min(4);
        bb.append_bits(0, terminator as u8);
        let padding = bb.0.len().wrapping_neg() & 7;
        bb.append_bits(0, padding as u8);

        for &pad in [0xEC, 0x11].iter().cycle() {
            if bb.0.len() >= capacity {
                break;
            }
            bb.append_bits(pad, 8);
        }

        let mut codewords = vec![0u8; bb.0.len() / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            codewords[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }
        Ok(Self::encode_codewords(version, ecl, &codewords, mask))
    }

    /// Builds the symbol from finished data codewords.
    pub fn encode_codewords(version: Version, ecl: QrCodeEcc, data: &[u8], mask: Option<Mask>) -> Self {
        let size = i32::from(version.value()) * 4 + 17;
        let cells = (size * size) as usize;
        let mut qr = Self {
            version,
            size,
            ecl,
            mask: Mask::new(0),
            modules: vec![false; cells],
            is_function: vec![false; cells],
        };

        qr.draw_function_patterns();
        let allcodewords = qr.add_ecc_and_interleave(data);
        qr.draw_codewords(&allcodewords);

        let mask = match mask {
            Some(mask) => mask,
            None => qr.best_mask(),
        };
        qr.mask = mask;
        qr.apply_mask(mask);
        qr.draw_format_bits(mask);
        qr.is_function = Vec::new();
        qr
    }

    /// Version, 1 to 40.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length in modules, 21 to 177.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Error correction level actually used, which may be higher than requested.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    /// Mask pattern, 0 to 7.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Color of the module at `(x, y)`; `true` is dark. Out of range is light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        (0..self.size).contains(&x) && (0..self.size).contains(&y) && self.module(x, y)
    }

    fn module(&self, x: i32, y: i32) -> bool {
        self.modules[(y * self.size + x) as usize]
    }

    fn module_mut(&mut self, x: i32, y: i32) -> &mut bool {
        &mut self.modules[(y * self.size + x) as usize]
    }

    fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
        *self.module_mut(x, y) = isdark;
        self.is_function[(y * self.size + x) as usize] = true;
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;
        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Alignment patterns, skipping the three finder corners
        let positions = self.alignment_pattern_positions();
        let last = positions.len().saturating_sub(1);
        for (i, &x) in positions.iter().enumerate() {
            for (j, &y) in positions.iter().enumerate() {
                let corner = (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
                if !corner {
                    self.draw_alignment_pattern(x, y);
                }
            }
        }

        // Placeholder format bits reserve the area; real ones are drawn after masking
        self.draw_format_bits(Mask::new(0));
        self.draw_version();
    }

    fn draw_format_bits(&mut self, mask: Mask) {
        let bits: u32 = {
            let data = u32::from((self.ecl.format_bits() << 3) | mask.value());
            let mut rem = data;
            for _ in 0..10 {
                rem = (rem << 1) ^ ((rem >> 9) * 0x537);
            }
            ((data << 10) | rem) ^ 0x5412
        };

        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i));
        }

        let size = self.size;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i));
        }
        self.set_function_module(8, size - 8, true);
    }

    fn draw_version(&mut self) {
        let ver = u32::from(self.version.value());
        if ver < 7 {
            return;
        }
        let bits: u32 = {
            let mut rem = ver;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
            }
            (ver << 12) | rem
        };
        for i in 0..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4..=4 {
            for dx in -4..=4 {
                let (xx, yy) = (x + dx, y + dy);
                if (0..self.size).contains(&xx) && (0..self.size).contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn add_ecc_and_interleave(&self, data: &[u8]) -> Vec<u8> {
        let (ver, ecl) = (self.version, self.ecl);
        debug_assert_eq!(data.len(), Self::num_data_codewords(ver, ecl));

        let numblocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let blockecclen = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let rawcodewords = Self::num_raw_data_modules(ver) / 8;
        let numshortblocks = numblocks - rawcodewords % numblocks;
        let shortblocklen = rawcodewords / numblocks;

        let divisor = reed_solomon_divisor(blockecclen);
        let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
        let mut offset = 0;
        for i in 0..numblocks {
            let datlen = shortblocklen - blockecclen + usize::from(i >= numshortblocks);
            let mut block = data[offset..offset + datlen].to_vec();
            offset += datlen;
            let ecc = reed_solomon_remainder(&block, &divisor);
            if i < numshortblocks {
                block.push(0);
            }
            block.extend_from_slice(&ecc);
            blocks.push(block);
        }

        let mut result = Vec::with_capacity(rawcodewords);
        for i in 0..=shortblocklen {
            for (j, block) in blocks.iter().enumerate() {
                // Skip the padding byte of short blocks
                if i != shortblocklen - blockecclen || j >= numshortblocks {
                    result.push(block[i]);
                }
            }
        }
        result
    }

    fn draw_codewords(&mut self, data: &[u8]) {
        debug_assert_eq!(data.len(), Self::num_raw_data_modules(self.version) / 8);
        let total_bits = data.len() * 8;
        let mut i = 0usize;
        let mut right = self.size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..self.size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = (right + 1) & 2 == 0;
                    let y = if upward { self.size - 1 - vert } else { vert };
                    let index = (y * self.size + x) as usize;
                    if !self.is_function[index] && i < total_bits {
                        self.modules[index] = get_bit(u32::from(data[i >> 3]), 7 - (i & 7) as i32);
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, total_bits);
    }

    /// XORs the mask pattern over every non-function module. Applying twice undoes it.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let index = (y * self.size + x) as usize;
                if self.is_function[index] {
                    continue;
                }
                let invert = match mask.value() {
                    0 => (x + y) % 2 == 0,
                    1 => y % 2 == 0,
                    2 => x % 3 == 0,
                    3 => (x + y) % 3 == 0,
                    4 => (x / 3 + y / 2) % 2 == 0,
                    5 => x * y % 2 + x * y % 3 == 0,
                    6 => (x * y % 2 + x * y % 3) % 2 == 0,
                    _ => ((x + y) % 2 + x * y % 3) % 2 == 0,
                };
                self.modules[index] ^= invert;
            }
        }
    }

    fn best_mask(&mut self) -> Mask {
        let mut best = Mask::new(0);
        let mut minpenalty = i32::MAX;
        for i in 0..8 {
            let mask = Mask::new(i);
            self.apply_mask(mask);
            self.draw_format_bits(mask);
            let penalty = self.penalty_score();
            if penalty < minpenalty {
                best = mask;
                minpenalty = penalty;
            }
            self.apply_mask(mask);
        }
        best
    }

    fn penalty_score(&self) -> i32 {
        let mut result = 0;
        let size = self.size;

        // Runs and finder-like patterns, rows then columns
        for horizontal in [true, false] {
            for a in 0..size {
                let mut runcolor = false;
                let mut runlen = 0;
                let mut history = FinderPenalty::new(size);
                for b in 0..size {
                    let color = if horizontal { self.module(b, a) } else { self.module(a, b) };
                    if color == runcolor {
                        runlen += 1;
                        if runlen == 5 {
                            result += PENALTY_N1;
                        } else if runlen > 5 {
                            result += 1;
                        }
                    } else {
                        history.add_history(runlen);
                        if !runcolor {
                            result += history.count_patterns() * PENALTY_N3;
                        }
                        runcolor = color;
                        runlen = 1;
                    }
                }
                result += history.terminate_and_count(runcolor, runlen) * PENALTY_N3;
            }
        }

        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        let dark = self.modules.iter().filter(|&&m| m).count() as i32;
        let total = size * size;
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result + k * PENALTY_N4
    }

    fn alignment_pattern_positions(&self) -> Vec<i32> {
        let ver = i32::from(self.version.value());
        if ver == 1 {
            return Vec::new();
        }
        let numalign = ver / 7 + 2;
        let step = if ver == 32 {
            26
        } else {
            (ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
        };
        let mut result: Vec<i32> = (0..numalign - 1).map(|i| self.size - 7 - i * step).collect();
        result.push(6);
        result.reverse();
        result
    }

    fn num_raw_data_modules(ver: Version) -> usize {
        let ver = usize::from(ver.value());
        let mut result = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    fn num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
        Self::num_raw_data_modules(ver) / 8
            - table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl) * table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
    }
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

fn reed_solomon_divisor(degree: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&degree));
    let mut result = vec![0u8; degree - 1];
    result.push(1);
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = reed_solomon_multiply(result[j], root);
            if j + 1 < result.len() {
                result[j] ^= result[j + 1];
            }
        }
        root = reed_solomon_multiply(root, 0x02);
    }
    result
}

fn reed_solomon_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for b in data {
        let factor = b ^ result.remove(0);
        result.push(0);
        for (x, &y) in result.iter_mut().zip(divisor.iter()) {
            *x ^= reed_solomon_multiply(y, factor);
        }
    }
    result
}

fn reed_solomon_multiply(x: u8, y: u8) -> u8 {
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1D);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            qr_size: size,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // light border before the first run
        }
        self.run_history.copy_within(0..6, 1);
        self.run_history[0] = currentrunlength;
    }

    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n) + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

/// Error correction level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    fn ordinal(self) -> usize {
        match self {
            QrCodeEcc::Low => 0,
            QrCodeEcc::Medium => 1,
            QrCodeEcc::Quartile => 2,
            QrCodeEcc::High => 3,
        }
    }

    fn format_bits(self) -> u8 {
        match self {
            QrCodeEcc::Low => 1,
            QrCodeEcc::Medium => 0,
            QrCodeEcc::Quartile => 3,
            QrCodeEcc::High => 2,
        }
    }

    /// Single letter name (`L`, `M`, `Q`, `H`).
    pub fn as_letter(self) -> char {
        ['L', 'M', 'Q', 'H'][self.ordinal()]
    }
}

impl FromStr for QrCodeEcc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(QrCodeEcc::Low),
            "M" | "MEDIUM" => Ok(QrCodeEcc::Medium),
            "Q" | "QUARTILE" => Ok(QrCodeEcc::Quartile),
            "H" | "HIGH" => Ok(QrCodeEcc::High),
            _ => Err(format!("unknown error correction level '{s}'")),
        }
    }
}

/// A segment of data in one encoding mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: Vec<bool>,
}

impl QrSegment {
    /// Byte mode segment.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Self {
            mode: QrSegmentMode::Byte,
            numchars: data.len(),
            data: bb.0,
        }
    }

    /// Numeric mode segment. `text` must contain only ASCII digits.
    pub fn make_numeric(text: &str) -> Self {
        let mut bb = BitBuffer::default();
        for chunk in text.as_bytes().chunks(3) {
            let value = chunk.iter().fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
            bb.append_bits(value, chunk.len() as u8 * 3 + 1);
        }
        Self {
            mode: QrSegmentMode::Numeric,
            numchars: text.len(),
            data: bb.0,
        }
    }

    /// Alphanumeric mode segment. `text` must satisfy [`QrSegment::is_alphanumeric`].
    pub fn make_alphanumeric(text: &str) -> Self {
        let mut bb = BitBuffer::default();
        let values: Vec<u32> = text
            .chars()
            .filter_map(|c| ALPHANUMERIC_CHARSET.find(c))
            .map(|i| i as u32)
            .collect();
        for pair in values.chunks(2) {
            match pair {
                [a, b] => bb.append_bits(a * 45 + b, 11),
                [a] => bb.append_bits(*a, 6),
                _ => {}
            }
        }
        Self {
            mode: QrSegmentMode::Alphanumeric,
            numchars: values.len(),
            data: bb.0,
        }
    }

    /// One segment in the most compact mode that can hold all of `text`.
    pub fn make_segments(text: &str) -> Vec<Self> {
        if text.is_empty() {
            Vec::new()
        } else if Self::is_numeric(text) {
            vec![Self::make_numeric(text)]
        } else if Self::is_alphanumeric(text) {
            vec![Self::make_alphanumeric(text)]
        } else {
            vec![Self::make_bytes(text.as_bytes())]
        }
    }

    /// Mode of this segment.
    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    /// Number of characters (bytes for byte mode).
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    fn total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits = seg.mode.num_char_count_bits(version);
            if seg.numchars >= 1usize << ccbits {
                return None;
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    /// `true` if `text` only contains ASCII digits.
    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    /// `true` if `text` fits the 45 character alphanumeric set.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Segment encoding mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QrSegmentMode {
    /// Digits, 3 per 10 bits
    Numeric,
    /// Uppercase alphanumerics, 2 per 11 bits
    Alphanumeric,
    /// Raw bytes
    Byte,
}

impl QrSegmentMode {
    fn mode_bits(self) -> u32 {
        match self {
            QrSegmentMode::Numeric => 0x1,
            QrSegmentMode::Alphanumeric => 0x2,
            QrSegmentMode::Byte => 0x4,
        }
    }

    fn num_char_count_bits(self, ver: Version) -> u8 {
        let widths = match self {
            QrSegmentMode::Numeric => [10, 12, 14],
            QrSegmentMode::Alphanumeric => [9, 11, 13],
            QrSegmentMode::Byte => [8, 16, 16],
        };
        widths[usize::from((ver.value() + 7) / 17)]
    }
}

#[derive(Default)]
struct BitBuffer(Vec<bool>);

impl BitBuffer {
    fn append_bits(&mut self, val: u32, len: u8) {
        debug_assert!(len <= 31 && val >> len == 0);
        self.0.extend((0..i32::from(len)).rev().map(|i| get_bit(val, i)));
    }
}

/// The data does not fit any version in the requested range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataTooLong {
    /// A segment's character count overflows its length field.
    #[error("segment too long")]
    SegmentTooLong,
    /// Encoded bits exceed the capacity of the largest allowed version.
    #[error("data length = {0} bits, max capacity = {1} bits")]
    DataOverCapacity(usize, usize),
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// Smallest version.
    pub const MIN: Version = Version(1);
    /// Largest version.
    pub const MAX: Version = Version(40);

    /// # Panics
    ///
    /// Panics if `ver` is outside 1 to 40.
    pub const fn new(ver: u8) -> Self {
        assert!(Version::MIN.value() <= ver && ver <= Version::MAX.value(), "Version number out of range");
        Self(ver)
    }

    /// Value in the range 1 to 40.
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// # Panics
    ///
    /// Panics if `mask` is above 7.
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Value in the range 0 to 7.
    pub const fn value(self) -> u8 {
        self.0
    }
}

fn get_bit(x: u32, i: i32) -> bool {
    (x >> i) & 1 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(QrSegment::is_numeric("1234567890"));
        assert!(!QrSegment::is_numeric("1234abc"));
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(QrSegment::is_alphanumeric("HELLO WORLD"));
        assert!(!QrSegment::is_alphanumeric("Hello World"));
    }

    #[test]
    fn test_segment_modes() {
        assert_eq!(QrSegment::make_segments("0123")[0].mode(), QrSegmentMode::Numeric);
        assert_eq!(QrSegment::make_segments("ABC $")[0].mode(), QrSegmentMode::Alphanumeric);
        assert_eq!(QrSegment::make_segments("abc")[0].mode(), QrSegmentMode::Byte);
        assert!(QrSegment::make_segments("").is_empty());
        // 3 + 3 + 1 digits: 10 + 10 + 4 bits
        assert_eq!(QrSegment::make_numeric("0123456").data.len(), 24);
        // two pairs and a single: 11 + 11 + 6 bits
        assert_eq!(QrSegment::make_alphanumeric("AB CD").data.len(), 28);
    }

    #[test]
    fn test_small_text_is_version_one() {
        let qr = QrCode::encode_text("Hello, world!", QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version(), Version::new(1));
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn test_function_patterns() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Quartile).unwrap();
        let size = qr.size();
        // Finder corners and their separators
        for (x, y) in [(0, 0), (size - 1, 0), (0, size - 1), (3, 3)] {
            assert!(qr.get_module(x, y), "({x}, {y})");
        }
        assert!(!qr.get_module(1, 1));
        assert!(!qr.get_module(7, 7));
        // Timing pattern and the always dark module
        assert!(qr.get_module(6, 8));
        assert!(!qr.get_module(6, 9));
        assert!(qr.get_module(8, size - 8));
        // Outside is light
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(size, 0));
    }

    #[test]
    fn test_version_grows_with_data() {
        let text = "a".repeat(100);
        let qr = QrCode::encode_text(&text, QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version(), Version::new(5));
        assert_eq!(qr.size(), 37);
    }

    #[test]
    fn test_error_correction_is_boosted() {
        let qr = QrCode::encode_text("1", QrCodeEcc::Low).unwrap();
        assert_eq!(qr.error_correction_level(), QrCodeEcc::High);
        assert_eq!(qr.version(), Version::new(1));
    }

    #[test]
    fn test_data_too_long() {
        let text = "x".repeat(3000);
        let err = QrCode::encode_text(&text, QrCodeEcc::High).unwrap_err();
        assert!(matches!(err, DataTooLong::DataOverCapacity(_, _)));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = QrCode::encode_text("https://example.com", QrCodeEcc::Medium).unwrap();
        let b = QrCode::encode_text("https://example.com", QrCodeEcc::Medium).unwrap();
        assert_eq!(a, b);
        assert!(a.mask().value() <= 7);
    }

    #[test]
    fn test_large_version_draws_version_info() {
        let text = "9".repeat(500);
        let qr = QrCode::encode_text(&text, QrCodeEcc::Medium).unwrap();
        assert!(qr.version().value() >= 7);
        assert_eq!(qr.size(), i32::from(qr.version().value()) * 4 + 17);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!("h".parse::<QrCodeEcc>(), Ok(QrCodeEcc::High));
        assert_eq!("Quartile".parse::<QrCodeEcc>(), Ok(QrCodeEcc::Quartile));
        assert!("X".parse::<QrCodeEcc>().is_err());
        assert_eq!(QrCodeEcc::default().as_letter(), 'M');
    }
}
