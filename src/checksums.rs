//! Table-driven CRC checksums.
//!
//! Tables are built at compile time. Check values (input `"123456789"`):
//! CRC-32 `0xCBF43926`, CRC-64/XZ `0x995DC9BBDF1939FA`,
//! CRC-16/CCITT-FALSE `0x29B1`, CRC-16/ARC `0xBB3D`.

const CRC32_POLY: u32 = 0xEDB8_8320;
const CRC64_POLY: u64 = 0xC96C_5795_D787_0F42;
const CRC16_CCITT_POLY: u16 = 0x1021;
const CRC16_ARC_POLY: u16 = 0xA001;

const fn reflected_table_32(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation)]
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn reflected_table_64(poly: u64) -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u64;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn reflected_table_16(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation)]
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn msb_table_16(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation)]
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ poly } else { crc << 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = reflected_table_32(CRC32_POLY);
static CRC64_TABLE: [u64; 256] = reflected_table_64(CRC64_POLY);
static CRC16_CCITT_TABLE: [u16; 256] = msb_table_16(CRC16_CCITT_POLY);
static CRC16_ARC_TABLE: [u16; 256] = reflected_table_16(CRC16_ARC_POLY);

/// Reflected CRC-32. Returns `crc ^ mask`.
#[must_use]
pub fn crc32(data: &[u8], mask: u32, seed: u32) -> u32 {
    let crc = data.iter().fold(seed, |crc, &b| {
        CRC32_TABLE[usize::from((crc as u8) ^ b)] ^ (crc >> 8)
    });
    crc ^ mask
}

/// Standard CRC-32 (zlib/PNG).
#[must_use]
pub fn crc32_default(data: &[u8]) -> u32 {
    crc32(data, u32::MAX, u32::MAX)
}

/// Reflected CRC-64 with the ECMA polynomial. Returns `crc ^ mask`.
#[must_use]
pub fn crc64(data: &[u8], mask: u64, seed: u64) -> u64 {
    let crc = data.iter().fold(seed, |crc, &b| {
        CRC64_TABLE[usize::from((crc as u8) ^ b)] ^ (crc >> 8)
    });
    crc ^ mask
}

/// CRC-64/XZ.
#[must_use]
pub fn crc64_default(data: &[u8]) -> u64 {
    crc64(data, u64::MAX, u64::MAX)
}

/// MSB-first CRC-16 with polynomial `0x1021`.
#[must_use]
pub fn crc16_ccitt(data: &[u8], seed: u16, final_xor: u16) -> u16 {
    let crc = data.iter().fold(seed, |crc, &b| {
        CRC16_CCITT_TABLE[usize::from((crc >> 8) as u8 ^ b)] ^ (crc << 8)
    });
    crc ^ final_xor
}

/// CRC-16/CCITT-FALSE (seed `0xFFFF`, no final xor).
#[must_use]
pub fn crc16_ccitt_default(data: &[u8]) -> u16 {
    crc16_ccitt(data, 0xFFFF, 0)
}

/// CRC-16/ARC.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &b| {
        CRC16_ARC_TABLE[usize::from((crc as u8) ^ b)] ^ (crc >> 8)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32_default(CHECK), 0xCBF4_3926);
        assert_eq!(crc32_default(&[]), 0);
    }

    #[test]
    fn test_crc32_mask_and_seed() {
        let raw = crc32(CHECK, 0, u32::MAX);
        assert_eq!(raw ^ u32::MAX, 0xCBF4_3926);
    }

    #[test]
    fn test_crc64_check_value() {
        assert_eq!(crc64_default(CHECK), 0x995D_C9BB_DF19_39FA);
    }

    #[test]
    fn test_crc16_ccitt_check_value() {
        assert_eq!(crc16_ccitt_default(CHECK), 0x29B1);
    }

    #[test]
    fn test_crc16_arc_check_value() {
        assert_eq!(crc16(CHECK), 0xBB3D);
    }
}
