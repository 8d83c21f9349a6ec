use anyhow::Result;

pub fn read_u16(bytes: &[u8]) -> Result<u16> {
    check_len!(bytes.len(), 2);
    Ok((u16::from(bytes[0]) << 8) | u16::from(bytes[1]))
}

pub fn read_u32(bytes: &[u8]) -> Result<u32> {
    check_len!(bytes.len(), 4);
    Ok((u32::from(bytes[0]) << 24)
        | (u32::from(bytes[1]) << 16)
        | (u32::from(bytes[2]) << 8)
        | u32::from(bytes[3]))
}

/// 12 bit length field in the low bits of two bytes.
pub fn read_length(bytes: &[u8]) -> Result<usize> {
    check_len!(bytes.len(), 2);
    Ok((usize::from(bytes[0] & 0xf) << 8) | usize::from(bytes[1]))
}

/// 13 bit PID in the low bits of two bytes.
pub fn read_pid(bytes: &[u8]) -> Result<u16> {
    check_len!(bytes.len(), 2);
    Ok((u16::from(bytes[0] & 0x1f) << 8) | u16::from(bytes[1]))
}
