//! ATSC multiple string structure.

use anyhow::{bail, Result};
use log::debug;

const NO_COMPRESSION: u8 = 0x00;
const MODE_UTF16: u8 = 0x3f;
const MAX_PAGE_MODE: u8 = 0x33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageString {
    pub iso_639_language_code: String,
    pub text: String,
}

pub fn parse(bytes: &[u8]) -> Result<Vec<LanguageString>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let number_strings = usize::from(bytes[0]);
    let mut bytes = &bytes[1..];
    let mut strings = Vec::with_capacity(number_strings);
    for _ in 0..number_strings {
        check_len!(bytes.len(), 4);
        let iso_639_language_code = String::from_utf8_lossy(&bytes[..3]).into_owned();
        let number_segments = usize::from(bytes[3]);
        bytes = &bytes[4..];
        let mut text = String::new();
        for _ in 0..number_segments {
            check_len!(bytes.len(), 3);
            let compression_type = bytes[0];
            let mode = bytes[1];
            let number_bytes = usize::from(bytes[2]);
            check_len!(bytes.len(), 3 + number_bytes);
            decode_segment(compression_type, mode, &bytes[3..3 + number_bytes], &mut text)?;
            bytes = &bytes[3 + number_bytes..];
        }
        strings.push(LanguageString {
            iso_639_language_code,
            text,
        });
    }
    Ok(strings)
}

/// Text of the first non empty string, whatever its language.
pub fn first_text(bytes: &[u8]) -> Result<Option<String>> {
    Ok(parse(bytes)?
        .into_iter()
        .map(|s| s.text)
        .find(|text| !text.is_empty()))
}

fn decode_segment(compression_type: u8, mode: u8, bytes: &[u8], out: &mut String) -> Result<()> {
    if compression_type != NO_COMPRESSION {
        debug!(
            "skip compressed segment, compression_type={:#04x}",
            compression_type
        );
        return Ok(());
    }
    match mode {
        0x00..=MAX_PAGE_MODE => {
            for &b in bytes {
                let code_point = (u32::from(mode) << 8) | u32::from(b);
                match char::from_u32(code_point) {
                    Some(c) => out.push(c),
                    None => bail!("invalid code point {:#06x}", code_point),
                }
            }
        }
        MODE_UTF16 => {
            if bytes.len() % 2 != 0 {
                debug!("odd utf-16 segment length {}, last byte dropped", bytes.len());
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| (u16::from(c[0]) << 8) | u16::from(c[1]))
                .collect();
            out.push_str(&String::from_utf16_lossy(&units));
        }
        _ => debug!("skip segment in unsupported mode {:#04x}", mode),
    }
    Ok(())
}
