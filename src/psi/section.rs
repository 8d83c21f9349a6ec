use anyhow::{bail, Result};
use crc::{Crc, CRC_32_MPEG_2};

use crate::util;

const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Header common to every long form section; `body` lies between
/// `last_section_number` and `CRC_32`.
#[derive(Debug)]
pub struct Section<'a> {
    pub table_id: u8,
    pub section_syntax_indicator: bool,
    pub table_id_extension: u16,
    pub version_number: u8,
    pub current_next_indicator: bool,
    pub section_number: u8,
    pub last_section_number: u8,
    pub body: &'a [u8],
    pub crc_32: u32,
}

impl<'a> Section<'a> {
    pub fn parse(bytes: &'a [u8], verify_crc: bool) -> Result<Section<'a>> {
        check_len!(bytes.len(), 3);
        let table_id = bytes[0];
        let section_syntax_indicator = bytes[1] & 0x80 > 0;
        let section_length = util::read_length(&bytes[1..])?;
        if !section_syntax_indicator {
            bail!("table_id {:#04x}: short form section", table_id);
        }
        // table_id_extension .. last_section_number and CRC_32
        check_len!(section_length, 5 + 4);
        check_len!(bytes.len(), 3 + section_length);
        let bytes = &bytes[..3 + section_length];

        let crc_32 = util::read_u32(&bytes[3 + section_length - 4..])?;
        if verify_crc {
            let calculated = CRC.checksum(&bytes[..3 + section_length - 4]);
            if calculated != crc_32 {
                bail!(
                    "table_id {:#04x}: crc mismatch {:#010x} != {:#010x}",
                    table_id,
                    calculated,
                    crc_32
                );
            }
        }

        Ok(Section {
            table_id,
            section_syntax_indicator,
            table_id_extension: util::read_u16(&bytes[3..])?,
            version_number: (bytes[5] & 0x3e) >> 1,
            current_next_indicator: bytes[5] & 1 > 0,
            section_number: bytes[6],
            last_section_number: bytes[7],
            body: &bytes[8..3 + section_length - 4],
            crc_32,
        })
    }
}

pub fn crc32(bytes: &[u8]) -> u32 {
    CRC.checksum(bytes)
}
