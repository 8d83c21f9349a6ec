use anyhow::Result;
use serde_derive::Serialize;

use crate::psi::{Descriptor, Section};
use crate::util;

pub const CHANNEL_ETT: u16 = 0x0004;
pub const EIT_TABLE_TYPES: std::ops::RangeInclusive<u16> = 0x0100..=0x017f;
pub const EVENT_ETT_TABLE_TYPES: std::ops::RangeInclusive<u16> = 0x0200..=0x027f;

/// One table announced by the master guide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MgtItem {
    pub table_type: u16,
    pub table_type_pid: u16,
    pub table_type_version_number: u8,
    pub number_bytes: u32,
}

impl MgtItem {
    pub fn is_eit(&self) -> bool {
        EIT_TABLE_TYPES.contains(&self.table_type)
    }

    pub fn is_ett(&self) -> bool {
        self.table_type == CHANNEL_ETT || EVENT_ETT_TABLE_TYPES.contains(&self.table_type)
    }

    /// k of an EIT-k.
    pub fn eit_slot(&self) -> Option<u16> {
        self.is_eit()
            .then(|| self.table_type - EIT_TABLE_TYPES.start())
    }

    /// k of an event ETT-k. None for the channel ETT.
    pub fn event_ett_slot(&self) -> Option<u16> {
        EVENT_ETT_TABLE_TYPES
            .contains(&self.table_type)
            .then(|| self.table_type - EVENT_ETT_TABLE_TYPES.start())
    }
}

pub fn parse_mgt(section: &Section) -> Result<Vec<MgtItem>> {
    // protocol_version, tables_defined
    check_len!(section.body.len(), 3);
    let tables_defined = usize::from(util::read_u16(&section.body[1..])?);
    let mut bytes = &section.body[3..];
    let mut items = Vec::with_capacity(tables_defined);
    for _ in 0..tables_defined {
        check_len!(bytes.len(), 11);
        let table_type_descriptors_length = util::read_length(&bytes[9..])?;
        check_len!(bytes.len(), 11 + table_type_descriptors_length);
        Descriptor::parse_loop(&bytes[11..11 + table_type_descriptors_length])?;
        items.push(MgtItem {
            table_type: util::read_u16(bytes)?,
            table_type_pid: util::read_pid(&bytes[2..])?,
            table_type_version_number: bytes[4] & 0x1f,
            number_bytes: util::read_u32(&bytes[5..])?,
        });
        bytes = &bytes[11 + table_type_descriptors_length..];
    }
    Ok(items)
}
