use anyhow::{bail, Result};
use log::trace;

mod buffer;
pub use self::buffer::*;

mod section;
pub use self::section::*;

mod pat;
pub use self::pat::*;

mod pmt;
pub use self::pmt::*;

mod descriptor;
pub use self::descriptor::*;

use crate::psip::{self, EitItem, EttItem, MgtItem, SttItem, VctItem};

pub const PROGRAM_ASSOCIATION_SECTION: u8 = 0x00;
pub const TS_PROGRAM_MAP_SECTION: u8 = 0x02;

/// A decoded section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    Pat(Vec<PatItem>),
    Pmt {
        program_number: u16,
        items: Vec<PmtItem>,
    },
    Mgt(Vec<MgtItem>),
    Vct(Vec<VctItem>),
    Eit {
        source_id: u16,
        items: Vec<EitItem>,
    },
    Ett {
        source_id: u16,
        items: Vec<EttItem>,
    },
    Stt(SttItem),
}

/// Decodes one complete section. Sections that are not yet applicable
/// (current_next_indicator 0) are reported as errors like any other
/// section this parser cannot use.
pub fn parse_section(bytes: &[u8], verify_crc: bool) -> Result<Table> {
    let section = Section::parse(bytes, verify_crc)?;
    if !section.current_next_indicator {
        bail!("table_id {:#04x}: not applicable yet", section.table_id);
    }
    trace!(
        "table_id={:#04x} extension={:#06x} version={} section={}/{}",
        section.table_id,
        section.table_id_extension,
        section.version_number,
        section.section_number,
        section.last_section_number
    );
    let table = match section.table_id {
        PROGRAM_ASSOCIATION_SECTION => Table::Pat(parse_pat(&section)?),
        TS_PROGRAM_MAP_SECTION => {
            let (program_number, items) = parse_pmt(&section)?;
            Table::Pmt {
                program_number,
                items,
            }
        }
        psip::MASTER_GUIDE_TABLE => Table::Mgt(psip::parse_mgt(&section)?),
        psip::TERRESTRIAL_VIRTUAL_CHANNEL_TABLE | psip::CABLE_VIRTUAL_CHANNEL_TABLE => {
            Table::Vct(psip::parse_vct(&section)?)
        }
        psip::EVENT_INFORMATION_TABLE => {
            let (source_id, items) = psip::parse_eit(&section)?;
            Table::Eit { source_id, items }
        }
        psip::EXTENDED_TEXT_TABLE => {
            let (source_id, items) = psip::parse_ett(&section)?;
            Table::Ett { source_id, items }
        }
        psip::SYSTEM_TIME_TABLE => Table::Stt(psip::parse_stt(&section)?),
        table_id => bail!("unknown table_id {:#04x}", table_id),
    };
    Ok(table)
}
