use anyhow::Result;
use serde_derive::Serialize;

use crate::psi::{Descriptor, Section};
use crate::util;

const CHANNEL_LENGTH: usize = 32;
const SHORT_NAME_LENGTH: usize = 14;

/// A virtual channel of a terrestrial or cable VCT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VctItem {
    pub short_name: String,
    pub long_name: Option<String>,
    pub major_channel_number: u16,
    pub minor_channel_number: u16,
    pub channel_tsid: u16,
    pub program_number: u16,
    pub hidden: bool,
    pub service_type: u8,
    pub source_id: u16,
    /// Channel text from the ETT, filled in while correlating.
    pub description: Option<String>,
}

fn parse_short_name(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| (u16::from(c[0]) << 8) | u16::from(c[1]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units).trim_end().to_string()
}

impl VctItem {
    fn parse(bytes: &[u8]) -> Result<(VctItem, usize)> {
        check_len!(bytes.len(), CHANNEL_LENGTH);
        let descriptors_length = usize::from(bytes[30] & 0x03) << 8 | usize::from(bytes[31]);
        check_len!(bytes.len(), CHANNEL_LENGTH + descriptors_length);
        let mut long_name = None;
        for descriptor in
            Descriptor::parse_loop(&bytes[CHANNEL_LENGTH..CHANNEL_LENGTH + descriptors_length])?
        {
            if let Descriptor::ExtendedChannelName(name) = descriptor {
                long_name = name;
            }
        }
        let item = VctItem {
            short_name: parse_short_name(&bytes[..SHORT_NAME_LENGTH]),
            long_name,
            major_channel_number: (u16::from(bytes[14] & 0x0f) << 6) | u16::from(bytes[15] >> 2),
            minor_channel_number: (u16::from(bytes[15] & 0x03) << 8) | u16::from(bytes[16]),
            channel_tsid: util::read_u16(&bytes[22..])?,
            program_number: util::read_u16(&bytes[24..])?,
            hidden: bytes[26] & 0x10 > 0,
            service_type: bytes[27] & 0x3f,
            source_id: util::read_u16(&bytes[28..])?,
            description: None,
        };
        Ok((item, CHANNEL_LENGTH + descriptors_length))
    }
}

/// Terrestrial and cable VCTs share the channel layout.
pub fn parse_vct(section: &Section) -> Result<Vec<VctItem>> {
    // protocol_version, num_channels_in_section
    check_len!(section.body.len(), 2);
    let num_channels_in_section = usize::from(section.body[1]);
    let mut bytes = &section.body[2..];
    let mut items = Vec::with_capacity(num_channels_in_section);
    for _ in 0..num_channels_in_section {
        let (item, n) = VctItem::parse(bytes)?;
        items.push(item);
        bytes = &bytes[n..];
    }
    Ok(items)
}
