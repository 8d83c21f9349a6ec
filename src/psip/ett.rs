use anyhow::Result;
use serde_derive::Serialize;

use crate::psi::Section;
use crate::psip::string;
use crate::util;

/// Extended text; `event_id` 0 describes the channel itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EttItem {
    pub event_id: u16,
    pub text: String,
}

impl EttItem {
    pub fn is_channel_description(&self) -> bool {
        self.event_id == 0
    }
}

/// Returns the source id named by the ETM_id and the text it carries.
pub fn parse_ett(section: &Section) -> Result<(u16, Vec<EttItem>)> {
    // protocol_version, ETM_id
    check_len!(section.body.len(), 5);
    let etm_id = util::read_u32(&section.body[1..])?;
    let source_id = (etm_id >> 16) as u16;
    let event_id = ((etm_id >> 2) & 0x3fff) as u16;
    let items = string::first_text(&section.body[5..])?
        .map(|text| EttItem { event_id, text })
        .into_iter()
        .collect();
    Ok((source_id, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(body: &[u8]) -> Section<'_> {
        Section {
            table_id: 0xcc,
            section_syntax_indicator: true,
            table_id_extension: 0x1234,
            version_number: 0,
            current_next_indicator: true,
            section_number: 0,
            last_section_number: 0,
            body,
            crc_32: 0,
        }
    }

    #[test]
    fn test_event_text() {
        let body = [
            0x00, 0x00, 0x05, 0x00, 0xaa, // event 0x2a of source 5
            0x01, b'e', b'n', b'g', 0x01, 0x00, 0x00, 0x02, b'h', b'i',
        ];
        let (source_id, items) = parse_ett(&section(&body)).unwrap();
        assert_eq!(source_id, 5);
        assert_eq!(
            items,
            vec![EttItem {
                event_id: 0x2a,
                text: "hi".to_string(),
            }]
        );
        assert!(!items[0].is_channel_description());
    }

    #[test]
    fn test_channel_text() {
        let body = [
            0x00, 0x00, 0x05, 0x00, 0x00, 0x01, b'e', b'n', b'g', 0x01, 0x00, 0x00, 0x01, b'c',
        ];
        let (source_id, items) = parse_ett(&section(&body)).unwrap();
        assert_eq!(source_id, 5);
        assert!(items[0].is_channel_description());
        // no text at all
        let (_, items) = parse_ett(&section(&body[..5])).unwrap();
        assert!(items.is_empty());
    }
}
