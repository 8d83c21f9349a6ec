use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_derive::Serialize;

use crate::psi::{Descriptor, Section};
use crate::psip::{string, stt};
use crate::util;

/// Where the extended text message of an event or channel is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EtmLocation {
    None,
    ThisStream,
    ChannelStream,
    Reserved,
}

impl From<u8> for EtmLocation {
    fn from(v: u8) -> Self {
        match v & 0x3 {
            0 => EtmLocation::None,
            1 => EtmLocation::ThisStream,
            2 => EtmLocation::ChannelStream,
            _ => EtmLocation::Reserved,
        }
    }
}

/// One scheduled event of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EitItem {
    pub event_id: u16,
    /// GPS seconds.
    pub start_time: u32,
    pub length_in_seconds: u32,
    pub etm_location: EtmLocation,
    pub title: Option<String>,
    pub content_rating: Option<String>,
    /// Event text from the ETT, filled in while correlating.
    pub description: Option<String>,
}

impl EitItem {
    pub fn start_time_utc(&self, gps_utc_offset: u8) -> DateTime<Utc> {
        stt::gps_to_utc(self.start_time, gps_utc_offset)
    }

    fn parse(bytes: &[u8]) -> Result<(EitItem, usize)> {
        check_len!(bytes.len(), 10);
        let title_length = usize::from(bytes[9]);
        check_len!(bytes.len(), 10 + title_length + 2);
        let title = string::first_text(&bytes[10..10 + title_length])?;
        let bytes_after_title = &bytes[10 + title_length..];
        let descriptors_length = util::read_length(bytes_after_title)?;
        check_len!(bytes_after_title.len(), 2 + descriptors_length);

        let mut content_rating = None;
        for descriptor in Descriptor::parse_loop(&bytes_after_title[2..2 + descriptors_length])? {
            if let Descriptor::ContentAdvisory(regions) = descriptor {
                let ratings: Vec<String> = regions
                    .into_iter()
                    .filter_map(|r| r.rating_description)
                    .collect();
                if !ratings.is_empty() {
                    content_rating = Some(ratings.join(","));
                }
            }
        }

        let item = EitItem {
            event_id: util::read_u16(bytes)? & 0x3fff,
            start_time: util::read_u32(&bytes[2..])?,
            length_in_seconds: (u32::from(bytes[6] & 0x0f) << 16)
                | (u32::from(bytes[7]) << 8)
                | u32::from(bytes[8]),
            etm_location: EtmLocation::from(bytes[6] >> 4),
            title,
            content_rating,
            description: None,
        };
        Ok((item, 10 + title_length + 2 + descriptors_length))
    }
}

/// Returns the source id of the section and its events.
pub fn parse_eit(section: &Section) -> Result<(u16, Vec<EitItem>)> {
    // protocol_version, num_events_in_section
    check_len!(section.body.len(), 2);
    let num_events_in_section = usize::from(section.body[1]);
    let mut bytes = &section.body[2..];
    let mut items = Vec::with_capacity(num_events_in_section);
    for _ in 0..num_events_in_section {
        let (item, n) = EitItem::parse(bytes)?;
        items.push(item);
        bytes = &bytes[n..];
    }
    Ok((section.table_id_extension, items))
}
