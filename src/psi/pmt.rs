use anyhow::Result;
use serde_derive::Serialize;

use crate::psi::descriptor::{CaptionService, Descriptor};
use crate::psi::Section;
use crate::util;

pub const STREAM_TYPE_MPEG2_VIDEO: u8 = 0x02;
pub const STREAM_TYPE_H264: u8 = 0x1b;
pub const STREAM_TYPE_AC3_AUDIO: u8 = 0x81;
pub const STREAM_TYPE_EAC3_AUDIO: u8 = 0x87;

/// One elementary stream of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PmtItem {
    pub stream_type: u8,
    pub es_pid: u16,
    pub language: Option<String>,
    pub caption_services: Vec<CaptionService>,
}

impl PmtItem {
    pub fn is_video(&self) -> bool {
        matches!(self.stream_type, STREAM_TYPE_MPEG2_VIDEO | STREAM_TYPE_H264)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self.stream_type, STREAM_TYPE_AC3_AUDIO | STREAM_TYPE_EAC3_AUDIO)
    }

    fn parse(bytes: &[u8]) -> Result<(PmtItem, usize)> {
        check_len!(bytes.len(), 5);
        let stream_type = bytes[0];
        let es_pid = util::read_pid(&bytes[1..])?;
        let es_info_length = util::read_length(&bytes[3..])?;
        check_len!(bytes.len(), 5 + es_info_length);
        let mut item = PmtItem {
            stream_type,
            es_pid,
            language: None,
            caption_services: Vec::new(),
        };
        for descriptor in Descriptor::parse_loop(&bytes[5..5 + es_info_length])? {
            match descriptor {
                Descriptor::Iso639Language(languages) => {
                    if item.language.is_none() {
                        item.language = languages.into_iter().next().map(|l| l.iso_639_language_code);
                    }
                }
                Descriptor::CaptionService(services) => item.caption_services.extend(services),
                _ => {}
            }
        }
        Ok((item, 5 + es_info_length))
    }
}

/// Returns the program number and its elementary streams.
pub fn parse_pmt(section: &Section) -> Result<(u16, Vec<PmtItem>)> {
    let bytes = section.body;
    check_len!(bytes.len(), 4);
    let program_info_length = util::read_length(&bytes[2..])?;
    check_len!(bytes.len(), 4 + program_info_length);
    let mut bytes = &bytes[4 + program_info_length..];
    let mut items = vec![];
    while !bytes.is_empty() {
        let (item, n) = PmtItem::parse(bytes)?;
        items.push(item);
        bytes = &bytes[n..];
    }
    Ok((section.table_id_extension, items))
}
