use anyhow::Result;
use log::trace;

use crate::psip::string;

pub const ISO_639_LANGUAGE_DESCRIPTOR: u8 = 0x0a;
pub const AC3_AUDIO_DESCRIPTOR: u8 = 0x81;
pub const CAPTION_SERVICE_DESCRIPTOR: u8 = 0x86;
pub const CONTENT_ADVISORY_DESCRIPTOR: u8 = 0x87;
pub const EXTENDED_CHANNEL_NAME_DESCRIPTOR: u8 = 0xa0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor<'a> {
    Iso639Language(Vec<Iso639Language>),
    Ac3Audio,
    CaptionService(Vec<CaptionService>),
    ContentAdvisory(Vec<RatingRegion>),
    ExtendedChannelName(Option<String>),
    Unsupported(UnsupportedDescriptor<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iso639Language {
    pub iso_639_language_code: String,
    pub audio_type: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize)]
pub struct CaptionService {
    pub language: String,
    pub digital_cc: bool,
    /// caption_service_number for digital captions, line21_field otherwise.
    pub service_number: u8,
    pub easy_reader: bool,
    pub wide_aspect_ratio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRegion {
    pub rating_region: u8,
    /// (rating_dimension_j, rating_value)
    pub dimensions: Vec<(u8, u8)>,
    pub rating_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedDescriptor<'a> {
    pub descriptor_tag: u8,
    pub data: &'a [u8],
}

fn parse_iso_639_language(bytes: &[u8]) -> Vec<Iso639Language> {
    bytes
        .chunks_exact(4)
        .map(|c| Iso639Language {
            iso_639_language_code: String::from_utf8_lossy(&c[..3]).into_owned(),
            audio_type: c[3],
        })
        .collect()
}

fn parse_caption_service(bytes: &[u8]) -> Result<Vec<CaptionService>> {
    check_len!(bytes.len(), 1);
    let number_of_services = usize::from(bytes[0] & 0x1f);
    check_len!(bytes.len(), 1 + 6 * number_of_services);
    Ok(bytes[1..1 + 6 * number_of_services]
        .chunks_exact(6)
        .map(|c| {
            let digital_cc = c[3] & 0x80 > 0;
            CaptionService {
                language: String::from_utf8_lossy(&c[..3]).into_owned(),
                digital_cc,
                service_number: if digital_cc { c[3] & 0x3f } else { c[3] & 0x01 },
                easy_reader: c[4] & 0x80 > 0,
                wide_aspect_ratio: c[4] & 0x40 > 0,
            }
        })
        .collect())
}

fn parse_content_advisory(bytes: &[u8]) -> Result<Vec<RatingRegion>> {
    check_len!(bytes.len(), 1);
    let rating_region_count = usize::from(bytes[0] & 0x3f);
    let mut bytes = &bytes[1..];
    let mut regions = Vec::with_capacity(rating_region_count);
    for _ in 0..rating_region_count {
        check_len!(bytes.len(), 2);
        let rating_region = bytes[0];
        let rated_dimensions = usize::from(bytes[1]);
        check_len!(bytes.len(), 2 + 2 * rated_dimensions + 1);
        let dimensions = bytes[2..2 + 2 * rated_dimensions]
            .chunks_exact(2)
            .map(|c| (c[0], c[1] & 0xf))
            .collect();
        bytes = &bytes[2 + 2 * rated_dimensions..];
        let rating_description_length = usize::from(bytes[0]);
        check_len!(bytes.len(), 1 + rating_description_length);
        let rating_description = string::first_text(&bytes[1..1 + rating_description_length])?;
        bytes = &bytes[1 + rating_description_length..];
        regions.push(RatingRegion {
            rating_region,
            dimensions,
            rating_description,
        });
    }
    Ok(regions)
}

impl<'a> Descriptor<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<(Descriptor<'a>, usize)> {
        check_len!(bytes.len(), 2);
        let descriptor_tag = bytes[0];
        let length = usize::from(bytes[1]);
        check_len!(bytes.len(), 2 + length);
        let data = &bytes[2..2 + length];
        let descriptor = match descriptor_tag {
            ISO_639_LANGUAGE_DESCRIPTOR => Descriptor::Iso639Language(parse_iso_639_language(data)),
            AC3_AUDIO_DESCRIPTOR => Descriptor::Ac3Audio,
            CAPTION_SERVICE_DESCRIPTOR => Descriptor::CaptionService(parse_caption_service(data)?),
            CONTENT_ADVISORY_DESCRIPTOR => {
                Descriptor::ContentAdvisory(parse_content_advisory(data)?)
            }
            EXTENDED_CHANNEL_NAME_DESCRIPTOR => {
                Descriptor::ExtendedChannelName(string::first_text(data)?)
            }
            _ => {
                trace!("unsupported descriptor {:#04x}", descriptor_tag);
                Descriptor::Unsupported(UnsupportedDescriptor {
                    descriptor_tag,
                    data,
                })
            }
        };
        Ok((descriptor, 2 + length))
    }

    /// Parses a whole descriptor loop.
    pub fn parse_loop(mut bytes: &'a [u8]) -> Result<Vec<Descriptor<'a>>> {
        let mut descriptors = vec![];
        while !bytes.is_empty() {
            let (descriptor, n) = Descriptor::parse(bytes)?;
            descriptors.push(descriptor);
            bytes = &bytes[n..];
        }
        Ok(descriptors)
    }
}
