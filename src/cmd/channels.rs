use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use log::{debug, warn};
use serde_derive::Serialize;

use atsctools::psi::{CaptionService, PatItem, PmtItem};
use atsctools::psip::VctItem;
use atsctools::{Config, OutputListener, TsParser};

use super::io::feed;

#[derive(Serialize)]
struct Stream {
    pid: u16,
    stream_type: u8,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    captions: Vec<CaptionService>,
}

impl From<&PmtItem> for Stream {
    fn from(item: &PmtItem) -> Self {
        let kind = if item.is_video() {
            "video"
        } else if item.is_audio() {
            "audio"
        } else {
            "other"
        };
        Stream {
            pid: item.es_pid,
            stream_type: item.stream_type,
            kind,
            language: item.language.clone(),
            captions: item.caption_services.clone(),
        }
    }
}

#[derive(Serialize)]
struct Channel {
    channel: String,
    short_name: String,
    long_name: Option<String>,
    description: Option<String>,
    program_number: u16,
    source_id: u16,
    service_type: u8,
    hidden: bool,
    streams: Vec<Stream>,
}

impl Channel {
    fn new(vct: &VctItem, pmt_items: &[PmtItem]) -> Self {
        Channel {
            channel: format!("{}.{}", vct.major_channel_number, vct.minor_channel_number),
            short_name: vct.short_name.clone(),
            long_name: vct.long_name.clone(),
            description: vct.description.clone(),
            program_number: vct.program_number,
            source_id: vct.source_id,
            service_type: vct.service_type,
            hidden: vct.hidden,
            streams: pmt_items.iter().map(Stream::from).collect(),
        }
    }
}

#[derive(Default)]
struct Channels(BTreeMap<(u16, u16), Channel>);

impl OutputListener for Channels {
    fn on_pat_detected(&mut self, items: &[PatItem]) {
        debug!("pat: {} programs", items.len());
    }

    fn on_vct_item_parsed(&mut self, vct: &VctItem, pmt_items: &[PmtItem]) {
        let key = (vct.major_channel_number, vct.minor_channel_number);
        self.0.insert(key, Channel::new(vct, pmt_items));
    }
}

pub async fn run(input: Option<PathBuf>, config: Config) -> Result<()> {
    let mut parser = TsParser::with_config(Channels::default(), config);
    feed(&mut parser, input).await?;

    for incomplete in parser.incomplete_channels() {
        warn!(
            "program {} has no virtual channel, {} streams",
            incomplete.program_number,
            incomplete.pmt_items.len()
        );
    }
    for channel in parser.listener().0.values() {
        println!("{}", serde_json::to_string(channel)?);
    }
    Ok(())
}
