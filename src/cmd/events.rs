use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_derive::Serialize;

use atsctools::psip::{EitItem, VctItem};
use atsctools::{Config, OutputListener, TsParser};

use super::io::feed;

struct Duration(chrono::Duration);

impl serde::Serialize for Duration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.num_seconds())
    }
}

#[derive(Serialize)]
struct Event {
    channel: String,
    source_id: u16,
    id: u16,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration: Duration,
    title: Option<String>,
    description: Option<String>,
    content_rating: Option<String>,
}

impl Event {
    fn new(vct: &VctItem, item: &EitItem, gps_utc_offset: u8) -> Self {
        let start = item.start_time_utc(gps_utc_offset);
        let duration = chrono::Duration::seconds(i64::from(item.length_in_seconds));
        Event {
            channel: format!("{}.{}", vct.major_channel_number, vct.minor_channel_number),
            source_id: vct.source_id,
            id: item.event_id,
            start,
            end: start + duration,
            duration: Duration(duration),
            title: item.title.clone(),
            description: item.description.clone(),
            content_rating: item.content_rating.clone(),
        }
    }
}

#[derive(Default)]
struct Guide(BTreeMap<u16, (VctItem, Vec<EitItem>)>);

impl OutputListener for Guide {
    fn on_eit_pid_detected(&mut self, pid: u16) {
        debug!("eit pid {:#06x}", pid);
    }

    fn on_ett_pid_detected(&mut self, pid: u16) {
        debug!("ett pid {:#06x}", pid);
    }

    fn on_eit_items_parsed(&mut self, vct: &VctItem, items: &[EitItem]) {
        self.0.insert(vct.source_id, (vct.clone(), items.to_vec()));
    }
}

pub async fn run(input: Option<PathBuf>, config: Config) -> Result<()> {
    let mut parser = TsParser::with_config(Guide::default(), config);
    feed(&mut parser, input).await?;
    parser.flush_events();

    let gps_utc_offset = match parser.system_time() {
        Some(stt) => stt.gps_utc_offset,
        None => {
            warn!("no system time table, start times are gps time");
            0
        }
    };
    for (vct, items) in parser.into_listener().0.values() {
        for item in items {
            let event = Event::new(vct, item, gps_utc_offset);
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
