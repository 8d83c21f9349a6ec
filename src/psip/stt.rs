use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_derive::Serialize;

use crate::psi::{Descriptor, Section};
use crate::util;

/// Seconds between the Unix epoch and the GPS epoch, 1980-01-06T00:00:00Z.
const GPS_EPOCH: i64 = 315_964_800;

/// Converts GPS seconds into UTC, given the current GPS-UTC leap seconds.
pub fn gps_to_utc(gps_seconds: u32, gps_utc_offset: u8) -> DateTime<Utc> {
    let seconds = GPS_EPOCH + i64::from(gps_seconds) - i64::from(gps_utc_offset);
    // the default is the Unix epoch.
    DateTime::<Utc>::default() + Duration::seconds(seconds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SttItem {
    pub system_time: u32,
    pub gps_utc_offset: u8,
    pub daylight_saving: u16,
}

impl SttItem {
    pub fn utc(&self) -> DateTime<Utc> {
        gps_to_utc(self.system_time, self.gps_utc_offset)
    }
}

pub fn parse_stt(section: &Section) -> Result<SttItem> {
    // protocol_version, system_time, GPS_UTC_offset, daylight_saving
    check_len!(section.body.len(), 8);
    Descriptor::parse_loop(&section.body[8..])?;
    Ok(SttItem {
        system_time: util::read_u32(&section.body[1..])?,
        gps_utc_offset: section.body[5],
        daylight_saving: util::read_u16(&section.body[6..])?,
    })
}
