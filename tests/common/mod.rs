#![allow(dead_code)]

use std::collections::HashMap;

use atsctools::psi::{crc32, PatItem, PmtItem};
use atsctools::psip::{EitItem, VctItem};
use atsctools::OutputListener;

pub const TS_PACKET_LENGTH: usize = 188;
pub const PSIP_BASE_PID: u16 = 0x1ffb;
pub const EIT_PID: u16 = 0x1d00;
pub const ETT_PID: u16 = 0x1e00;
pub const CHANNEL_ETT_PID: u16 = 0x1e80;

/// A long form section with the given body and a valid CRC_32.
pub fn section(table_id: u8, table_id_extension: u16, body: &[u8]) -> Vec<u8> {
    section_with(table_id, table_id_extension, 0, true, body)
}

pub fn section_with(
    table_id: u8,
    table_id_extension: u16,
    version_number: u8,
    current_next_indicator: bool,
    body: &[u8],
) -> Vec<u8> {
    let section_length = 5 + body.len() + 4;
    let mut bytes = vec![
        table_id,
        0xf0 | (section_length >> 8) as u8,
        section_length as u8,
    ];
    bytes.extend_from_slice(&table_id_extension.to_be_bytes());
    bytes.push(0xc0 | (version_number & 0x1f) << 1 | current_next_indicator as u8);
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(body);
    let crc = crc32(&bytes);
    bytes.extend_from_slice(&crc.to_be_bytes());
    bytes
}

/// A multiple string structure with one uncompressed latin string.
pub fn text(s: &str) -> Vec<u8> {
    let mut bytes = vec![0x01, b'e', b'n', b'g', 0x01, 0x00, 0x00, s.len() as u8];
    bytes.extend_from_slice(s.as_bytes());
    bytes
}

pub fn pat(programs: &[(u16, u16)]) -> Vec<u8> {
    let mut body = vec![0x00, 0x00, 0xe0, 0x10]; // network pid
    for (program_number, pid) in programs {
        body.extend_from_slice(&program_number.to_be_bytes());
        body.extend_from_slice(&(0xe000 | pid).to_be_bytes());
    }
    section(0x00, 1, &body)
}

pub fn pmt(program_number: u16, streams: &[(u8, u16)]) -> Vec<u8> {
    let mut body = vec![0xe0, 0x31, 0xf0, 0x00];
    for (stream_type, pid) in streams {
        body.push(*stream_type);
        body.extend_from_slice(&(0xe000 | pid).to_be_bytes());
        body.extend_from_slice(&[0xf0, 0x00]);
    }
    section(0x02, program_number, &body)
}

/// MGT announcing `(table_type, pid)` pairs.
pub fn mgt(tables: &[(u16, u16)]) -> Vec<u8> {
    let mut body = vec![0x00];
    body.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    for (table_type, pid) in tables {
        body.extend_from_slice(&table_type.to_be_bytes());
        body.extend_from_slice(&(0xe000 | pid).to_be_bytes());
        body.extend_from_slice(&[0xe0, 0x00, 0x00, 0x01, 0x00, 0xf0, 0x00]);
    }
    body.extend_from_slice(&[0xf0, 0x00]);
    section(0xc7, 0, &body)
}

/// The usual MGT: one EIT, one event ETT and the channel ETT.
pub fn default_mgt() -> Vec<u8> {
    mgt(&[
        (0x0000, PSIP_BASE_PID),
        (0x0100, EIT_PID),
        (0x0200, ETT_PID),
        (0x0004, CHANNEL_ETT_PID),
    ])
}

pub struct Channel<'a> {
    pub name: &'a str,
    pub major: u16,
    pub minor: u16,
    pub program_number: u16,
    pub source_id: u16,
}

pub fn tvct(channels: &[Channel]) -> Vec<u8> {
    let mut body = vec![0x00, channels.len() as u8];
    for channel in channels {
        let mut name: Vec<u16> = channel.name.encode_utf16().collect();
        name.resize(7, 0);
        for u in name {
            body.extend_from_slice(&u.to_be_bytes());
        }
        body.push(0xf0 | (channel.major >> 6) as u8);
        body.push((channel.major << 2) as u8 | (channel.minor >> 8) as u8);
        body.push(channel.minor as u8);
        body.push(0x04);
        body.extend_from_slice(&[0, 0, 0, 0]);
        body.extend_from_slice(&[0x07, 0xd1]);
        body.extend_from_slice(&channel.program_number.to_be_bytes());
        body.extend_from_slice(&[0x0d, 0xc2]);
        body.extend_from_slice(&channel.source_id.to_be_bytes());
        body.extend_from_slice(&[0xfc, 0x00]);
    }
    body.extend_from_slice(&[0xfc, 0x00]);
    section(0xc8, 0x07d1, &body)
}

pub struct Event<'a> {
    pub event_id: u16,
    pub start_time: u32,
    pub length_in_seconds: u32,
    pub etm_location: u8,
    pub title: &'a str,
}

pub fn eit(source_id: u16, events: &[Event]) -> Vec<u8> {
    let mut body = vec![0x00, events.len() as u8];
    for event in events {
        body.extend_from_slice(&(0xc000 | event.event_id).to_be_bytes());
        body.extend_from_slice(&event.start_time.to_be_bytes());
        body.push(0xc0 | event.etm_location << 4 | (event.length_in_seconds >> 16) as u8);
        body.extend_from_slice(&(event.length_in_seconds as u16).to_be_bytes());
        let title = text(event.title);
        body.push(title.len() as u8);
        body.extend_from_slice(&title);
        body.extend_from_slice(&[0xf0, 0x00]);
    }
    section(0xcb, source_id, &body)
}

/// ETT for an event, or for the channel itself when `event_id` is 0.
pub fn ett(source_id: u16, event_id: u16, s: &str) -> Vec<u8> {
    let event_flag = if event_id == 0 { 0 } else { 2 };
    let etm_id = u32::from(source_id) << 16 | u32::from(event_id) << 2 | event_flag;
    let mut body = vec![0x00];
    body.extend_from_slice(&etm_id.to_be_bytes());
    body.extend_from_slice(&text(s));
    section(0xcc, 0, &body)
}

pub fn stt(system_time: u32, gps_utc_offset: u8) -> Vec<u8> {
    let mut body = vec![0x00];
    body.extend_from_slice(&system_time.to_be_bytes());
    body.push(gps_utc_offset);
    body.extend_from_slice(&[0x00, 0x00]);
    section(0xcd, 0, &body)
}

/// One raw packet carrying `payload`, padded with 0xff.
pub fn packet(pid: u16, continuity_counter: u8, pusi: bool, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= TS_PACKET_LENGTH - 4);
    let mut bytes = vec![
        0x47,
        (pusi as u8) << 6 | (pid >> 8) as u8,
        pid as u8,
        0x10 | (continuity_counter & 0xf),
    ];
    bytes.extend_from_slice(payload);
    bytes.resize(TS_PACKET_LENGTH, 0xff);
    bytes
}

/// Splits sections into packets, keeping a continuity counter per PID.
#[derive(Default)]
pub struct Packetizer {
    counters: HashMap<u16, u8>,
}

impl Packetizer {
    pub fn new() -> Self {
        Packetizer::default()
    }

    fn next_counter(&mut self, pid: u16) -> u8 {
        let counter = self.counters.entry(pid).or_insert(15);
        *counter = (*counter + 1) % 16;
        *counter
    }

    pub fn packets(&mut self, pid: u16, section: &[u8]) -> Vec<Vec<u8>> {
        let mut payload = vec![0x00]; // pointer_field
        payload.extend_from_slice(section);
        let mut packets = Vec::new();
        for (i, chunk) in payload.chunks(TS_PACKET_LENGTH - 4).enumerate() {
            let counter = self.next_counter(pid);
            packets.push(packet(pid, counter, i == 0, chunk));
        }
        packets
    }

    pub fn push(&mut self, stream: &mut Vec<u8>, pid: u16, section: &[u8]) {
        for packet in self.packets(pid, section) {
            stream.extend_from_slice(&packet);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Pat(Vec<PatItem>),
    EitPid(u16),
    EttPid(u16),
    Channel(VctItem, Vec<PmtItem>),
    Events(VctItem, Vec<EitItem>),
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn channels(&self) -> Vec<&VctItem> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Channel(vct, _) => Some(vct),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<&Vec<EitItem>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Events(_, items) => Some(items),
                _ => None,
            })
            .collect()
    }
}

impl OutputListener for Recorder {
    fn on_pat_detected(&mut self, items: &[PatItem]) {
        self.calls.push(Call::Pat(items.to_vec()));
    }

    fn on_eit_pid_detected(&mut self, pid: u16) {
        self.calls.push(Call::EitPid(pid));
    }

    fn on_ett_pid_detected(&mut self, pid: u16) {
        self.calls.push(Call::EttPid(pid));
    }

    fn on_vct_item_parsed(&mut self, channel: &VctItem, pmt_items: &[PmtItem]) {
        self.calls
            .push(Call::Channel(channel.clone(), pmt_items.to_vec()));
    }

    fn on_eit_items_parsed(&mut self, channel: &VctItem, items: &[EitItem]) {
        self.calls.push(Call::Events(channel.clone(), items.to_vec()));
    }
}
