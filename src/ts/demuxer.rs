use std::collections::hash_map::{Entry, HashMap};

use bytes::Bytes;
use log::debug;

use crate::psi;
use crate::ts::TSPacket;

/// Routes packets to the section buffer registered for their PID.
#[derive(Default)]
pub struct Demuxer {
    buffers: HashMap<u16, psi::Buffer>,
}

impl Demuxer {
    pub fn new() -> Demuxer {
        Demuxer {
            buffers: HashMap::new(),
        }
    }

    /// Starts listening on `pid`. Returns false if it was already registered.
    pub fn register(&mut self, pid: u16) -> bool {
        match self.buffers.entry(pid) {
            Entry::Vacant(entry) => {
                debug!("listen on pid {:#06x}", pid);
                entry.insert(psi::Buffer::new());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn is_registered(&self, pid: u16) -> bool {
        self.buffers.contains_key(&pid)
    }

    /// Feeds the packet payload to its PID's buffer and returns the sections
    /// it completed.
    pub fn demux(&mut self, packet: &TSPacket) -> Vec<Bytes> {
        let mut sections = Vec::new();
        let buffer = match self.buffers.get_mut(&packet.pid) {
            Some(buffer) => buffer,
            None => return sections,
        };
        let data = match packet.data_bytes {
            Some(data) => data,
            None => return sections,
        };
        if let Err(e) = buffer.feed(
            data,
            packet.continuity_counter,
            packet.payload_unit_start_indicator,
        ) {
            debug!("pid {:#06x}: {}", packet.pid, e);
            return sections;
        }
        loop {
            match buffer.next_section() {
                Ok(Some(section)) => sections.push(section),
                Ok(None) => break,
                Err(e) => {
                    debug!("pid {:#06x}: {}", packet.pid, e);
                    break;
                }
            }
        }
        sections
    }
}
