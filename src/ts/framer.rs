use bytes::BytesMut;
use log::debug;

use crate::ts::{TSPacket, TS_PACKET_LENGTH};

/// Cuts a byte stream into transport stream packets.
///
/// Bytes that do not fill a whole packet are kept and completed by the next
/// call to [`Framer::feed`].
pub struct Framer {
    carry: BytesMut,
}

impl Default for Framer {
    fn default() -> Self {
        Framer::new()
    }
}

impl Framer {
    pub fn new() -> Framer {
        Framer {
            carry: BytesMut::with_capacity(TS_PACKET_LENGTH),
        }
    }

    /// Number of bytes waiting for the rest of their packet.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    pub fn feed<F: FnMut(&TSPacket)>(&mut self, mut data: &[u8], mut f: F) {
        if !self.carry.is_empty() {
            let n = (TS_PACKET_LENGTH - self.carry.len()).min(data.len());
            self.carry.extend_from_slice(&data[..n]);
            data = &data[n..];
            if self.carry.len() < TS_PACKET_LENGTH {
                return;
            }
            let packet = self.carry.split();
            handle(&packet, &mut f);
        }

        let mut chunks = data.chunks_exact(TS_PACKET_LENGTH);
        for chunk in &mut chunks {
            handle(chunk, &mut f);
        }
        self.carry.extend_from_slice(chunks.remainder());
    }
}

fn handle<F: FnMut(&TSPacket)>(bytes: &[u8], f: &mut F) {
    let packet = match TSPacket::parse(bytes) {
        Ok(packet) => packet,
        Err(e) => {
            debug!("drop packet: {}", e);
            return;
        }
    };
    if packet.transport_error_indicator {
        debug!("drop packet with transport_error_indicator, pid={:#06x}", packet.pid);
        return;
    }
    f(&packet);
}
