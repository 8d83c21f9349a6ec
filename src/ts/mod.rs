pub mod demuxer;
pub mod framer;

pub use self::demuxer::Demuxer;
pub use self::framer::Framer;

pub const TS_PACKET_LENGTH: usize = 188;
pub const SYNC_BYTE: u8 = 0x47;

pub const PAT_PID: u16 = 0x0000;
pub const PSIP_BASE_PID: u16 = 0x1ffb;

const HEADER_LENGTH: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet length is {0}, expect {}", TS_PACKET_LENGTH)]
    Length(usize),
    #[error("sync byte is {0:#04x}, expect {:#04x}", SYNC_BYTE)]
    SyncByte(u8),
    #[error("adaptation_field_length({0}) overruns the packet")]
    AdaptationFieldOverrun(usize),
}

/// Header fields of one transport stream packet and a view of its payload.
#[derive(Debug)]
pub struct TSPacket<'a> {
    pub transport_error_indicator: bool,
    pub payload_unit_start_indicator: bool,
    pub transport_priority: bool,
    pub pid: u16,
    pub transport_scrambling_control: u8,
    pub continuity_counter: u8,
    pub adaptation_field_length: Option<usize>,
    pub data_bytes: Option<&'a [u8]>,
}

impl<'a> TSPacket<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<TSPacket<'a>, PacketError> {
        if bytes.len() != TS_PACKET_LENGTH {
            return Err(PacketError::Length(bytes.len()));
        }
        if bytes[0] != SYNC_BYTE {
            return Err(PacketError::SyncByte(bytes[0]));
        }
        let transport_error_indicator = bytes[1] & 0x80 > 0;
        let payload_unit_start_indicator = bytes[1] & 0x40 > 0;
        let transport_priority = bytes[1] & 0x20 > 0;
        let pid = (u16::from(bytes[1] & 0x1f) << 8) | u16::from(bytes[2]);
        let transport_scrambling_control = bytes[3] >> 6;
        let adaptation_field_control = (bytes[3] & 0x30) >> 4;
        let continuity_counter = bytes[3] & 0xf;

        let adaptation_field_length = match adaptation_field_control {
            0b10 | 0b11 => Some(usize::from(bytes[HEADER_LENGTH])),
            _ => None,
        };
        let payload_offset = match adaptation_field_length {
            Some(n) => HEADER_LENGTH + 1 + n,
            None => HEADER_LENGTH,
        };
        if payload_offset > TS_PACKET_LENGTH {
            return Err(PacketError::AdaptationFieldOverrun(payload_offset - HEADER_LENGTH - 1));
        }
        let data_bytes = match adaptation_field_control {
            0b01 | 0b11 => Some(&bytes[payload_offset..]),
            _ => None,
        };
        Ok(TSPacket {
            transport_error_indicator,
            payload_unit_start_indicator,
            transport_priority,
            pid,
            transport_scrambling_control,
            continuity_counter,
            adaptation_field_length,
            data_bytes,
        })
    }
}
