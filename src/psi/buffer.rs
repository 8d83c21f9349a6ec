use bytes::{Bytes, BytesMut};
use log::debug;

const INITIAL_BUFFER: usize = 4096;
const STUFFING_BYTE: u8 = 0xff;

/// Largest `section_length` a private section may declare.
pub const MAX_SECTION_LENGTH: usize = 4093;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("malformed psi packet, no data")]
    MalformedNoData,
    #[error("malformed psi packet, no section header in the packet")]
    MalformedNoSectionHeader,
    #[error("section_length {0} is bigger than {}", MAX_SECTION_LENGTH)]
    SectionTooLong(usize),
}

/// Per-PID section reassembly state.
///
/// A buffer that already holds part of a section skips exactly one byte of
/// a payload that starts a new unit, without reading the pointer value: the
/// pointed bytes are the tail of the pending section, so they are appended
/// as they come.
#[derive(Debug)]
pub struct Buffer {
    counter: Option<u8>,
    buf: BytesMut,
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Buffer {
            counter: None,
            buf: BytesMut::with_capacity(INITIAL_BUFFER),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn feed(
        &mut self,
        bytes: &[u8],
        continuity_counter: u8,
        payload_unit_start_indicator: bool,
    ) -> Result<(), BufferError> {
        if let Some(counter) = self.counter {
            if (counter + 1) % 16 != continuity_counter && !self.buf.is_empty() {
                debug!(
                    "discontinued psi packet, counter {} -> {}, drop {} bytes",
                    counter,
                    continuity_counter,
                    self.buf.len()
                );
                self.buf.clear();
            }
        }
        self.counter = Some(continuity_counter);

        let start = if !payload_unit_start_indicator {
            if self.buf.is_empty() {
                // no idea where a section starts yet.
                return Ok(());
            }
            0
        } else {
            let pointer_field = match bytes.first() {
                Some(&pointer_field) => usize::from(pointer_field),
                None => {
                    self.buf.clear();
                    return Err(BufferError::MalformedNoData);
                }
            };
            match self.missing() {
                None => 1 + pointer_field,
                Some(missing) if missing > pointer_field => {
                    debug!(
                        "pending section misses {} bytes, only {} before the next unit, drop {} bytes",
                        missing,
                        pointer_field,
                        self.buf.len()
                    );
                    self.buf.clear();
                    1 + pointer_field
                }
                Some(_) => 1,
            }
        };
        if start > bytes.len() {
            self.buf.clear();
            return Err(BufferError::MalformedNoSectionHeader);
        }
        self.buf.extend_from_slice(&bytes[start..]);
        Ok(())
    }

    /// Bytes the pending section still needs, `None` when nothing is pending.
    /// A pending header too short to carry its length counts as needing none.
    fn missing(&self) -> Option<usize> {
        if self.buf.is_empty() {
            return None;
        }
        if self.buf.len() < 3 {
            return Some(0);
        }
        let section_length = (usize::from(self.buf[1] & 0xf) << 8) | usize::from(self.buf[2]);
        Some((section_length + 3).saturating_sub(self.buf.len()))
    }

    /// Splits off the next complete section, if the buffer holds one.
    pub fn next_section(&mut self) -> Result<Option<Bytes>, BufferError> {
        if self.buf.first() == Some(&STUFFING_BYTE) {
            // the rest of the packet is stuffing.
            self.buf.clear();
            return Ok(None);
        }
        if self.buf.len() < 3 {
            return Ok(None);
        }
        let section_length = (usize::from(self.buf[1] & 0xf) << 8) | usize::from(self.buf[2]);
        if section_length > MAX_SECTION_LENGTH {
            self.buf.clear();
            return Err(BufferError::SectionTooLong(section_length));
        }
        if self.buf.len() < section_length + 3 {
            return Ok(None);
        }
        Ok(Some(self.buf.split_to(section_length + 3).freeze()))
    }
}
