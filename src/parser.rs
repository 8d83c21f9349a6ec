use log::{debug, warn};

use crate::correlate::{Correlator, TunerChannel};
use crate::listener::OutputListener;
use crate::psi;
use crate::psip::SttItem;
use crate::ts::{Demuxer, Framer, PAT_PID, PSIP_BASE_PID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Drop long-form sections whose CRC_32 does not match.
    pub verify_crc: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config { verify_crc: true }
    }
}

/// Turns raw transport stream bytes into listener callbacks.
///
/// Bytes may be fed in chunks of any size; a packet split across two calls
/// is completed by the second one.
pub struct TsParser<L: OutputListener> {
    config: Config,
    framer: Framer,
    demuxer: Demuxer,
    correlator: Correlator,
    listener: L,
}

impl<L: OutputListener> TsParser<L> {
    pub fn new(listener: L) -> TsParser<L> {
        TsParser::with_config(listener, Config::default())
    }

    pub fn with_config(listener: L, config: Config) -> TsParser<L> {
        let mut demuxer = Demuxer::new();
        demuxer.register(PAT_PID);
        demuxer.register(PSIP_BASE_PID);
        TsParser {
            config,
            framer: Framer::new(),
            demuxer,
            correlator: Correlator::new(),
            listener,
        }
    }

    /// Feeds `length` bytes of `bytes` starting at `offset`.
    pub fn feed_ts_data(&mut self, bytes: &[u8], offset: usize, length: usize) {
        let data = match offset
            .checked_add(length)
            .and_then(|end| bytes.get(offset..end))
        {
            Some(data) => data,
            None => {
                warn!(
                    "range {}+{} is out of {} bytes, ignored",
                    offset,
                    length,
                    bytes.len()
                );
                return;
            }
        };

        let TsParser {
            config,
            framer,
            demuxer,
            correlator,
            listener,
        } = self;
        framer.feed(data, |packet| {
            for section in demuxer.demux(packet) {
                match psi::parse_section(&section, config.verify_crc) {
                    Ok(table) => correlator.handle(packet.pid, table, demuxer, listener),
                    Err(e) => debug!("pid {:#06x}: drop section: {:#}", packet.pid, e),
                }
            }
        });
    }

    /// Programs whose PMT is known but that no VCT has named yet.
    pub fn incomplete_channels(&self) -> Vec<TunerChannel> {
        self.correlator.incomplete_channels()
    }

    /// Delivers events still waiting for their extended texts.
    pub fn flush_events(&mut self) {
        self.correlator.flush_events(&mut self.listener);
    }

    pub fn system_time(&self) -> Option<SttItem> {
        self.correlator.system_time()
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Count(usize);

    impl OutputListener for Count {
        fn on_pat_detected(&mut self, _items: &[psi::PatItem]) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_out_of_range() {
        let mut parser = TsParser::new(Count::default());
        let bytes = [0x47u8; 10];
        parser.feed_ts_data(&bytes, 8, 4);
        parser.feed_ts_data(&bytes, usize::MAX, 2);
        assert_eq!(parser.listener().0, 0);
        assert!(parser.incomplete_channels().is_empty());
        assert_eq!(parser.system_time(), None);
    }

    #[test]
    fn test_default_config() {
        let parser = TsParser::new(Count::default());
        assert!(parser.config().verify_crc);
        let parser = TsParser::with_config(Count::default(), Config { verify_crc: false });
        assert!(!parser.config().verify_crc);
    }
}
