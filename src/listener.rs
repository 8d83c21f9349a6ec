use crate::psi::{PatItem, PmtItem};
use crate::psip::{EitItem, VctItem};

/// Receives the correlated results of a [`TsParser`](crate::parser::TsParser).
///
/// Every method defaults to doing nothing so a listener only implements what
/// it consumes.
pub trait OutputListener {
    /// Every decoded PAT, repeats included.
    fn on_pat_detected(&mut self, _items: &[PatItem]) {}

    fn on_eit_pid_detected(&mut self, _pid: u16) {}

    fn on_ett_pid_detected(&mut self, _pid: u16) {}

    /// A channel whose VCT entry and PMT are both known. Called again when
    /// its description is refined or either half changes.
    fn on_vct_item_parsed(&mut self, _channel: &VctItem, _pmt_items: &[PmtItem]) {}

    fn on_eit_items_parsed(&mut self, _channel: &VctItem, _items: &[EitItem]) {}
}

impl<L: OutputListener + ?Sized> OutputListener for &mut L {
    fn on_pat_detected(&mut self, items: &[PatItem]) {
        (**self).on_pat_detected(items)
    }

    fn on_eit_pid_detected(&mut self, pid: u16) {
        (**self).on_eit_pid_detected(pid)
    }

    fn on_ett_pid_detected(&mut self, pid: u16) {
        (**self).on_ett_pid_detected(pid)
    }

    fn on_vct_item_parsed(&mut self, channel: &VctItem, pmt_items: &[PmtItem]) {
        (**self).on_vct_item_parsed(channel, pmt_items)
    }

    fn on_eit_items_parsed(&mut self, channel: &VctItem, items: &[EitItem]) {
        (**self).on_eit_items_parsed(channel, items)
    }
}
