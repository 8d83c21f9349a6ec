//! Joins tables that describe the same channel but arrive on different PIDs
//! in any order.
//!
//! PMT and VCT meet on the program number, EIT and ETT meet the VCT on the
//! source id. Whichever half of a relation arrives second fires the
//! listener; the first one only records state.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};
use serde_derive::Serialize;

use crate::listener::OutputListener;
use crate::psi::{PatItem, PmtItem, Table};
use crate::psip::{EitItem, EtmLocation, EttItem, MgtItem, SttItem, VctItem};
use crate::ts::Demuxer;

/// Progress of a relation. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handled {
    #[default]
    Unseen,
    WaitingForPeer,
    Ready,
}

impl Handled {
    fn wait(&mut self) {
        if *self == Handled::Unseen {
            *self = Handled::WaitingForPeer;
        }
    }
}

/// A program whose PMT is known but whose VCT entry is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunerChannel {
    pub program_number: u16,
    pub pmt_items: Vec<PmtItem>,
}

#[derive(Debug, Default)]
struct Program {
    pmt_items: Option<Vec<PmtItem>>,
    source_id: Option<u16>,
    state: Handled,
}

#[derive(Debug, Default)]
struct Source {
    vct: Option<VctItem>,
    description: Option<String>,
    events: Handled,
    delivered_events: Option<Vec<EitItem>>,
}

#[derive(Debug, Default)]
pub struct Correlator {
    programs: HashMap<u16, Program>,
    sources: HashMap<u16, Source>,
    eit_pids: Vec<u16>,
    ett_pids: Vec<u16>,
    // EIT-k pid to k, and the k of every event ETT-k.
    eit_slots: HashMap<u16, u16>,
    ett_slots: HashSet<u16>,
    eit_items: HashMap<(u16, u16), BTreeMap<u16, EitItem>>,
    ett_texts: HashMap<(u16, u16), BTreeMap<u16, String>>,
    system_time: Option<SttItem>,
}

impl Correlator {
    pub fn new() -> Correlator {
        Correlator::default()
    }

    pub fn program_state(&self, program_number: u16) -> Handled {
        self.programs
            .get(&program_number)
            .map(|p| p.state)
            .unwrap_or_default()
    }

    pub fn events_state(&self, source_id: u16) -> Handled {
        self.sources
            .get(&source_id)
            .map(|s| s.events)
            .unwrap_or_default()
    }

    pub fn eit_pids(&self) -> &[u16] {
        &self.eit_pids
    }

    pub fn ett_pids(&self) -> &[u16] {
        &self.ett_pids
    }

    pub fn system_time(&self) -> Option<SttItem> {
        self.system_time
    }

    /// Programs still waiting for their VCT entry, by program number.
    pub fn incomplete_channels(&self) -> Vec<TunerChannel> {
        let mut channels: Vec<TunerChannel> = self
            .programs
            .iter()
            .filter(|(_, p)| p.state == Handled::WaitingForPeer)
            .filter_map(|(&program_number, p)| {
                p.pmt_items.as_ref().map(|items| TunerChannel {
                    program_number,
                    pmt_items: items.clone(),
                })
            })
            .collect();
        channels.sort_by_key(|c| c.program_number);
        channels
    }

    pub fn handle<L: OutputListener>(
        &mut self,
        pid: u16,
        table: Table,
        demuxer: &mut Demuxer,
        listener: &mut L,
    ) {
        match table {
            Table::Pat(items) => self.on_pat(items, demuxer, listener),
            Table::Pmt {
                program_number,
                items,
            } => self.on_pmt(program_number, items, listener),
            Table::Mgt(items) => self.on_mgt(&items, demuxer, listener),
            Table::Vct(items) => self.on_vct(items, listener),
            Table::Eit { source_id, items } => self.on_eit(pid, source_id, items, listener),
            Table::Ett { source_id, items } => self.on_ett(pid, source_id, items, listener),
            Table::Stt(stt) => self.system_time = Some(stt),
        }
    }

    /// Delivers event lists that are still waiting for ETT texts, as long as
    /// their channel is complete.
    pub fn flush_events<L: OutputListener>(&mut self, listener: &mut L) {
        let mut source_ids: Vec<u16> = self.sources.keys().copied().collect();
        source_ids.sort_unstable();
        for source_id in source_ids {
            if !self.channel_ready(source_id) {
                continue;
            }
            let events = self.merged_events(source_id);
            if !events.is_empty() {
                self.deliver_events(source_id, events, listener);
            }
        }
    }

    fn on_pat<L: OutputListener>(
        &mut self,
        items: Vec<PatItem>,
        demuxer: &mut Demuxer,
        listener: &mut L,
    ) {
        for item in &items {
            if demuxer.register(item.pmt_pid) {
                debug!(
                    "program {}: pmt pid {:#06x}",
                    item.program_number, item.pmt_pid
                );
            }
        }
        listener.on_pat_detected(&items);
    }

    fn on_pmt<L: OutputListener>(
        &mut self,
        program_number: u16,
        items: Vec<PmtItem>,
        listener: &mut L,
    ) {
        let program = self.programs.entry(program_number).or_default();
        let changed = program.pmt_items.as_ref() != Some(&items);
        program.pmt_items = Some(items);
        let state = program.state;
        let source_id = program.source_id;
        match (state, source_id) {
            (Handled::Unseen, _) | (Handled::WaitingForPeer, None) => {
                program.state = Handled::WaitingForPeer;
            }
            (Handled::WaitingForPeer, Some(source_id)) => {
                program.state = Handled::Ready;
                self.deliver_channel(program_number, source_id, listener);
                self.update_events(source_id, listener);
            }
            (Handled::Ready, Some(source_id)) => {
                if changed {
                    self.deliver_channel(program_number, source_id, listener);
                }
            }
            (Handled::Ready, None) => {}
        }
    }

    fn on_vct<L: OutputListener>(&mut self, items: Vec<VctItem>, listener: &mut L) {
        for mut item in items {
            let source_id = item.source_id;
            let program_number = item.program_number;

            let source = self.sources.entry(source_id).or_default();
            item.description = source.description.clone();
            let changed = source.vct.as_ref() != Some(&item);
            source.vct = Some(item);

            let program = self.programs.entry(program_number).or_default();
            program.source_id = Some(source_id);
            match (program.state, program.pmt_items.is_some()) {
                (Handled::Ready, _) => {
                    if changed {
                        self.deliver_channel(program_number, source_id, listener);
                    }
                }
                (_, true) => {
                    program.state = Handled::Ready;
                    self.deliver_channel(program_number, source_id, listener);
                    self.update_events(source_id, listener);
                }
                (_, false) => program.state = Handled::WaitingForPeer,
            }
        }
    }

    fn on_mgt<L: OutputListener>(
        &mut self,
        items: &[MgtItem],
        demuxer: &mut Demuxer,
        listener: &mut L,
    ) {
        for item in items {
            let pid = item.table_type_pid;
            if let Some(slot) = item.eit_slot() {
                self.eit_slots.entry(pid).or_insert(slot);
            } else if let Some(slot) = item.event_ett_slot() {
                self.ett_slots.insert(slot);
            }
            if item.is_eit() && !self.eit_pids.contains(&pid) {
                info!("eit pid {:#06x}, table_type {:#06x}", pid, item.table_type);
                self.eit_pids.push(pid);
                demuxer.register(pid);
                listener.on_eit_pid_detected(pid);
            } else if item.is_ett() && !self.ett_pids.contains(&pid) {
                info!("ett pid {:#06x}, table_type {:#06x}", pid, item.table_type);
                self.ett_pids.push(pid);
                demuxer.register(pid);
                listener.on_ett_pid_detected(pid);
            }
        }
    }

    fn on_eit<L: OutputListener>(
        &mut self,
        pid: u16,
        source_id: u16,
        items: Vec<EitItem>,
        listener: &mut L,
    ) {
        if !self.eit_pids.contains(&pid) {
            debug!("eit for source {} on pid {:#06x} not from mgt", source_id, pid);
            return;
        }
        let events = self.eit_items.entry((pid, source_id)).or_default();
        for item in items {
            events.insert(item.event_id, item);
        }
        self.update_events(source_id, listener);
    }

    fn on_ett<L: OutputListener>(
        &mut self,
        pid: u16,
        source_id: u16,
        items: Vec<EttItem>,
        listener: &mut L,
    ) {
        if !self.ett_pids.contains(&pid) {
            debug!("ett for source {} on pid {:#06x} not from mgt", source_id, pid);
            return;
        }
        let mut event_texts = false;
        for item in items {
            if item.is_channel_description() {
                self.update_description(source_id, item.text, listener);
            } else {
                self.ett_texts
                    .entry((pid, source_id))
                    .or_default()
                    .insert(item.event_id, item.text);
                event_texts = true;
            }
        }
        if event_texts {
            self.update_events(source_id, listener);
        }
    }

    fn update_description<L: OutputListener>(
        &mut self,
        source_id: u16,
        text: String,
        listener: &mut L,
    ) {
        let source = self.sources.entry(source_id).or_default();
        if source.description.as_deref() == Some(text.as_str()) {
            return;
        }
        source.description = Some(text.clone());
        let program_number = match source.vct.as_mut() {
            Some(vct) => {
                vct.description = Some(text);
                vct.program_number
            }
            None => return,
        };
        if self.program_state(program_number) == Handled::Ready {
            self.deliver_channel(program_number, source_id, listener);
        }
    }

    fn channel_ready(&self, source_id: u16) -> bool {
        self.sources
            .get(&source_id)
            .and_then(|s| s.vct.as_ref())
            .map(|vct| self.program_state(vct.program_number) == Handled::Ready)
            .unwrap_or(false)
    }

    /// Events of all EIT PIDs for the source, deduplicated by event id, with
    /// the descriptions found on any ETT PID.
    fn merged_events(&self, source_id: u16) -> Vec<EitItem> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();
        for pid in &self.eit_pids {
            let items = match self.eit_items.get(&(*pid, source_id)) {
                Some(items) => items,
                None => continue,
            };
            for item in items.values() {
                if !seen.insert(item.event_id) {
                    continue;
                }
                let mut event = item.clone();
                event.description = self.event_text(source_id, event.event_id);
                events.push(event);
            }
        }
        events.sort_by_key(|e| e.start_time);
        events
    }

    fn event_text(&self, source_id: u16, event_id: u16) -> Option<String> {
        if event_id == 0 {
            return None;
        }
        self.ett_pids.iter().find_map(|pid| {
            self.ett_texts
                .get(&(*pid, source_id))
                .and_then(|texts| texts.get(&event_id))
                .cloned()
        })
    }

    /// Whether an event announces a text in this stream whose ETT is in the
    /// mgt but which has not arrived. EIT-k pairs with ETT-k.
    fn missing_texts(&self, source_id: u16) -> bool {
        self.eit_pids
            .iter()
            .filter(|pid| {
                self.eit_slots
                    .get(*pid)
                    .map_or(false, |slot| self.ett_slots.contains(slot))
            })
            .filter_map(|pid| self.eit_items.get(&(*pid, source_id)))
            .flat_map(|items| items.values())
            .any(|e| {
                e.etm_location == EtmLocation::ThisStream
                    && self.event_text(source_id, e.event_id).is_none()
            })
    }

    fn update_events<L: OutputListener>(&mut self, source_id: u16, listener: &mut L) {
        let events = self.merged_events(source_id);
        if events.is_empty() {
            return;
        }
        // the first list waits for texts that can still arrive, later
        // changes go out as they come.
        let delivered = self.events_state(source_id) == Handled::Ready;
        if !self.channel_ready(source_id) || (!delivered && self.missing_texts(source_id)) {
            self.sources.entry(source_id).or_default().events.wait();
            return;
        }
        self.deliver_events(source_id, events, listener);
    }

    fn deliver_events<L: OutputListener>(
        &mut self,
        source_id: u16,
        events: Vec<EitItem>,
        listener: &mut L,
    ) {
        let source = match self.sources.get_mut(&source_id) {
            Some(source) if source.vct.is_some() => source,
            _ => return,
        };
        if source.delivered_events.as_ref() == Some(&events) {
            return;
        }
        source.events = Handled::Ready;
        if let Some(vct) = source.vct.as_ref() {
            debug!("source {}: {} events", source_id, events.len());
            listener.on_eit_items_parsed(vct, &events);
        }
        source.delivered_events = Some(events);
    }

    fn deliver_channel<L: OutputListener>(
        &self,
        program_number: u16,
        source_id: u16,
        listener: &mut L,
    ) {
        let pmt_items = self
            .programs
            .get(&program_number)
            .and_then(|p| p.pmt_items.as_ref());
        let vct = self.sources.get(&source_id).and_then(|s| s.vct.as_ref());
        if let (Some(pmt_items), Some(vct)) = (pmt_items, vct) {
            info!(
                "channel {}-{} {:?}: program {}, source {}",
                vct.major_channel_number,
                vct.minor_channel_number,
                vct.short_name,
                program_number,
                source_id
            );
            listener.on_vct_item_parsed(vct, pmt_items);
        }
    }
}
