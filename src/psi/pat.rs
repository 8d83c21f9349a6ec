use anyhow::{bail, Result};
use serde_derive::Serialize;

use crate::psi::Section;
use crate::util;

/// One program of a program association section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatItem {
    pub program_number: u16,
    pub pmt_pid: u16,
}

/// Program number 0 points at the network PID and is left out.
pub fn parse_pat(section: &Section) -> Result<Vec<PatItem>> {
    let mut map = section.body;
    if map.len() % 4 != 0 {
        bail!("invalid program association length {}", map.len());
    }
    let mut items = Vec::with_capacity(map.len() / 4);
    while !map.is_empty() {
        let program_number = util::read_u16(map)?;
        let pmt_pid = util::read_pid(&map[2..])?;
        if program_number != 0 {
            items.push(PatItem {
                program_number,
                pmt_pid,
            });
        }
        map = &map[4..];
    }
    Ok(items)
}
