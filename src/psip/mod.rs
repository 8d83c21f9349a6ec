//! ATSC program and system information protocol tables.

mod eit;
pub use self::eit::*;

mod ett;
pub use self::ett::*;

mod mgt;
pub use self::mgt::*;

mod stt;
pub use self::stt::*;

mod vct;
pub use self::vct::*;

pub mod string;

pub const MASTER_GUIDE_TABLE: u8 = 0xc7;
pub const TERRESTRIAL_VIRTUAL_CHANNEL_TABLE: u8 = 0xc8;
pub const CABLE_VIRTUAL_CHANNEL_TABLE: u8 = 0xc9;
pub const EVENT_INFORMATION_TABLE: u8 = 0xcb;
pub const EXTENDED_TEXT_TABLE: u8 = 0xcc;
pub const SYSTEM_TIME_TABLE: u8 = 0xcd;
