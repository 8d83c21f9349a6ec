#[macro_use]
extern crate macros;

pub mod correlate;
pub mod listener;
pub mod parser;
pub mod psi;
pub mod psip;
pub mod ts;
mod util;

pub use crate::correlate::{Handled, TunerChannel};
pub use crate::listener::OutputListener;
pub use crate::parser::{Config, TsParser};
