//! In-process stand-ins for external systems

pub mod instrument;

pub use instrument::{InstrumentSettings, SimulatedInstrument};
