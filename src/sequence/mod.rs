pub mod clock;
pub mod script;
pub mod sequencer;
