pub(crate) mod clock;
pub(crate) mod export;
mod sequencer;
