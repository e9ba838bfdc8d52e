pub mod eras;
pub mod synth;
