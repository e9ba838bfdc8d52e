pub mod crossfade;
pub mod frame;
