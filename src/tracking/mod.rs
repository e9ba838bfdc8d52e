pub mod cluster;
pub mod tracker;
