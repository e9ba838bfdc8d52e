pub mod schedule;
pub mod significance;
pub mod smooth;
