pub mod polygon;
pub mod sphere;
