pub mod face;
pub mod staging;
