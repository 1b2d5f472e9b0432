pub mod face;
pub mod verification;
