pub mod api;
pub mod breakdown;
