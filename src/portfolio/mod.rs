pub mod growth;

pub use growth::{simulate_growth, GrowthReport, ValuePoint};
