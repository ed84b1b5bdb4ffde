pub mod aggregator;
pub mod classifier;
pub mod clock;
