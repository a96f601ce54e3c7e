pub mod crossover;
pub mod indicators;

pub use crossover::{compute_signal, MaCrossover};
pub use indicators::SmaIndicator;
