//! Portfolio Computation
//!
//! Aggregation of wallet data and the change gate for scheduled posts.

mod aggregator;
mod change;

pub use aggregator::PortfolioAggregator;
pub use change::ChangeDetector;
