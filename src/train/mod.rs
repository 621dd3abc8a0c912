pub mod epoch;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use epoch::{evaluate_batch, train_batch, EpochRunner, PerformanceFn, PreprocessFn};
pub use epoch_stats::EpochStats;
pub use train_config::FitConfig;
pub use loop_fn::fit;
