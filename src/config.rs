use std::path::PathBuf;

/// Only rows with this product code survive cleaning.
pub const TARGET_PRODUCT: &str = "GLP";

pub const DEFAULT_DATA_PATH: &str = "data/ultimas-4-semanas-glp.csv";
pub const DEFAULT_DAYS_BACK: u64 = 30;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_RESULTS_LIMIT: usize = 1000;
pub const DEFAULT_WEEKS: usize = 4;

/// Runtime settings for one application context.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    /// Trailing window length, counted back from the newest collection date.
    pub days_back: u64,
    pub default_limit: usize,
    pub max_results: usize,
    pub weeks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            days_back: DEFAULT_DAYS_BACK,
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_results: MAX_RESULTS_LIMIT,
            weeks: DEFAULT_WEEKS,
        }
    }
}
