//! GLP price report pipeline.
//!
//! Reads the agency's `;`-separated price survey, keeps valid GLP rows from
//! the trailing window, reduces them to the latest price per reseller and
//! answers search, listing and KPI queries over that working set.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use glp_report::{Config, PriceService, WorkingSet};
//!
//! let config = Config::default();
//! let (set, _report) = WorkingSet::build(Path::new("data/glp.csv"), config.days_back).unwrap();
//! let service = PriceService::new(Arc::new(set), config);
//! let stats = service.stats(Some("SP"), None).unwrap();
//! println!("{:?}", stats.avg_price.current);
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod reports;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{ErrorBody, GlpError, IngestError, QueryError, Result};
pub use pipeline::{PipelineReport, SharedWorkingSet, WorkingSet};
pub use query::{PriceService, QueryFacade};
pub use types::Record;
