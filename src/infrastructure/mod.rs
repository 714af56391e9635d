//! Infrastructure layer: ambient concerns that sit outside the build
//! pipeline and executor proper — configuration and logging.

mod config;
mod logging;

pub use config::Config;
pub use logging::init_logging;
