pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod names;
pub mod attendance;
pub mod gradebook;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use names::*;
pub use attendance::*;
pub use gradebook::*;
