mod config;
mod controller;
mod highlight;
mod resolver;
mod session;

pub use config::*;
pub use controller::*;
pub use highlight::*;
pub use resolver::*;
pub use session::*;
