#[macro_use]
mod handles;
mod circuit;
mod config;
mod observer;
mod part_config;
mod registry;
mod resolver;
mod state;
mod stimulus;
pub use circuit::{Circuit, Endpoint, NetView};
pub use config::*;
pub use handles::*;
pub use observer::*;
pub use part_config::*;
pub use registry::*;
pub use resolver::*;
pub use state::*;
