mod activity;
mod breach;
mod bureau;
mod status;
mod workflow;

pub use activity::*;
pub use breach::*;
pub use bureau::*;
pub use status::*;
pub use workflow::*;
