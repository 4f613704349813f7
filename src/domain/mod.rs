pub mod types;
pub mod catalog;
pub mod availability;
pub mod timer;
pub mod notification;
pub mod audit;

pub use types::*;
pub use catalog::*;
pub use availability::*;
pub use timer::*;
pub use notification::*;
pub use audit::*;
