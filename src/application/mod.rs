pub mod key_locks;
pub mod outbox;
pub mod ports;
pub mod scheduler;
pub mod timer_store;
pub mod usecases;

pub use key_locks::*;
pub use outbox::*;
pub use ports::*;
pub use scheduler::*;
pub use timer_store::*;
