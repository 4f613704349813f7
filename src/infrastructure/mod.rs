pub mod broadcast_notifier;
pub mod clock;
pub mod console_notifier;
pub mod event_bus;
pub mod memory_store;
pub mod multi_notifier;
pub mod sqlite_store;
pub mod webhook_notifier;
