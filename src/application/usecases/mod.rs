pub mod dismiss_notification;
pub mod list_timers;
pub mod request_activation;
pub mod request_cancellation;
pub mod run_scan;
pub mod start_custom_timer;

pub use dismiss_notification::*;
pub use list_timers::*;
pub use request_activation::*;
pub use request_cancellation::*;
pub use run_scan::*;
pub use start_custom_timer::*;
