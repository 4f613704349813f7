//! Per-user action cooldown timers.
//!
//! [`application::TimerStore`] owns timer state (durable repository plus an
//! in-memory mirror) and the notification outbox; the
//! [`application::ExpiryScheduler`] drains the outbox on a fixed interval and
//! hands expired timers to a [`application::Notifier`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
