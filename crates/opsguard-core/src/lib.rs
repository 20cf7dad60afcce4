pub mod audit;
pub mod channel;
pub mod error;
pub mod escalation;
pub mod event;
pub mod ids;
pub mod incident;
pub mod integration;
pub mod notification;
pub mod ratelimit;
pub mod schedule;
pub mod user;
