pub mod commission;
pub mod data;
pub mod errors;
pub mod event;
pub mod queue;
