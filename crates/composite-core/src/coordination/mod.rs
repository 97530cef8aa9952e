//! Main coordination logic

pub mod decision;
pub mod waiter;

pub use decision::decide;
pub use waiter::CheckWaiter;
