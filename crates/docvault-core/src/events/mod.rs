//! Domain events emitted towards the notifier boundary.

pub mod share;

pub use share::ShareEvent;
