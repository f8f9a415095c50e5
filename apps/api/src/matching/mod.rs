// Interest-based community matching: catalog generation, recommendation
// scoring, and the shared interest/token utilities.
// All generative calls go through the completion provider — no direct API
// calls from this module.

pub mod generator;
pub mod handlers;
pub mod interests;
pub mod prompts;
pub mod scorer;
