//! These models represent the objects passed between the caller, the agent and the API
//!
//! The transcript is kept in these internal structs and only converted to the Anthropic
//! wire format at the provider boundary (see `providers::utils`). Tool calls and tool
//! results are first-class content blocks so the loop can correlate them by id.
pub mod message;
pub mod role;
pub mod tool;
