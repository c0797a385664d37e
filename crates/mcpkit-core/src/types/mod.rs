//! Declaration types for every capability kind.
//!
//! # Overview
//!
//! - **Tools**: callable functions with a parameter schema
//! - **Resources**: static literal data or dynamically served contents
//! - **Prompts**: templated messages with arguments
//! - **Routers**: ordered groups of tools and nested routers
//! - **Skills**: groupings of hidden capabilities
//! - **Subscriptions** and **Completions**
//! - **Server metadata**: name, version and transport defaults

pub mod completion;
pub mod declaration;
pub mod prompt;
pub mod resource;
pub mod server;
pub mod skill;
pub mod tool;

// Re-export all public types at the module level
pub use completion::*;
pub use declaration::*;
pub use prompt::*;
pub use resource::*;
pub use server::*;
pub use skill::*;
pub use tool::*;
