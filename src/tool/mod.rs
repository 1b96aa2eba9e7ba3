// ABOUTME: Tool module - the Tool trait, tool results, and the name registry.
// ABOUTME: Agents reach external data only through these tools.

mod registry;
mod result;
mod traits;

pub use registry::*;
pub use result::*;
pub use traits::*;
