//! Static file resolution and response building.
//!
//! - **`resolver`**: maps a decoded request target to a path under the document root
//! - **`handler`**: applies the method/version gate, reads the file and builds the response

pub mod handler;
pub mod resolver;

pub use handler::StaticHandler;
pub use resolver::{PathResolver, ResolveError};
