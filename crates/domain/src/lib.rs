pub mod errors;
pub mod scope;
pub mod todo;
pub mod window;

pub use errors::*;
pub use scope::*;
pub use todo::*;
pub use window::*;
