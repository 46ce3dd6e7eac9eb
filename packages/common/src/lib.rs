pub mod assets;
pub mod block;
pub mod error;
pub mod result;
pub mod visitor;

pub use assets::*;
pub use block::*;
pub use error::*;
pub use result::*;
pub use visitor::*;
