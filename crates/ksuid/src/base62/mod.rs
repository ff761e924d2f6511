mod codec;
mod error;
mod formatter;

pub use codec::*;
pub use error::*;
pub use formatter::*;
