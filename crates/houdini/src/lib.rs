pub mod buffer;
pub mod command;
pub mod config;
mod entities;
pub mod error;
mod hex;
pub mod href;
pub mod html;
pub mod js;
pub mod mode;
pub mod uri;
pub mod xml;

pub use buffer::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use href::*;
pub use html::*;
pub use js::*;
pub use mode::*;
pub use uri::*;
pub use xml::*;
