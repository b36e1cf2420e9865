#[macro_use]
mod par;

pub mod align;
pub mod alphabets;
pub mod config;
pub mod error;
pub mod io;
pub mod phylo;
pub mod pipeline;
pub mod queries;
pub mod refs;
pub mod runlog;
pub mod vu;

pub use config::PaparaConfig;
pub use error::{PaparaError, PaparaResult};
