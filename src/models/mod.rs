//! Tool parameter models for the Opsify API.
//!
//! One module per upstream resource. Every parameter struct doubles as the
//! tool's input schema and implements [`Adapter`](crate::Adapter).

mod cve;
mod product;
mod release;
mod types;

pub use cve::*;
pub use product::*;
pub use release::*;
pub use types::*;
