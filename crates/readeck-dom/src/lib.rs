//! # readeck-dom
//!
//! A small owned, mutable HTML tree plus the URL/lazy-image helpers shared
//! by the Archiver and the standard processors (spec.md §4.C/§4.F).

mod absolutize;
mod dom;
mod lazy_image;
mod node;
mod serialize;

pub use absolutize::{absolutize, absolutize_srcset};
pub use dom::Dom;
pub use lazy_image::canonicalize_lazy_images;
pub use node::NodeId;
