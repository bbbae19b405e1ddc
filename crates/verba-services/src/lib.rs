pub mod free_dictionary;
pub mod google_translate;
pub mod linguee;
pub mod registry;
pub mod text;
pub mod wordnik;

pub use registry::{ServiceKey, ServiceKind, ServiceRegistry};
