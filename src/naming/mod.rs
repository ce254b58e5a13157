//! Deterministic name derivation: free-form disc/track name parsing,
//! filesystem-safe character cleaning, and the naming template language.

pub mod clean;
pub mod parser;
pub mod template;

pub use clean::clean_name;
pub use parser::{extract_disc_info, extract_track_number, extract_track_title, DiscInfo};
pub use template::{TemplateBindings, TemplateError, TemplateResolver};
