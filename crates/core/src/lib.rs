pub mod config;
pub mod money;
pub mod text;

pub use config::{ConfigError, PassWeight, ScanConfig};
pub use money::{Baht, BAHT_SUFFIX};
pub use text::{is_thai_letter_or_digit, normalize_for_match, normalize_text};
