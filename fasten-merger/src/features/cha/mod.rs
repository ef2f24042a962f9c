pub mod domain;
pub mod infrastructure;

pub use domain::UniversalCha;
pub use infrastructure::build_universal_cha;
