pub mod domain;
pub mod infrastructure;

pub use domain::TypeDictionary;
pub use infrastructure::build_type_dictionary;
