pub mod defaults;
pub mod http;
pub mod path_processing;
pub mod text_processing;

pub use defaults::*;
pub use path_processing::*;
pub use text_processing::*;
