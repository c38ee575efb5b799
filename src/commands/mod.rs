mod extract_command;
pub use extract_command::*;

mod serve_command;
pub use serve_command::*;
