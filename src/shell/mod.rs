pub mod parser;
pub mod r#loop;

pub use parser::{parse_command, Command};
pub use r#loop::{process_line, run_shell_loop, Shell};
