pub mod r#loop;
pub mod options;
pub mod parser;

pub use options::{OptionType, UciOption, UciOptions};
pub use parser::{parse_uci_command, GoParams, UciCommand};
pub use r#loop::{process_uci_line, run_uci_loop, UciEngine, UciState};
