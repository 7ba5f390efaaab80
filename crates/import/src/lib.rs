pub mod ing;
pub mod presets;
pub mod statement;

pub use ing::IngParser;
pub use presets::{PresetBook, PresetError, PresetLabel, PresetRule};
pub use statement::{Statement, StatementError, StatementFile, StatementParser};
