pub mod colors;
pub mod logging;
pub mod path;
pub mod table;
