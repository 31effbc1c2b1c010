#![forbid(unsafe_code)]

mod build;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;

pub use build::{collect, collect_into, PakBuilder};

pub use error::{PakError, PakResult};
pub use format::{archive_len, table_len, Entry};
pub use path::{derive_name, expand_inputs};
pub use read::{check_layout, read_table, PakFile, PakView};

pub use ops::{extract, list, pack, verify, Summary};
