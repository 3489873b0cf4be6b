#![doc = include_str!("../README.md")]

pub mod escape;
pub mod marshal;
pub mod plist;
pub mod table;

use eyre::{Result, WrapErr};
use table::UnicodeTable;

/// Decodes a Marshal dump of the unicode dataset into a typed table.
pub fn load_table(bytes: &[u8]) -> Result<UnicodeTable> {
    let value = marshal::decode(bytes).wrap_err("malformed Marshal data")?;
    UnicodeTable::from_value(value)
}
