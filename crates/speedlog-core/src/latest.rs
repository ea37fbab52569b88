//! Most recent record via tail access.

use crate::error::LogError;
use crate::record::Record;
use crate::store::LogStore;

/// Decode the last complete line of the log.
///
/// Only the tail of the file is read. `None` if the log is missing, empty, or
/// its last line is not a valid record.
pub fn latest(store: &LogStore) -> Result<Option<Record>, LogError> {
    let Some(line) = store.tail_line()? else {
        return Ok(None);
    };
    match Record::decode(&line) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            log::debug!("{}: last line is not a record: {e}", store.path().display());
            Ok(None)
        }
    }
}
