use ocf::rep::Representation;
use ocf::status::Status;

use tracing::{info, warn};

use crate::text::TextBuffer;

/// Writes every textual field of `payload` into `text`, in order.
///
/// A later field overwrites an earlier one. The first non-textual field
/// aborts the write with [`Status::BadRequest`], keeping the fields written
/// before it.
///
/// Returns [`Status::Changed`] when every field is textual, an empty
/// payload included.
pub fn write_text(text: &mut TextBuffer, payload: &Representation) -> Status {
    for entry in payload {
        let Some(value) = entry.value.as_str() else {
            warn!(
                "key: {} has a {} value, text expected",
                entry.name,
                entry.value.value_type()
            );
            return Status::BadRequest;
        };

        text.store(value);
        info!("key: {} value: {}", entry.name, text.as_str_lossy());
    }

    Status::Changed
}
