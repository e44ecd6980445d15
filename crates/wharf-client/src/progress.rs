//! Caller-facing sink contracts and build-stream inspection.

use crate::logs::LogMessage;
use crate::types::ProgressStatus;

/// Prefix of the build stream line announcing the built image.
const BUILT_IMAGE_PREFIX: &str = "Successfully built ";

/// Receives incremental status of a build/push/pull operation.
///
/// Invoked synchronously from the streaming pull-loop, in daemon order;
/// implementations must not block indefinitely.
pub trait ProgressMonitor: Send {
    /// Called once per decoded progress message.
    fn update_progress(&mut self, status: &ProgressStatus);
}

/// Receives container/exec output lines.
///
/// Invoked synchronously from the streaming pull-loop, in daemon order;
/// implementations must not block indefinitely.
pub trait LogMessageProcessor: Send {
    /// Called once per decoded log frame.
    fn process(&mut self, message: &LogMessage);
}

/// Extracts the built image id from a build progress line.
///
/// Matches the literal `"Successfully built "` prefix followed by a maximal
/// run of hex digits. This is a daemon output heuristic, not a stable
/// contract; a line without the prefix (or with an empty id) yields `None`.
#[must_use]
pub fn build_image_id(status: &ProgressStatus) -> Option<String> {
    let stream = status.stream.as_deref()?;
    let id = stream.strip_prefix(BUILT_IMAGE_PREFIX)?;
    let hex_len = id.chars().take_while(char::is_ascii_hexdigit).count();
    if hex_len == 0 {
        return None;
    }
    Some(id[..hex_len].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_line(line: &str) -> ProgressStatus {
        ProgressStatus {
            stream: Some(line.to_string()),
            ..ProgressStatus::default()
        }
    }

    #[test]
    fn extracts_hex_id_after_prefix() {
        let status = stream_line("Successfully built 4f2e8a91");
        assert_eq!(build_image_id(&status).as_deref(), Some("4f2e8a91"));
    }

    #[test]
    fn stops_at_first_non_hex_character() {
        let status = stream_line("Successfully built abc123xyz\n");
        assert_eq!(build_image_id(&status).as_deref(), Some("abc123"));
    }

    #[test]
    fn line_without_prefix_yields_no_id() {
        assert!(build_image_id(&stream_line("Step 2/4 : RUN make")).is_none());
        assert!(build_image_id(&ProgressStatus::default()).is_none());
    }

    #[test]
    fn prefix_without_id_yields_no_id() {
        assert!(build_image_id(&stream_line("Successfully built ")).is_none());
    }
}
