use crate::AppResult;

use audio_recorder_core::{BridgeRejection, StatusEvent};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// One JSON line written to stdout.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConsoleLine<'a> {
    /// A command succeeded.
    Response {
        /// Command name.
        command: &'static str,
        /// Bridge payload.
        result: serde_json::Value,
    },
    /// The recorder refused a command.
    Rejection {
        /// Command name.
        command: &'static str,
        /// Tag and message.
        #[serde(flatten)]
        rejection: BridgeRejection,
    },
    /// `onRecordingStatusChanged`
    Event(&'a StatusEvent),
    /// The input line was not a command.
    Error {
        /// What was wrong with it.
        message: String,
    },
}

impl ConsoleLine<'_> {
    /// Write as a single newline-terminated JSON object and flush.
    pub async fn write_to<W>(&self, output: &mut W) -> AppResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        output.write_all(json.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }
}
