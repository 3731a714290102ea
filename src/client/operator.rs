//! Operator console for the start trigger.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use super::client::ClientError;
use crate::core::constants::START_COMMAND;

/// Line-oriented console the client blocks on before requesting the result.
pub struct OperatorConsole<R, W> {
    lines: Lines<R>,
    output: W,
}

impl OperatorConsole<BufReader<Stdin>, Stdout> {
    /// Console bound to the process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> OperatorConsole<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a console over arbitrary input and output.
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
        }
    }

    /// Prompt until the operator enters `start` (any case). No timeout.
    ///
    /// Fails with [`ClientError::OperatorInputClosed`] if the input ends first.
    pub async fn wait_for_start(&mut self) -> Result<(), ClientError> {
        self.output
            .write_all(b"\nType 'start' to receive the processed file from the server:\n")
            .await?;

        loop {
            self.output.write_all(b"> ").await?;
            self.output.flush().await?;

            let Some(line) = self.lines.next_line().await? else {
                return Err(ClientError::OperatorInputClosed);
            };
            if is_start(&line) {
                return Ok(());
            }
            self.output
                .write_all(b"Invalid command. Please type 'start'.\n")
                .await?;
        }
    }
}

/// Check if an operator line is the start trigger.
pub fn is_start(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(START_COMMAND)
}
