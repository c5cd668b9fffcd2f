//! Line dispatcher — the line protocol on top of the session controller.
//!
//! A reader loop pulls lines off the input channel into a bounded queue; a
//! single worker loop takes them one at a time and runs
//! validate → control → encode to completion before looking at the next.
//! That single worker is what keeps two step sequences from ever running
//! at once, and what keeps results in request order.
//!
//! There is no per-request timeout: a hung automation backend stalls the
//! worker and therefore every request queued behind it.

use tablebot_domain::id::RequestId;
use tablebot_domain::request::parse_line;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::ports::{AutomationBackend, CredentialSource};
use crate::services::session_controller::SessionController;

/// Fatal dispatcher errors. Anything else is answered on the output channel.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Reading the input channel failed.
    #[error("failed to read from input channel")]
    Input(#[source] std::io::Error),

    /// Writing the output channel failed.
    #[error("failed to write to output channel")]
    Output(#[source] std::io::Error),
}

/// Serves the line protocol, one request at a time.
pub struct LineDispatcher<B, C> {
    controller: SessionController<B, C>,
    queue_capacity: usize,
}

impl<B, C> LineDispatcher<B, C>
where
    B: AutomationBackend,
    C: CredentialSource,
{
    /// Create a dispatcher. `queue_capacity` bounds how many lines may be
    /// read ahead of the request being served; it is raised to 1 if zero.
    pub fn new(controller: SessionController<B, C>, queue_capacity: usize) -> Self {
        Self {
            controller,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// The controller requests are served with.
    pub fn controller(&self) -> &SessionController<B, C> {
        &self.controller
    }

    /// Serve every line of `input` until end-of-input, writing one result
    /// line per non-blank input line to `output`.
    ///
    /// Lines already queued when the input closes are still answered.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when either channel fails; a bad request
    /// never does.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<(), DispatchError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (sender, mut receiver) = mpsc::channel::<String>(self.queue_capacity);

        let reader = async move {
            let mut lines = input.lines();
            while let Some(line) = lines.next_line().await.map_err(DispatchError::Input)? {
                let line = line.trim();
                if line.is_empty() {
                    debug!("ignoring blank line");
                    continue;
                }
                if sender.send(line.to_string()).await.is_err() {
                    // the worker is gone, its error is reported instead
                    break;
                }
            }
            info!("input channel closed");
            Ok::<_, DispatchError>(())
        };

        let worker = async move {
            let mut output = output;
            while let Some(line) = receiver.recv().await {
                let Some(encoded) = self.handle_line(&line).await else {
                    continue;
                };
                write_line(&mut output, &encoded)
                    .await
                    .map_err(DispatchError::Output)?;
            }
            Ok::<_, DispatchError>(())
        };

        // a failed output ends the run even while the input is still open
        tokio::try_join!(reader, worker)?;
        Ok(())
    }

    /// Run one non-blank line through validation, the controller, and the
    /// encoder.
    ///
    /// Returns the encoded result line, or `None` when encoding failed (the
    /// failure is logged and nothing is written for this request).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let request_id = RequestId::new();
        let span = info_span!("request", %request_id);
        async {
            debug!(%line, "received line");
            let result = match parse_line(line) {
                Ok(request) => {
                    info!(
                        date = request.date(),
                        region = request.region(),
                        time_preference = request.time_preference(),
                        search_term = request.search_term(),
                        party_size = request.party_size(),
                        "request accepted"
                    );
                    self.controller.run(&request).await.into_result()
                }
                Err(err) => {
                    warn!(error = %err, "request rejected");
                    err.to_result()
                }
            };
            info!(is_error = result.is_error(), message = result.message(), "request finished");

            match result.encode() {
                Ok(encoded) => Some(encoded),
                Err(err) => {
                    error!(error = %err, cause = %err.0, "cannot encode result, no output line written");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
