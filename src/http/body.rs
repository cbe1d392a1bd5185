//! Response body pass-through with outcome tracking.
//!
//! The relay never buffers or reinterprets response bodies; frames from
//! upstream flow to the client as they arrive. This wrapper exists so the
//! session outcome is known when the stream actually finishes:
//! end-of-stream completes the session, a poll error is a mid-stream
//! failure (the status line is long gone, so the connection is simply
//! aborted), and dropping the body unfinished is a client abort — the
//! session's drop failsafe records it and hyper tears down the upstream
//! connection with the dropped body.

use std::pin::Pin;
use std::task::{Context, Poll};

use http_body::{Body, Frame, SizeHint};

use crate::error::FailureClass;
use crate::net::session::RelaySession;

/// Streams an upstream response body to the client unchanged while
/// observing its completion.
pub struct MonitoredBody<B> {
    inner: B,
    session: RelaySession,
}

impl<B> MonitoredBody<B> {
    pub fn new(inner: B, session: RelaySession) -> Self {
        Self { inner, session }
    }
}

impl<B> Body for MonitoredBody<B>
where
    B: Body + Unpin,
    B::Error: std::fmt::Display,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(None) => {
                this.session.complete();
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                this.session
                    .fail(FailureClass::MidStream, &e.to_string());
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
