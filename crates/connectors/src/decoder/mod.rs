use crate::error::DecodeError;
use model::pagination::PageResponse;
use serde_json::Value;

pub mod gdata;

pub use gdata::{GDataFeedDecoder, RawEntry};

/// Turns a raw response body into a typed page.
///
/// Decoders own every detail of the wire format; the stream only ever sees
/// the resulting records and the optional total count.
pub trait PageDecoder: Send + Sync {
    type Record: Send;

    fn decode(&self, body: Value) -> Result<PageResponse<Self::Record>, DecodeError>;
}

/// Adapts a plain function or closure into a [`PageDecoder`].
#[derive(Clone)]
pub struct FnDecoder<F>(F);

impl<F> FnDecoder<F> {
    pub fn new(f: F) -> Self {
        FnDecoder(f)
    }
}

impl<F, R> PageDecoder for FnDecoder<F>
where
    F: Fn(Value) -> Result<PageResponse<R>, DecodeError> + Send + Sync,
    R: Send,
{
    type Record = R;

    fn decode(&self, body: Value) -> Result<PageResponse<R>, DecodeError> {
        (self.0)(body)
    }
}
