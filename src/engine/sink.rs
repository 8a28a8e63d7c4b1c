//! Creating `rodio` sinks for queue items.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::QueueItem;

#[derive(Debug, thiserror::Error)]
pub(super) enum SinkError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: rodio::decoder::DecoderError,
    },
}

/// Create a paused `Sink` for `item` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    item: &QueueItem,
    start_at: Duration,
) -> Result<Sink, SinkError> {
    let file = File::open(&item.source).map_err(|source| SinkError::Open {
        path: item.source.display().to_string(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|source| SinkError::Decode {
            path: item.source.display().to_string(),
            source,
        })?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
