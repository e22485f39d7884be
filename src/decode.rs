//! Streaming decoder for the ports catalog file.
//!
//! The catalog is a single huge JSON object keyed by port id, so it cannot be
//! read with a plain `serde_json::from_reader` without holding the whole
//! thing in memory. Instead the object is walked entry by entry on a blocking
//! task which feeds a bounded channel; [`PortStream`] is the pulling end of
//! that channel and yields ports lazily, in file order.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::{self, DeserializeSeed, MapAccess, Visitor};
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::Port;
use crate::error::{Error, Result};

/// How many decoded ports may queue up between the decode task and its
/// consumer before the decoder stops reading ahead.
const CHANNEL_CAPACITY: usize = 64;

/// A lazy, forward-only stream of ports decoded from one catalog file.
///
/// Dropping the stream stops the decode task at its next emit, so abandoning
/// a stream mid-file never leaks the background task or the file handle.
#[derive(Debug)]
pub struct PortStream {
    rx: mpsc::Receiver<Result<Port>>,
}

impl PortStream {
    /// Open `path` and start decoding its top-level object in the background.
    ///
    /// The file is opened eagerly so an unreadable path fails here, before
    /// anything is dispatched downstream.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        file.metadata().map_err(|source| Error::Io { path, source })?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::task::spawn_blocking(move || decode_object(file, tx));

        Ok(Self { rx })
    }

    /// The next decoded port, in file order.
    ///
    /// Yields `None` once the object is exhausted. A `Format` or `Record`
    /// error is the last item ever produced.
    pub async fn next(&mut self) -> Option<Result<Port>> {
        self.rx.recv().await
    }
}

/// Runs on the blocking pool; owns the file handle until it returns.
fn decode_object(file: File, tx: mpsc::Sender<Result<Port>>) {
    let mut state = DecodeState::default();
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));

    let outcome = ObjectSeed {
        tx: &tx,
        state: &mut state,
    }
    .deserialize(&mut de);

    match outcome {
        Ok(()) => {}
        Err(_) if state.receiver_gone => {
            debug!("port stream dropped before end of input, stopping decode");
        }
        Err(source) => {
            // A failure while a key is in flight means that entry's value
            // did not decode; anything else is broken framing.
            let err = match state.current_key.take() {
                Some(key) => Error::Record { key, source },
                None => Error::Format(source.to_string()),
            };
            let _ = tx.blocking_send(Err(err));
        }
    }
}

#[derive(Default)]
struct DecodeState {
    current_key: Option<String>,
    receiver_gone: bool,
}

/// Visits the top-level object and emits one port per entry. Anything other
/// than an object at the top level fails with this visitor's expectation
/// message before a single port is produced.
struct ObjectSeed<'a> {
    tx: &'a mpsc::Sender<Result<Port>>,
    state: &'a mut DecodeState,
}

impl<'de> DeserializeSeed<'de> for ObjectSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for ObjectSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a top-level object keyed by port id")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<String>()? {
            self.state.current_key = Some(key.clone());
            let mut port: Port = map.next_value()?;
            self.state.current_key = None;

            // The container key always wins over whatever id the payload claims.
            port.id = key;

            if self.tx.blocking_send(Ok(port)).is_err() {
                self.state.receiver_gone = true;
                return Err(de::Error::custom("port stream receiver dropped"));
            }
        }

        Ok(())
    }
}
