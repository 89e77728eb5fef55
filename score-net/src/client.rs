//! Blocking client for the remote pitch service.
//!
//! One connection per exchange, every step bounded by a timeout: the
//! remote call is the only potentially blocking operation in the
//! detection pipeline, and the driver must be able to fall back to
//! the local analyzer within the same cycle.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use log::debug;

use score_core::pipeline::RemoteDetector;
use score_core::PitchEstimate;

use crate::framing::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// How long to wait for a TCP connection before giving up.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Per-request read/write deadline.
pub const IO_TIMEOUT: Duration = Duration::from_millis(500);

/// Client for a [`crate::PitchServer`] instance.
#[derive(Debug, Clone)]
pub struct BackendClient {
    addr: SocketAddr,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl BackendClient {
    /// Resolves `addr` (e.g. `"127.0.0.1:7878"`) and builds a client
    /// with the default timeouts. No connection is made yet.
    pub fn new(addr: &str) -> Result<Self> {
        let addr = addr
            .to_socket_addrs()
            .with_context(|| format!("invalid backend address {addr:?}"))?
            .next()
            .ok_or_else(|| anyhow!("backend address {addr:?} resolved to nothing"))?;

        Ok(Self {
            addr,
            connect_timeout: CONNECT_TIMEOUT,
            io_timeout: IO_TIMEOUT,
        })
    }

    /// Overrides the default connect and I/O timeouts.
    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    /// One request/response exchange on a fresh connection.
    fn exchange(&self, request: &Request) -> Result<Response> {
        let stream = TcpStream::connect_timeout(&self.addr, self.connect_timeout)
            .with_context(|| format!("connecting to pitch service at {}", self.addr))?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        let mut writer = BufWriter::new(stream.try_clone()?);
        let mut reader = BufReader::new(stream);

        write_frame(&mut writer, request).context("sending request")?;
        let response = read_frame(&mut reader).context("reading response")?;

        if let Response::Error { message } = &response {
            bail!("pitch service rejected the request: {message}");
        }
        Ok(response)
    }

    /// Whether the service answers its health probe.
    pub fn check_health(&self) -> bool {
        match self.exchange(&Request::Health) {
            Ok(Response::Health { .. }) => true,
            Ok(other) => {
                debug!("unexpected health reply: {other:?}");
                false
            }
            Err(err) => {
                debug!("health probe failed: {err}");
                false
            }
        }
    }

    /// Remote pitch detection for one audio buffer.
    ///
    /// `Ok(None)` means the service was reachable but heard no usable
    /// pitch; any transport problem is an `Err` and the caller falls
    /// back to the local analyzer.
    pub fn detect_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Option<PitchEstimate>> {
        let response = self.exchange(&Request::DetectPitch {
            samples: samples.to_vec(),
            sample_rate,
        })?;
        match response {
            Response::Pitch { pitch, .. } => Ok(pitch),
            other => bail!("unexpected reply to DetectPitch: {other:?}"),
        }
    }

    /// Maps a set of detected frequencies to note names.
    pub fn analyze_chord(&self, frequencies: &[f32]) -> Result<Vec<PitchEstimate>> {
        let response = self.exchange(&Request::AnalyzeChord {
            frequencies: frequencies.to_vec(),
        })?;
        match response {
            Response::Notes { notes, .. } => Ok(notes),
            other => bail!("unexpected reply to AnalyzeChord: {other:?}"),
        }
    }

    /// Remote mirror of the local note-to-frequency conversion.
    /// `Ok(None)` means the pitch class was not a valid name.
    pub fn note_to_frequency(&self, note: &str, octave: i32) -> Result<Option<f32>> {
        let response = self.exchange(&Request::NoteToFrequency {
            note: note.to_string(),
            octave,
        })?;
        match response {
            Response::Frequency { frequency, .. } => Ok(frequency),
            other => bail!("unexpected reply to NoteToFrequency: {other:?}"),
        }
    }
}

impl RemoteDetector for BackendClient {
    fn detect_pitch(&mut self, samples: &[f32], sample_rate: u32) -> Result<Option<PitchEstimate>> {
        BackendClient::detect_pitch(self, samples, sample_rate)
    }

    fn health_check(&mut self) -> bool {
        self.check_health()
    }
}
