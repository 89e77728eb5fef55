//! TCP server for the remote pitch service.
//!
//! Accepts connections and answers framed requests with score-core's
//! own analyzer and note mapper, so a remote answer can never drift
//! from what the local fallback path would have computed.

use std::io::{self, BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use log::{debug, error, info, warn};

use score_core::{analyzer, notes};

use crate::framing::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// Remote pitch service over framed JSON/TCP.
pub struct PitchServer {
    listener: TcpListener,
}

impl PitchServer {
    /// Bind the service to an address.
    pub fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("pitch service listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop: one handler thread per connection. Never returns;
    /// aborting the process is the only teardown.
    pub fn run(self) -> ! {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    debug!("client connected from {addr}");
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream) {
                            if e.kind() != io::ErrorKind::UnexpectedEof {
                                warn!("connection from {addr} ended with error: {e}");
                            }
                        }
                        debug!("client {addr} disconnected");
                    });
                }
                Err(e) => error!("accept failed: {e}"),
            }
        }
    }
}

/// Serves framed requests on one connection until the peer hangs up.
fn handle_connection(stream: TcpStream) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    loop {
        let request: Request = match read_frame(&mut reader) {
            Ok(request) => request,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                // Unparseable payload: the whole frame was consumed,
                // so answer with an error and keep the connection
                // alive.
                write_frame(&mut writer, &Response::Error {
                    message: e.to_string(),
                })?;
                continue;
            }
            // Anything else (EOF, an oversized length prefix that left
            // unread bytes on the wire) leaves the stream unusable.
            Err(e) => return Err(e),
        };

        write_frame(&mut writer, &handle_request(request))?;
    }
}

/// Computes the response for one request using the core routines.
fn handle_request(request: Request) -> Response {
    match request {
        Request::Health => Response::Health {
            status: "healthy".to_string(),
        },

        Request::DetectPitch {
            samples,
            sample_rate,
        } => {
            let pitch = analyzer::detect_pitch(&samples, sample_rate)
                .filter(|&freq| notes::in_range(freq))
                .map(notes::frequency_to_note);
            Response::Pitch {
                success: pitch.is_some(),
                pitch,
            }
        }

        Request::AnalyzeChord { frequencies } => {
            let mapped: Vec<_> = frequencies
                .into_iter()
                .filter(|&freq| freq > 0.0)
                .map(notes::frequency_to_note)
                .collect();
            Response::Notes {
                success: true,
                notes: mapped,
            }
        }

        Request::NoteToFrequency { note, octave } => {
            let frequency = notes::note_to_frequency(&note, octave);
            Response::Frequency {
                success: frequency.is_some(),
                frequency,
            }
        }
    }
}
