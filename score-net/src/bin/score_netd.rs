//! Standalone remote pitch service.
//!
//! Usage: `score-netd [bind-addr]`, default `127.0.0.1:7878`.
//! Logging is controlled through `RUST_LOG`.

use anyhow::Result;
use log::info;

use score_net::PitchServer;

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn main() -> Result<()> {
    env_logger::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let server = PitchServer::bind(&addr)?;
    info!("serving pitch detection on {}", server.local_addr()?);
    server.run()
}
