use anyhow::{bail, Result};
use morselink_codec::Transcoder;
use morselink_core::{ConfigError, LinkConfig, LinkState, SessionEvent};
use morselink_session::MorseSession;
use morselink_signal::{build_timeline, play, FlashTiming};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::flash::ConsoleFlash;

const DEFAULT_CONFIG_PATH: &str = "morselink.json";

const USAGE: &str = "usage: morselink server [port] | morselink client <host> [port]";

/// Main console loop.
///
/// # Modes
/// - `morselink server [port]`: listen and wait for one peer
/// - `morselink client <host> [port]`: connect to a listening peer
///
/// Config comes from `MORSELINK_CONFIG` (or `morselink.json` next to the
/// working directory); argv overrides it. `MORSELINK_UNIT_MS` overrides the
/// flash unit without touching the file.
///
/// # Flow
/// 1. Start the session in the requested role
/// 2. stdin lines → transcode to Morse → send (`quit`/`exit` to leave)
/// 3. Session events → console; received Morse → flash playback
pub async fn run() -> Result<()> {
    let config = load_config()?;

    let unit_ms: u64 = std::env::var("MORSELINK_UNIT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.unit_ms)
        .max(1);
    let timing = FlashTiming::for_scheme(config.timing, unit_ms);

    // No network providers ship in this build; the table handles everything.
    for id in &config.providers {
        warn!("translation provider '{id}' is not available in this build, using the table");
    }
    let transcoder = Transcoder::new();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(&args, &config)?;

    let (event_tx, mut event_rx) = mpsc::channel::<SessionEvent>(64);
    let session = MorseSession::new(event_tx);

    match &mode {
        Mode::Server { port } => {
            info!("starting in server mode on port {port}");
            session.start_server(*port).await;
        }
        Mode::Client { host, port } => {
            info!("connecting to {host}:{port}");
            session.start_client(host, *port).await;
        }
    }

    println!("Type a message and press Enter to send it as Morse. 'quit' to leave.");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line? {
                    None => {
                        session.close().await;
                        break;
                    }
                    Some(line) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
                            session.close().await;
                            break;
                        }
                        let morse = transcoder.encode(text).await;
                        println!("You: {text}");
                        println!("  -> {morse}");
                        session.send(&morse).await;
                    }
                }
            }

            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::Listening { addr } => {
                        println!("Listening on {addr}, waiting for a peer...");
                    }
                    SessionEvent::Connected { peer } => {
                        println!("Connected to {peer}.");
                    }
                    SessionEvent::Disconnected => {
                        println!("Remote closed the connection.");
                        break;
                    }
                    SessionEvent::MessageReceived { text } => {
                        println!("Friend: {text}");
                        let timeline = build_timeline(&text, &timing);
                        let mut sink = ConsoleFlash::new(config.flash_color.clone());
                        tokio::spawn(async move {
                            play(timeline, &mut sink).await;
                        });
                    }
                    SessionEvent::Error(e) => {
                        warn!("{e}");
                        if session.state() == LinkState::Closed {
                            break;
                        }
                    }
                }
            }
        }
    }

    session.close().await;
    Ok(())
}

// MARK: - Mode

enum Mode {
    Server { port: u16 },
    Client { host: String, port: u16 },
}

fn parse_mode(args: &[String], config: &LinkConfig) -> Result<Mode> {
    match args.first().map(String::as_str) {
        Some("server") => {
            let port = match args.get(1) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("invalid port '{raw}', using {}", config.listen_port);
                    config.listen_port
                }),
                None => config.listen_port,
            };
            Ok(Mode::Server { port })
        }
        Some("client") => {
            let host = match (args.get(1), &config.remote) {
                (Some(host), _) => host.clone(),
                (None, Some(remote)) => remote.host.clone(),
                (None, None) => bail!("client mode requires a host address\n{USAGE}"),
            };
            let port = match args.get(2) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    let fallback = default_remote_port(config);
                    warn!("invalid port '{raw}', using {fallback}");
                    fallback
                }),
                None => default_remote_port(config),
            };
            Ok(Mode::Client { host, port })
        }
        Some(other) => bail!("unknown mode '{other}'\n{USAGE}"),
        None => bail!("{USAGE}"),
    }
}

fn default_remote_port(config: &LinkConfig) -> u16 {
    config.remote.as_ref().map(|r| r.port).unwrap_or(config.listen_port)
}

// MARK: - Config loading

fn load_config() -> Result<LinkConfig> {
    match std::env::var("MORSELINK_CONFIG") {
        Ok(path) => {
            let cfg = LinkConfig::load(&path)?;
            info!("loaded config from {path}");
            Ok(cfg)
        }
        Err(_) => match LinkConfig::load(DEFAULT_CONFIG_PATH) {
            Ok(cfg) => {
                info!("loaded config from {DEFAULT_CONFIG_PATH}");
                Ok(cfg)
            }
            Err(ConfigError::Read { .. }) => {
                debug!("no {DEFAULT_CONFIG_PATH}, using defaults");
                Ok(LinkConfig::default())
            }
            Err(e) => Err(e.into()),
        },
    }
}
