//! rsa-chat CLI tools: session-key exchange demo, key generation.

#![forbid(unsafe_code)]

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use rsa_chat_common::helpers::is_blank;
use rsa_chat_crypto::{Peer, PeerError};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "rsa-chat")]
#[command(about = "rsa-chat session-key exchange tools")]
struct Args {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, env = "RSA_CHAT_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a two-way session-key exchange between two in-process peers
    Exchange {
        /// Identifier of the first peer
        #[arg(long, env = "RSA_CHAT_FIRST", default_value = "jack")]
        first: String,

        /// Identifier of the second peer
        #[arg(long, env = "RSA_CHAT_SECOND", default_value = "jill")]
        second: String,

        /// Seed for reproducible runs (NOT secure)
        #[arg(long, env = "RSA_CHAT_SEED")]
        seed: Option<u64>,
    },

    /// Generate a peer key pair and print its public identity
    Keygen {
        /// Identifier to announce
        #[arg(short, long)]
        id: String,

        /// Print as JSON instead of PEM
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Validated settings for an exchange run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExchangeConfig {
    first: String,
    second: String,
    seed: Option<u64>,
}

impl ExchangeConfig {
    fn new(first: String, second: String, seed: Option<u64>) -> rsa_chat_common::Result<Self> {
        if is_blank(&first) || is_blank(&second) {
            return Err(rsa_chat_common::Error::config(
                "peer identifiers must not be empty",
            ));
        }
        if first == second {
            return Err(rsa_chat_common::Error::config(format!(
                "peer identifiers must differ, both are {:?}",
                first
            )));
        }
        Ok(Self {
            first,
            second,
            seed,
        })
    }

    /// Build both peers. Seeded runs give each peer its own stream.
    fn build_peers(&self) -> Result<(Peer, Peer), PeerError> {
        let (first, second) = match self.seed {
            Some(seed) => (
                Peer::with_entropy(StdRng::seed_from_u64(seed))?,
                Peer::with_entropy(StdRng::seed_from_u64(seed.wrapping_add(1)))?,
            ),
            None => (Peer::new()?, Peer::new()?),
        };
        Ok((first.with_id(&self.first), second.with_id(&self.second)))
    }
}

/// Send a session key from `from` to `to` and return the ciphertext.
fn send_session_key(from: &Peer, to: &Peer) -> Result<Vec<u8>, PeerError> {
    let ciphertext = from.outgoing_cipher_session_key(&to.public_key(), to.id())?;
    to.load_incoming_cipher_session_key(&ciphertext, &from.public_key(), from.id())?;
    Ok(ciphertext)
}

fn run_exchange(config: &ExchangeConfig) -> rsa_chat_common::Result<()> {
    if config.seed.is_some() {
        info!("using seeded entropy, keys are reproducible and not secure");
    }

    let (first, second) = config
        .build_peers()
        .map_err(rsa_chat_common::Error::crypto)?;

    for (from, to) in [(&first, &second), (&second, &first)] {
        let ciphertext = send_session_key(from, to).map_err(|e| {
            error!(from = from.id(), to = to.id(), "exchange failed: {}", e);
            println!("Err: {}", e);
            rsa_chat_common::Error::crypto(e)
        })?;
        println!(
            "{} -> {}: {}",
            from.id(),
            to.id(),
            STANDARD.encode(&ciphertext)
        );
    }

    println!("No errors");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    rsa_chat_common::init_tracing_with_default(&args.log_level);

    match args.command {
        Command::Exchange {
            first,
            second,
            seed,
        } => {
            let config = ExchangeConfig::new(first, second, seed)?;
            run_exchange(&config)?;
        }
        Command::Keygen { id, json } => {
            let peer = Peer::new()?.with_id(id);
            let identity = peer.public_identity()?;

            if json {
                let json = serde_json::to_string_pretty(&identity)
                    .map_err(rsa_chat_common::Error::serialization)?;
                println!("{}", json);
            } else {
                println!("Peer:        {}", identity.id);
                println!("Fingerprint: {}", identity.fingerprint);
                print!("{}", identity.public_key_pem);
            }
        }
        Command::Version => {
            println!("rsa-chat {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_empty_and_equal_names() {
        assert!(ExchangeConfig::new("".into(), "jill".into(), None).is_err());
        assert!(ExchangeConfig::new("jack".into(), "  ".into(), None).is_err());

        let err = ExchangeConfig::new("jack".into(), "jack".into(), None).unwrap_err();
        assert!(matches!(err, rsa_chat_common::Error::Config(_)));

        assert!(ExchangeConfig::new("jack".into(), "jill".into(), Some(3)).is_ok());
    }

    #[test]
    fn test_parse_exchange_args() {
        let args = Args::try_parse_from([
            "rsa-chat", "exchange", "--first", "ann", "--second", "bo", "--seed", "9",
        ])
        .unwrap();

        match args.command {
            Command::Exchange {
                first,
                second,
                seed,
            } => {
                assert_eq!(first, "ann");
                assert_eq!(second, "bo");
                assert_eq!(seed, Some(9));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_seeded_peers_are_distinct_and_reproducible() {
        let config = ExchangeConfig::new("jack".into(), "jill".into(), Some(5)).unwrap();
        let (jack, jill) = config.build_peers().unwrap();
        let (jack_again, _) = config.build_peers().unwrap();

        assert_eq!(jack.id(), "jack");
        assert_eq!(jill.id(), "jill");
        assert_ne!(jack.public_key(), jill.public_key());
        assert_eq!(jack.public_key(), jack_again.public_key());
    }

    #[test]
    fn test_send_session_key_both_ways() {
        let config = ExchangeConfig::new("jack".into(), "jill".into(), Some(21)).unwrap();
        let (jack, jill) = config.build_peers().unwrap();

        send_session_key(&jack, &jill).unwrap();
        send_session_key(&jill, &jack).unwrap();

        assert_eq!(
            jack.outgoing_session("jill").unwrap().session_key(),
            jill.incoming_session("jack").unwrap().session_key()
        );
        assert_eq!(
            jill.outgoing_session("jack").unwrap().session_key(),
            jack.incoming_session("jill").unwrap().session_key()
        );
    }
}
