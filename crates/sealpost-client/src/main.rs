use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sealpost_client::{Client, Message};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sealpost-client")]
#[command(about = "Command-line client for a sealpost server", long_about = None)]
struct Cli {
    /// Base URL of the server
    #[arg(long, env = "SEALPOST_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Key file holding this client's RSA keypair (created if missing)
    #[arg(long, default_value = "priv_key.pem")]
    key_file: PathBuf,

    #[arg(long, env = "SEALPOST_USERNAME")]
    username: String,

    #[arg(long, env = "SEALPOST_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish this client's public key under the username
    Register,

    /// Send a message, encrypted to the recipient unless --plain
    Send {
        #[arg(long)]
        to: String,

        #[arg(long)]
        content: String,

        /// Send the content unencrypted
        #[arg(long)]
        plain: bool,
    },

    /// List messages to or from this user
    Inbox,

    /// Print a user's public key as JWK
    Pubkey {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sealpost_client=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut client = Client::new(&cli.key_file, cli.server)?;
    client.set_basic_auth(cli.username.clone(), cli.password);

    match cli.command {
        Commands::Register => {
            client.register_key(&cli.username).await?;
            println!("Registered public key for {}", cli.username);
        }
        Commands::Send { to, content, plain } => {
            let message = Message::new(cli.username.as_str(), to.as_str(), content);
            let id = message.id.clone();
            if plain {
                client.send_message(&message).await?;
            } else {
                let key = client.fetch_public_key_by_user_id(&to).await?;
                client.send_encrypted_message(message, &key).await?;
            }
            println!("Sent {} to {to}", id.short());
        }
        Commands::Inbox => {
            let mut messages = client.get_messages(&cli.username).await?;
            messages.sort_by_key(|m| m.time_sent);
            for m in messages {
                let marker = if m.encrypted { " [encrypted]" } else { "" };
                println!(
                    "{} {} -> {}{marker}: {}",
                    m.time_sent.to_rfc3339(),
                    m.from,
                    m.to,
                    m.content
                );
            }
        }
        Commands::Pubkey { user } => {
            let key = client.fetch_public_key_by_user_id(&user).await?;
            let jwk = sealpost_shared::RsaJwk::from_public_key(&key);
            println!("{}", serde_json::to_string_pretty(&jwk)?);
        }
    }

    Ok(())
}
