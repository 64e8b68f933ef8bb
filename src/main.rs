use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use switchboard::api::{self, AppState};
use switchboard::desk::{AgentDesk, DeskSlot, InMemoryDesk};
use switchboard::providers::ForwarderClient;
use switchboard::types::{Author, Message};
use switchboard::{ChatWidget, Config, ControllerConfig, ConversationController, ViewWatcher, WidgetIntent};

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Website chat: AI assistant with live human-agent handoff", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the completion forwarder
    Serve {
        #[arg(long, help = "Port to listen on (default: SWITCHBOARD_PORT or 3000)")]
        port: Option<u16>,
    },
    /// Chat from the terminal through a running forwarder
    Chat {
        #[arg(long, help = "Message to send as soon as the chat opens")]
        seed: Option<String>,
        #[arg(long, help = "Forwarder endpoint (default: SWITCHBOARD_FORWARDER_URL)")]
        forwarder_url: Option<String>,
        #[arg(long, help = "Model to request")]
        model: Option<String>,
        #[arg(long, help = "Bring a local agent desk online after this many seconds")]
        desk_delay_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            api::serve(AppState::from_config(&config), port).await?
        }
        Commands::Chat {
            seed,
            forwarder_url,
            model,
            desk_delay_secs,
        } => {
            if let Some(url) = forwarder_url {
                config.forwarder_url = url;
            }
            if let Some(model) = model {
                config.model = model;
            }
            run_chat(&config, seed, desk_delay_secs).await?
        }
    }

    Ok(())
}

async fn run_chat(config: &Config, seed: Option<String>, desk_delay_secs: Option<u64>) -> Result<()> {
    let completions = Arc::new(ForwarderClient::new(
        config.forwarder_url.clone(),
        config.model.clone(),
    ));
    let slot = DeskSlot::new();
    let controller = ConversationController::new(
        ControllerConfig::from_config(config),
        completions,
        slot.clone(),
    );

    if let Some(seed) = seed {
        controller.supply_seed(seed);
    }

    let desk = Arc::new(InMemoryDesk::new());
    if let Some(secs) = desk_delay_secs {
        let desk = desk.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            slot.inject(desk.clone() as Arc<dyn AgentDesk>);
            desk.announce_ready();
            log::info!("Local agent desk is online");
        });
    }

    let mut widget = ChatWidget::new(controller);
    let renderer = tokio::spawn(render(widget.watch()));
    widget.open();

    println!("Type a message, /switch to change channel, /close to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let intent = match line.trim() {
            "/switch" => WidgetIntent::SwitchMode,
            "/close" | "/quit" => WidgetIntent::Close,
            text => WidgetIntent::Send(text.to_string()),
        };
        widget.dispatch(intent);
        if !widget.is_open() {
            break;
        }
    }

    for text in desk.sent_messages() {
        log::info!("Delivered to agent desk: {}", text);
    }

    widget.teardown();
    renderer.abort();
    Ok(())
}

async fn render(mut watcher: ViewWatcher) {
    let mut shown = 0;
    let mut was_typing = false;

    loop {
        let view = watcher.current();
        for message in view.transcript.iter().skip(shown) {
            println!("{}", format_line(message));
        }
        shown = view.transcript.len();

        let typing = view.shows_typing_indicator();
        if typing && !was_typing {
            println!("   … Assistant is answering...");
        }
        was_typing = typing;

        if !watcher.changed().await {
            break;
        }
    }
}

fn format_line(message: &Message) -> String {
    let label = match message.author {
        Author::Assistant => "assistant",
        Author::User => "you",
        Author::HumanAgent => "agent",
        Author::SystemNotice => "*",
    };
    format!("[{}] {}", label, message.text)
}
