use agent::{client::Client, strategy};
use anyhow::anyhow;
use clap::Parser;
use common::model::frame::RenderDescriptor;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(version, about = "Plays the Rock, Paper, Scissors frame from the command line")]
struct Args {
    /// Base url of a running frame server
    #[arg(long, env = "FRAME_PUBLIC_URL", default_value = "http://localhost:3000")]
    url: String,

    /// rock, paper, scissors, random or cycle
    #[arg(long, default_value = "random")]
    strategy: String,

    /// Number of wagers to place
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Wallet address to check the result for once the wagers are placed
    #[arg(long)]
    address: Option<String>,
}

fn log_view(descriptor: &RenderDescriptor) {
    info!("[{}] {}", descriptor.next_action, descriptor.view.headline);
    for line in &descriptor.view.details {
        info!("    {}", line);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::INFO)
        .init();
    let args = Args::parse();

    let strategy = strategy::by_name(&args.strategy)
        .ok_or_else(|| anyhow!("unknown strategy {:?}", args.strategy))?;
    let mut client = Client::new(args.url, strategy);

    log_view(&client.start().await?);
    for _ in 0..args.rounds {
        let wager = client.play().await?;
        // Signing happens elsewhere; hand the call over on stdout
        println!("{}", serde_json::to_string_pretty(&wager.transaction)?);
        log_view(&wager.callback);
    }

    if let Some(address) = args.address {
        log_view(&client.check_result(&address).await?);
    }
    Ok(())
}
