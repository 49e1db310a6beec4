use anyhow::Context;
use mindroute::{config::Config, logging::init_logging, Session};
use mindroute_graph::Graph;
use mindroute_llm::ClientFactory;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging);

    tracing::info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        mode = ?config.graph.mode,
        "Starting mindroute session"
    );

    let provider = config
        .provider_config()
        .context("Missing model credentials")?;
    let llm_client =
        ClientFactory::create_client(provider).context("Failed to create model client")?;

    let graph = Graph::builder()
        .llm_client(llm_client)
        .llm_config(config.llm_config())
        .topology(config.graph.mode.topology())
        .build()
        .context("Failed to build conversation graph")?;

    let mut session = Session::new(graph)
        .with_prompt(config.session.prompt.clone())
        .with_farewell(config.session.farewell.clone());

    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}
