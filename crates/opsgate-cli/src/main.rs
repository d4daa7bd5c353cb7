use clap::{Parser, Subcommand};
use opsgate_core::gateway::AdminGateway;
use opsgate_server::{gateway::HttpAdminGateway, ServerConfig};

#[derive(Parser)]
#[command(
    name = "opsgate",
    about = "Admin-action approval gateway — plan, approve, execute",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(long, env = "OPSGATE_PORT", default_value_t = 3180)]
        port: u16,

        /// Base URL of the admin API service
        #[arg(long, env = "ADMIN_API_BASE_URL")]
        admin_api_base_url: String,

        /// Postgres connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// OpenAI API key for the planner
        #[arg(long, env = "OPENAI_API_KEY")]
        openai_api_key: String,

        /// Planner model
        #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4.1-mini")]
        openai_model: String,

        /// Override the OpenAI-compatible API host
        #[arg(long, env = "OPENAI_BASE_URL")]
        openai_base_url: Option<String>,
    },

    /// Exchange admin credentials for a bearer token and print it
    Token {
        #[arg(long, env = "ADMIN_API_BASE_URL")]
        admin_api_base_url: String,

        #[arg(long, env = "OPSGATE_ADMIN_USERNAME")]
        username: String,

        #[arg(long, env = "OPSGATE_ADMIN_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsgate=info,opsgate_server=info,opsgate_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            admin_api_base_url,
            database_url,
            openai_api_key,
            openai_model,
            openai_base_url,
        } => {
            let config = ServerConfig {
                admin_api_base_url,
                database_url,
                openai_api_key,
                openai_model,
                openai_base_url,
            };
            opsgate_server::serve(config, port).await
        }

        Commands::Token {
            admin_api_base_url,
            username,
            password,
        } => {
            let gateway = HttpAdminGateway::new(admin_api_base_url);
            let token = gateway.issue_token(&username, &password).await?;
            println!("{token}");
            Ok(())
        }
    }
}
