//! foundry-agents CLI binary entry point.

use std::time::Duration;

use foundry_agents::cli::{AuthCommands, Cli, Commands, RunArgs};
use foundry_agents::client::{ProjectClient, RunWaitOptions};
use foundry_agents::session::{run_session, SessionEvent, SessionRequest};
use foundry_agents::tools::{builtin, CodeInterpreterTool, FunctionTool, ToolSet};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Messages(args) => handle_messages(&args.thread_id).await,
        Commands::DeleteAgent(args) => handle_delete_agent(&args.agent_id).await,
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Token(args) => foundry_agents::cli::auth::handle_token(args.show).await,
            AuthCommands::Logout => foundry_agents::cli::auth::handle_logout(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProjectClient::from_env()?;

    let mut toolset = ToolSet::new().add(FunctionTool::new(builtin::user_functions())?)?;
    if !args.no_code_interpreter {
        toolset = toolset.add(CodeInterpreterTool::new())?;
    }

    let mut wait = RunWaitOptions::default();
    if let Some(secs) = args.timeout_secs {
        wait = wait.with_timeout(Duration::from_secs(secs));
    }
    let request = SessionRequest {
        model: args.model,
        name: args.name,
        instructions: args.instructions,
        message: args.message,
        wait,
    };

    client
        .scoped(|client| async move {
            let agents = client.agents();
            run_session(&agents, &toolset, &request).await
        })
        .await?;
    Ok(())
}

async fn handle_messages(thread_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProjectClient::from_env()?;
    let messages = client
        .scoped(|client| async move { client.agents().list_all_messages(thread_id).await })
        .await?;
    println!("{}", SessionEvent::MessagesListed { messages });
    Ok(())
}

async fn handle_delete_agent(agent_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProjectClient::from_env()?;
    let status = client
        .scoped(|client| async move { client.agents().delete_agent(agent_id).await })
        .await?;
    println!("Deleted agent {} (deleted: {})", status.id, status.deleted);
    Ok(())
}
