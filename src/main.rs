use clap::{Parser, Subcommand};
use course_assistant::{ChatSession, CourseAssistant};
use course_store::{
    default_volume_path, CourseTable, SqliteCourseTable, StatementTable, VolumeUploader,
};
use forum_client::ForumClient;
use intel_core::{AppConfig, ChatMessage, CoreError, ErrorReporter, University};
use llm_interface::{OpenAiProvider, ServingEndpointProvider};
use scrape_pipeline::{
    collect_active_courses, load_courses, write_json, BatchPipeline, CalendarClient,
};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const CRATES: &[&str] = &[
    "course_intel",
    "intel_core",
    "forum_client",
    "llm_interface",
    "course_store",
    "comment_ranking",
    "scrape_pipeline",
    "course_assistant",
];

#[derive(Parser)]
#[command(name = "course-intel")]
#[command(about = "Course questions answered from student discussions")]
struct Args {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat about one university's courses
    Chat {
        #[arg(long, default_value = "calgary")]
        university: String,

        /// SQLite database to use instead of the warehouse
        #[arg(long)]
        local_db: Option<String>,
    },
    /// Answer a single course question
    Ask {
        query: String,

        #[arg(long, default_value = "calgary")]
        university: String,

        /// SQLite database to use instead of the warehouse
        #[arg(long)]
        local_db: Option<String>,
    },
    /// Save the active courses of the configured subject
    Catalog {
        #[arg(long, default_value = "ucalgary_cpsc_courses.json")]
        output: PathBuf,
    },
    /// Scrape and rank forum discussions for every course in a list
    Scrape {
        #[arg(long, default_value = "ucalgary_cpsc_courses.json")]
        courses: PathBuf,

        #[arg(long, default_value = "reddit_batch_to_databricks.json")]
        output: PathBuf,
    },
    /// Upload a local file to a warehouse volume
    Upload {
        file: PathBuf,

        /// Volume path; defaults to the scrape volume directory
        #[arg(long)]
        target: Option<String>,
    },
    /// Check that the serving endpoint accepts chat messages
    CheckEndpoint,
    /// Send one prompt straight to OpenAI
    Prompt { text: String },
}

enum Conversation {
    Interactive,
    Once(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = CRATES
        .iter()
        .map(|name| format!("{}={}", name, log_level))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let reporter = ErrorReporter::new();
    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let e = CoreError::from(e);
            reporter.report_error(&e);
            return Err(e.into());
        }
    };

    if let Err(e) = run(args.command, &config).await {
        reporter.report_error(&e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<(), CoreError> {
    let timeout = config.http.timeout();

    match command {
        Command::Chat {
            university,
            local_db,
        } => {
            let university = config.university(&university)?;
            converse(config, university, local_db, Conversation::Interactive).await
        }
        Command::Ask {
            query,
            university,
            local_db,
        } => {
            let university = config.university(&university)?;
            converse(config, university, local_db, Conversation::Once(query)).await
        }
        Command::Catalog { output } => {
            let client = CalendarClient::new(&config.catalog, timeout)?;
            let courses =
                collect_active_courses(&client, &config.catalog.subject, config.catalog.page_size)
                    .await?;
            write_json(&output, &courses).await?;
            println!(
                "Saved {} {} courses to {}",
                courses.len(),
                config.catalog.subject,
                output.display()
            );
            Ok(())
        }
        Command::Scrape { courses, output } => {
            let credentials = config.require_forum()?;
            let client = ForumClient::new(&config.forum, credentials, timeout)?;
            let courses = load_courses(&courses).await?;

            let pipeline = BatchPipeline::new(client, &config.pipeline, config.scoring.clone())?;
            let results = pipeline.run(&courses).await;
            write_json(&output, &results).await?;

            let stats = pipeline.source().api().pacer().stats().await;
            tracing::info!(
                "{} forum requests, {:?} spent in courtesy delays",
                stats.request_count,
                stats.total_wait
            );
            println!(
                "Saved results for {} courses to {}",
                results.len(),
                output.display()
            );
            Ok(())
        }
        Command::Upload { file, target } => {
            let workspace = config.require_workspace()?;
            let target = match target {
                Some(target) => target,
                None => {
                    let name = file.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                        CoreError::InvalidInput {
                            message: format!("Cannot derive a file name from {}", file.display()),
                        }
                    })?;
                    default_volume_path(name)
                }
            };

            let uploader = VolumeUploader::new(&workspace, timeout)?;
            uploader.upload_file(&file, &target).await?;
            println!("Uploaded {} to {}", file.display(), target);
            Ok(())
        }
        Command::CheckEndpoint => {
            let provider = serving_provider(config)?;
            let task = provider.ensure_chat_compatible().await?;
            println!(
                "Endpoint {} is chat compatible (task: {})",
                provider.endpoint(),
                task
            );
            Ok(())
        }
        Command::Prompt { text } => {
            let api_key = config.require_openai_key()?;
            let provider = OpenAiProvider::new(&config.openai, api_key, timeout)?;
            println!("{}", provider.respond_to_prompt(&text).await);
            Ok(())
        }
    }
}

fn serving_provider(config: &AppConfig) -> Result<ServingEndpointProvider, CoreError> {
    let workspace = config.require_workspace()?;
    let endpoint = config.require_serving_endpoint()?;
    ServingEndpointProvider::new(&workspace, endpoint, config.http.timeout())
}

/// Picks the course table and hands over to the conversation loop.
async fn converse(
    config: &AppConfig,
    university: University,
    local_db: Option<String>,
    conversation: Conversation,
) -> Result<(), CoreError> {
    let provider = serving_provider(config)?;
    provider.ensure_chat_compatible().await?;

    match local_db {
        Some(url) => {
            let table = SqliteCourseTable::connect(&url).await?;
            let assistant = CourseAssistant::new(table, provider, config.serving.max_tokens);
            drive(&assistant, university, conversation).await
        }
        None => {
            let credentials = config.require_warehouse()?;
            let table = StatementTable::new(
                &credentials,
                config.warehouse.wait_timeout_secs,
                config.http.timeout(),
            )?;
            let assistant = CourseAssistant::new(table, provider, config.serving.max_tokens);
            drive(&assistant, university, conversation).await
        }
    }
}

async fn drive<T: CourseTable>(
    assistant: &CourseAssistant<T, ServingEndpointProvider>,
    university: University,
    conversation: Conversation,
) -> Result<(), CoreError> {
    match conversation {
        Conversation::Once(query) => {
            let reply = assistant
                .respond(&university, &[ChatMessage::user(query)])
                .await;
            println!("{}", reply);
            Ok(())
        }
        Conversation::Interactive => chat_loop(assistant, university).await,
    }
}

async fn chat_loop<T: CourseTable>(
    assistant: &CourseAssistant<T, ServingEndpointProvider>,
    university: University,
) -> Result<(), CoreError> {
    println!(
        "{}: enter a course code, 'clear' to reset, 'exit' to quit.",
        university.label
    );
    let mut session = ChatSession::new(university);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "exit" | "quit" => break,
            "clear" => {
                session.clear();
                println!("(history cleared)");
            }
            input => {
                if let Some(reply) = session.send(assistant, input).await {
                    println!("{}\n", reply);
                }
            }
        }
    }
    Ok(())
}
