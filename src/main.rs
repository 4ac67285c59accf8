use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use research_synth::agent::{Agent, DecisionStep, KeywordPlanner, LlmDecider};
use research_synth::config::{find_config_file, load_config, Config};
use research_synth::llm::{GeminiClient, Generator};
use research_synth::models::SearchQuery;
use research_synth::sources::{Source, SourceRegistry};
use research_synth::tools::{
    split_paper_blocks, summarize_each, ToolOutcome, ToolRegistry, DOCUMENT_READER,
    EXPLAIN_TOPIC, GAP_ANALYSIS, METHODOLOGY, PAPER_SEARCH, SEPARATOR, SUMMARIZE,
};
use research_synth::ui::{self, Spinner, Status};
use research_synth::utils::HttpClient;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Synth - search papers and reason over them with a generative model
#[derive(Parser, Debug)]
#[command(name = "research-synth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search papers, summarize them and find research gaps", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Paper source to use (arxiv, semantic)
    #[arg(long, short, global = true)]
    source: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Explain a research topic in simple terms
    #[command(alias = "e")]
    Explain {
        /// Topic to explain
        topic: String,
    },

    /// Search for papers on a topic
    #[command(alias = "s")]
    Search {
        /// Search topic
        topic: String,

        /// Maximum number of results
        #[arg(long, short)]
        max_results: Option<usize>,

        /// Subject/category filter (e.g. cs.CL)
        #[arg(long)]
        subject: Option<String>,

        /// Exact publication year
        #[arg(long)]
        year: Option<String>,

        /// Summarize every result into method, results and conclusion
        #[arg(long)]
        summarize: bool,
    },

    /// Summarize a paper into method, results and conclusion
    Summarize {
        /// Paper title
        title: String,

        /// Paper abstract
        #[arg(value_name = "ABSTRACT")]
        abstract_text: String,
    },

    /// Search a topic, then find the research gap across the results
    Gap {
        /// Research topic
        topic: String,
    },

    /// Suggest a methodology for a research gap
    #[command(alias = "m")]
    Methodology {
        /// Research topic
        topic: String,

        /// Research gap to address
        gap: String,
    },

    /// Extract the text of a local PDF
    Read {
        /// Path to the PDF
        path: PathBuf,
    },

    /// Answer a free-text request with the research agent
    Ask {
        /// The request
        request: String,

        /// Plan tool calls from keywords instead of asking the model
        #[arg(long)]
        offline: bool,
    },

    /// Interactive session with memory (/reset clears it, /exit quits)
    Chat {
        /// Plan tool calls from keywords instead of asking the model
        #[arg(long)]
        offline: bool,
    },

    /// List the agent's tools
    Tools,

    /// Check configuration health
    Doctor,
}

/// Shared clients for one run
struct App {
    config: Config,
    sources: SourceRegistry,
    generator: Arc<dyn Generator>,
    source: Arc<dyn Source>,
    json: bool,
    quiet: bool,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone().or_else(find_config_file);
        if let Some(path) = &config_path {
            tracing::info!("Using config file: {}", path.display());
        }
        let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

        let http = HttpClient::from_config(&config.http).context("failed to build HTTP client")?;
        let sources = SourceRegistry::from_config(&config, http.clone());
        let source_id = cli
            .source
            .clone()
            .unwrap_or_else(|| config.sources.default_source.clone());
        let source = sources.get_required(&source_id)?.clone();
        let generator: Arc<dyn Generator> = Arc::new(GeminiClient::from_config(&config, http));

        Ok(Self {
            config,
            sources,
            generator,
            source,
            json: cli.json,
            quiet: cli.quiet,
        })
    }

    fn tools(&self) -> Result<Arc<ToolRegistry>> {
        Ok(Arc::new(ToolRegistry::research_tools(
            &self.config,
            self.source.clone(),
            self.generator.clone(),
        )?))
    }

    fn spinner(&self, msg: &str) -> Option<Spinner> {
        (!self.quiet && !self.json).then(|| Spinner::new(msg))
    }

    fn agent(&self, offline: bool, memory: bool) -> Result<Agent> {
        let decider: Box<dyn DecisionStep> = if offline {
            Box::new(KeywordPlanner)
        } else {
            Box::new(LlmDecider::new(self.generator.clone()))
        };
        let mut agent_config = self.config.agent.clone();
        agent_config.memory = memory && agent_config.memory;
        Ok(Agent::from_config(&agent_config, self.tools()?, decider))
    }

    /// Run one tool behind a spinner
    async fn run_tool(&self, tools: &ToolRegistry, name: &str, input: &str) -> Result<ToolOutcome> {
        let spinner = self.spinner(&format!("Running {}...", name));
        let outcome = tools.invoke(name, input).await?;
        if let Some(spinner) = spinner {
            spinner.finish();
        }
        Ok(outcome)
    }

    fn print_outcome(&self, name: &str, outcome: &ToolOutcome) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "tool": name,
                    "output": outcome.text,
                    "error": outcome.error,
                }))?
            );
        } else {
            println!("{}", outcome.text);
        }
        if let Some(kind) = outcome.error {
            bail!("{} failed ({:?})", name, kind);
        }
        Ok(())
    }

    async fn tool_command(&self, name: &str, input: &str) -> Result<()> {
        let tools = self.tools()?;
        let outcome = self.run_tool(&tools, name, input).await?;
        self.print_outcome(name, &outcome)
    }

    async fn search(
        &self,
        topic: String,
        max_results: Option<usize>,
        subject: Option<String>,
        year: Option<String>,
        summarize: bool,
    ) -> Result<()> {
        let mut query = SearchQuery::new(topic)
            .max_results(max_results.unwrap_or(self.config.sources.search_results));
        if let Some(subject) = subject {
            query = query.subject(subject);
        }
        if let Some(year) = year {
            query = query.year(year);
        }

        let spinner = self.spinner(&format!("Searching {}...", self.source.name()));
        let result = self.source.search(&query).await;
        if let Some(spinner) = spinner {
            spinner.finish();
        }
        let response = result?;

        let summaries = if summarize && !response.is_empty() {
            let tools = self.tools()?;
            let spinner = self.spinner(&format!("Summarizing {} papers...", response.len()));
            let outcomes = summarize_each(&tools, &response.papers).await;
            if let Some(spinner) = spinner {
                spinner.finish();
            }
            Some(outcomes?)
        } else {
            None
        };

        if self.json {
            match &summaries {
                Some(outcomes) => {
                    let summaries: Vec<_> = response
                        .papers
                        .iter()
                        .zip(outcomes)
                        .map(|(paper, outcome)| {
                            serde_json::json!({
                                "title": paper.title,
                                "summary": outcome.text,
                                "error": outcome.error,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "papers": response,
                            "summaries": summaries,
                        }))?
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&response)?),
            }
            return Ok(());
        }
        if response.is_empty() {
            ui::print_status(Status::Warning, "No papers found");
            return Ok(());
        }
        if !self.quiet {
            ui::print_section(&format!(
                "{} papers from {} for \"{}\"",
                response.len(),
                response.source,
                response.query
            ));
        }
        for (i, paper) in response.papers.iter().enumerate() {
            ui::print_paper(i + 1, paper);
            if let Some(outcome) = summaries.as_ref().and_then(|s| s.get(i)) {
                ui::print_paper_summary(outcome);
            }
        }
        Ok(())
    }

    async fn gap(&self, topic: &str) -> Result<()> {
        let tools = self.tools()?;
        let search = self.run_tool(&tools, PAPER_SEARCH, topic).await?;
        if !search.is_success() {
            return self.print_outcome(PAPER_SEARCH, &search);
        }

        let blocks = split_paper_blocks(&search.text);
        if blocks.is_empty() {
            ui::print_status(Status::Warning, &search.text);
            return Ok(());
        }
        if !self.quiet && !self.json {
            ui::print_status(Status::Info, &format!("Analyzing {} papers", blocks.len()));
        }
        let outcome = self
            .run_tool(&tools, GAP_ANALYSIS, &blocks.join("\n\n"))
            .await?;
        self.print_outcome(GAP_ANALYSIS, &outcome)
    }

    async fn ask(&self, request: &str, offline: bool) -> Result<()> {
        let mut agent = self.agent(offline, false)?;
        let spinner = self.spinner("Thinking...");
        let result = agent.run(request).await;
        if let Some(spinner) = spinner {
            spinner.finish();
        }
        let response = result?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }
        if !self.quiet {
            ui::print_invocations(&response.invocations);
            println!();
        }
        println!("{}", response.answer);
        Ok(())
    }

    async fn chat(&self, offline: bool) -> Result<()> {
        let mut agent = self.agent(offline, true)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if !self.quiet {
            ui::print_status(
                Status::Info,
                "Ask a research question. /reset clears memory, /exit quits.",
            );
        }

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            match line {
                "" => continue,
                "/exit" | "/quit" => break,
                "/reset" => {
                    agent.reset();
                    ui::print_status(Status::Success, "Memory cleared");
                    continue;
                }
                _ => {}
            }

            match agent.run(line).await {
                Ok(response) => {
                    if !self.quiet {
                        ui::print_invocations(&response.invocations);
                    }
                    println!("{}\n", response.answer);
                }
                Err(e) => ui::print_status(Status::Error, &e.to_string()),
            }
        }
        Ok(())
    }

    fn list_tools(&self) -> Result<()> {
        let tools = self.tools()?;
        if self.json {
            let listing: Vec<_> = tools
                .all()
                .map(|t| serde_json::json!({"name": t.name(), "description": t.description()}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(());
        }
        for tool in tools.all() {
            println!("{:<16} {}", tool.name(), tool.description());
        }
        Ok(())
    }

    fn doctor(&self) -> Result<()> {
        let report = self.config.health();

        let mut shown = self.config.clone();
        if shown.api_keys.gemini.is_some() {
            shown.api_keys.gemini = Some("<redacted>".to_string());
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "healthy": report.is_healthy(),
                    "issues": report.issues,
                    "sources": self.sources.ids(),
                    "config": shown,
                }))?
            );
            return Ok(());
        }

        ui::print_section("Sources");
        for id in self.sources.ids() {
            let marker = if id == self.source.id() { " (selected)" } else { "" };
            println!("  {}{}", id, marker);
        }

        ui::print_section("Configuration");
        print!("{}", toml::to_string_pretty(&shown)?);

        ui::print_section("Health");
        if report.is_healthy() {
            ui::print_status(Status::Success, "Configuration looks good");
        }
        for issue in &report.issues {
            ui::print_status(Status::Warning, issue);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("research_synth={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = App::new(&cli)?;

    match cli.command {
        Commands::Explain { topic } => app.tool_command(EXPLAIN_TOPIC, &topic).await,
        Commands::Search {
            topic,
            max_results,
            subject,
            year,
            summarize,
        } => app.search(topic, max_results, subject, year, summarize).await,
        Commands::Summarize {
            title,
            abstract_text,
        } => {
            let input = format!("Title: {}\n{}", title.trim(), abstract_text);
            app.tool_command(SUMMARIZE, &input).await
        }
        Commands::Gap { topic } => app.gap(&topic).await,
        Commands::Methodology { topic, gap } => {
            let input = format!("{}{}{}", topic, SEPARATOR, gap);
            app.tool_command(METHODOLOGY, &input).await
        }
        Commands::Read { path } => {
            app.tool_command(DOCUMENT_READER, &path.to_string_lossy()).await
        }
        Commands::Ask { request, offline } => app.ask(&request, offline).await,
        Commands::Chat { offline } => app.chat(offline).await,
        Commands::Tools => app.list_tools(),
        Commands::Doctor => app.doctor(),
    }
}
