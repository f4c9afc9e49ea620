use crate::availability::{
    AvailabilityCache, MovieIdentity, Orchestrator, RequestSubmitter, ResolveOutcome,
};
use crate::cli::{CacheCommand, Command, ServersCommand, SettingsCommand};
use crate::config::Config;
use crate::ombi::{OmbiClient, RequestService};
use crate::render::{render_outcome, submit_error_message};
use crate::store::{KvStore, ServerConfig, Settings};
use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Main application struct wiring the store, client and pipeline together.
pub struct App {
    settings: Settings,
    cache: AvailabilityCache,
    orchestrator: Orchestrator,
    submitter: RequestSubmitter,
}

impl App {
    pub fn new(config: &Config, store: Arc<dyn KvStore>) -> Result<Self, anyhow::Error> {
        let client = OmbiClient::new(config.slow_request_threshold())
            .context("Failed to build HTTP client")?;
        Ok(Self::with_service(store, Arc::new(client)))
    }

    pub fn with_service(store: Arc<dyn KvStore>, service: Arc<dyn RequestService>) -> Self {
        let settings = Settings::new(store.clone());
        let cache = AvailabilityCache::new(store);
        Self {
            orchestrator: Orchestrator::new(service.clone(), cache.clone()),
            submitter: RequestSubmitter::new(settings.clone(), service, cache.clone()),
            settings,
            cache,
        }
    }

    /// Execute one CLI command, printing its result.
    pub async fn run(&self, command: Command) -> ExitCode {
        match self.dispatch(command).await {
            Ok(code) => code,
            Err(e) => {
                error!(error = ?e, "command failed");
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }

    async fn dispatch(&self, command: Command) -> Result<ExitCode, anyhow::Error> {
        match command {
            Command::Check {
                title,
                tmdb_id,
                year,
            } => {
                let identity = MovieIdentity::new(title, tmdb_id, year);
                self.check(&identity).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Request {
                server,
                movie_id,
                title,
            } => self.request(&server, &movie_id, title).await,
            Command::Servers(cmd) => {
                self.servers(cmd).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Settings(cmd) => {
                self.settings_command(cmd).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Cache(CacheCommand::Clear) => {
                let removed = self.cache.clear().await.context("Failed to clear cache")?;
                println!("Removed {removed} cached result(s)");
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    async fn check(&self, identity: &MovieIdentity) -> Result<ResolveOutcome, anyhow::Error> {
        let outcome = self
            .orchestrator
            .resolve_with_settings(identity, &self.settings)
            .await
            .context("Failed to read settings")?;
        print!("{}", render_outcome(identity.display_title(), &outcome));
        Ok(outcome)
    }

    async fn request(
        &self,
        server: &str,
        movie_id: &str,
        title: Option<String>,
    ) -> Result<ExitCode, anyhow::Error> {
        match self.submitter.submit(server, movie_id).await {
            Ok(ack) => {
                info!(server = %ack.server_name, movie_id = %ack.movie_id, invalidated = ack.invalidated, "refreshing after request");
                println!("Request submitted successfully!");
                let identity = MovieIdentity::new(title, Some(ack.movie_id), None);
                self.check(&identity).await?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}", submit_error_message(&e));
                Ok(ExitCode::FAILURE)
            }
        }
    }

    async fn servers(&self, cmd: ServersCommand) -> Result<(), anyhow::Error> {
        match cmd {
            ServersCommand::List => {
                let servers = self.settings.servers().await?;
                if servers.is_empty() {
                    println!("No servers configured");
                }
                for (index, server) in servers.iter().enumerate() {
                    println!("{index}: {} ({})", server.name, server.url);
                }
            }
            ServersCommand::Add { name, url, api_key } => {
                self.settings
                    .add_server(ServerConfig::new(name, url, api_key))
                    .await?;
                println!("Server saved successfully");
            }
            ServersCommand::Edit {
                index,
                name,
                url,
                api_key,
            } => {
                self.settings
                    .update_server(index, ServerConfig::new(name, url, api_key))
                    .await?;
                println!("Server saved successfully");
            }
            ServersCommand::Remove { index } => {
                let removed = self.settings.remove_server(index).await?;
                println!("Server {:?} deleted successfully", removed.name);
            }
            ServersCommand::Move { from, to } => {
                self.settings.move_server(from, to).await?;
            }
        }
        Ok(())
    }

    async fn settings_command(&self, cmd: SettingsCommand) -> Result<(), anyhow::Error> {
        match cmd {
            SettingsCommand::Show => {
                println!("enabled: {}", self.settings.extension_enabled().await?);
                println!("debug mode: {}", self.settings.debug_mode().await?);
                println!(
                    "cache expiration: {}h",
                    self.settings.cache_expiration_hours().await?
                );
                println!("servers: {}", self.settings.servers().await?.len());
            }
            SettingsCommand::Enable => self.settings.set_extension_enabled(true).await?,
            SettingsCommand::Disable => self.settings.set_extension_enabled(false).await?,
            SettingsCommand::Debug { enabled } => self.settings.set_debug_mode(enabled).await?,
            SettingsCommand::CacheExpiration { hours } => {
                self.settings.set_cache_expiration_hours(hours).await?;
                println!("Cache settings saved successfully");
            }
        }
        Ok(())
    }
}
