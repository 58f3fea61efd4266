//! Command-line surface: argument parsing and the subcommand handlers.

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::branches::{BranchResolver, GitSnapshot, SearchContext, DEFAULT_SEARCH_LIMIT};
use crate::cache::{CacheKey, CacheLayer, CacheStore};
use crate::config::Config;
use crate::github::{GithubClient, RepoApi};
use crate::issues::{
  CourseContent, CreatedIssue, IssueDraft, IssueKind, IssueRequest, IssueService, TutorialContent,
};
use crate::languages::{HttpLanguageSource, LanguageCatalog, RemoteLanguageCatalog};
use crate::project::{list_boards, proofreading_board, SkipReason};
use crate::validators;

#[derive(Parser, Debug)]
#[command(name = "issuesmith")]
#[command(about = "Create proofreading issues and link them to a GitHub project board")]
#[command(version)]
pub struct Cli {
  /// Path to config file (default: ./issuesmith.yaml, then $XDG_CONFIG_HOME/issuesmith/config.yaml)
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  /// Local checkout of the content repository
  #[arg(long, global = true)]
  pub repo_path: Option<PathBuf>,

  /// Increase verbosity (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List or search branches
  Branches {
    /// Ranked search instead of the full list
    query: Option<String>,
    /// Bias suggestions towards this language's branches
    #[arg(short, long)]
    language: Option<String>,
    #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
    /// Bypass the cached remote list
    #[arg(long)]
    refresh: bool,
  },
  /// Exit non-zero unless the branch exists
  BranchExists { name: String },
  /// Branches that look like they belong to a language
  LanguageBranches { code: String },
  /// Search the language catalog
  Languages {
    #[arg(default_value = "")]
    query: String,
    #[arg(short = 'n', long, default_value_t = 10)]
    limit: usize,
  },
  /// Print the issue that would be created
  Preview(IssueArgs),
  /// Create the issue and link it to the project board
  Create(IssueArgs),
  /// Verify the token can read the user and the content repository
  CheckToken,
  /// List an organization's project boards to find `github.project_id`
  Projects {
    /// Defaults to the configured repository owner
    org: Option<String>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
  Course,
  VideoCourse,
  ImageCourse,
  Tutorial,
  TutorialSection,
  Weblate,
}

#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
  #[arg(value_enum)]
  pub kind: KindArg,

  /// Course id, `category/name` for tutorials, or the section name.
  /// Not used for weblate.
  pub target: Option<String>,

  #[arg(short, long)]
  pub language: String,

  /// Defaults to the configured default branch
  #[arg(short, long)]
  pub branch: Option<String>,

  #[arg(long, default_value = "1st")]
  pub iteration: String,

  #[arg(long, default_value = "not urgent")]
  pub urgency: String,

  /// Content title, used in PlanB links
  #[arg(long)]
  pub title: Option<String>,

  /// Content uuid, used in PlanB links
  #[arg(long)]
  pub uuid: Option<String>,

  /// Print the draft as JSON
  #[arg(long)]
  pub json: bool,
}

impl IssueArgs {
  fn target(&self) -> Result<&str> {
    self
      .target
      .as_deref()
      .filter(|t| !t.is_empty())
      .ok_or_else(|| eyre!("{:?} issues need a target", self.kind))
  }

  pub fn to_request(&self, config: &Config) -> Result<IssueRequest> {
    let course = || -> Result<CourseContent> {
      Ok(CourseContent {
        course_id: self.target()?.to_string(),
        uuid: self.uuid.clone(),
        title: self.title.clone(),
      })
    };

    let kind = match self.kind {
      KindArg::Course => IssueKind::Course(course()?),
      KindArg::VideoCourse => IssueKind::VideoCourse(course()?),
      KindArg::ImageCourse => IssueKind::ImageCourse(course()?),
      KindArg::Tutorial => {
        let (category, name) = validators::parse_tutorial_path(self.target()?)?;
        IssueKind::Tutorial(TutorialContent {
          id: self.uuid.clone(),
          title: self.title.clone(),
          ..TutorialContent::new(category, name)
        })
      }
      KindArg::TutorialSection => IssueKind::TutorialSection {
        section: self.target()?.to_string(),
      },
      KindArg::Weblate => IssueKind::Weblate,
    };

    let branch = self
      .branch
      .clone()
      .unwrap_or_else(|| config.default_branch.clone());

    Ok(
      IssueRequest::new(kind, self.language.clone())
        .branch(branch)
        .iteration(self.iteration.clone())
        .urgency(self.urgency.clone()),
    )
  }
}

/// Shared handles for one invocation.
struct Context {
  config: Config,
  cache: CacheLayer,
}

impl Context {
  fn new(config: Config) -> Self {
    let store = CacheStore::new();
    // Stops on its own once the store is dropped
    store.spawn_sweeper(Duration::from_secs(60));
    Self {
      config,
      cache: CacheLayer::new(store),
    }
  }

  fn github(&self) -> Result<Arc<GithubClient>> {
    let token = Config::github_token()?;
    Ok(Arc::new(GithubClient::new(&self.config.github, &token)?))
  }

  fn resolver(&self) -> Result<BranchResolver> {
    let key = CacheKey::RemoteBranches {
      owner: self.config.github.owner.clone(),
      repo: self.config.github.repo.clone(),
    };
    let mut resolver = BranchResolver::new(self.github()?, key, self.cache.clone());
    if let Some(path) = &self.config.repo_path {
      debug!(path = %path.display(), "using local checkout for branches");
      resolver = resolver.with_snapshot(Arc::new(GitSnapshot::new(path)));
    }
    Ok(resolver)
  }

  fn languages(&self) -> Result<LanguageCatalog> {
    match &self.config.languages.catalog_url {
      Some(url) => {
        let timeout = Duration::from_secs(self.config.github.timeout_secs);
        let source = HttpLanguageSource::new(url, timeout)?;
        Ok(LanguageCatalog::Remote(RemoteLanguageCatalog::new(
          Arc::new(source),
          self.cache.clone(),
        )))
      }
      None => Ok(LanguageCatalog::builtin()),
    }
  }
}

pub async fn run(command: Command, config: Config) -> Result<()> {
  let ctx = Context::new(config);

  match command {
    Command::Branches {
      query,
      language,
      limit,
      refresh,
    } => {
      let resolver = ctx.resolver()?;
      let branches =
        list_branches(&resolver, query.as_deref(), language.as_deref(), limit, refresh).await;
      for branch in branches {
        println!("{}", branch);
      }
    }

    Command::BranchExists { name } => {
      validators::validate_branch_name(&name)?;
      if !ctx.resolver()?.branch_exists(&name).await {
        return Err(eyre!("branch '{}' does not exist", name));
      }
      println!("{}", name);
    }

    Command::LanguageBranches { code } => {
      validators::validate_language_code(&code)?;
      for branch in ctx.resolver()?.language_branches(&code).await {
        println!("{}", branch);
      }
    }

    Command::Languages { query, limit } => {
      for entry in ctx.languages()?.search(&query, limit).await {
        println!("{:<4} {}", entry.code, entry.name);
      }
    }

    Command::Preview(args) => {
      let request = args.to_request(&ctx.config)?;
      let draft = IssueService::preview(&request)?;
      print_draft(&draft, args.json)?;
    }

    Command::Create(args) => {
      let request = args.to_request(&ctx.config)?;
      let project_id = ctx.config.project_id()?.to_string();
      let github = ctx.github()?;
      let service = IssueService::new(github.clone(), github, project_id);
      let created = service.create(&request).await?;
      print_created(&created);
    }

    Command::CheckToken => {
      let login = ctx.github()?.validate_token().await?;
      println!(
        "token OK for {} ({}/{})",
        login, ctx.config.github.owner, ctx.config.github.repo
      );
    }

    Command::Projects { org } => {
      let org = org.unwrap_or_else(|| ctx.config.github.owner.clone());
      let boards = list_boards(ctx.github()?.as_ref(), &org).await?;
      for board in &boards {
        let state = if board.closed { "closed" } else { "open" };
        println!("#{:<4} {:<6} {}  {}", board.number, state, board.id, board.title);
      }
      match proofreading_board(&boards) {
        Some(board) => println!("\nproject_id for {}: {}", board.title, board.id),
        None => println!("\nno open proofreading board in {}", org),
      }
    }
  }

  Ok(())
}

/// Without a query or language this is the full resolver list. Otherwise
/// the ranked suggestions, where `refresh` first reloads the remote list.
async fn list_branches(
  resolver: &BranchResolver,
  query: Option<&str>,
  language: Option<&str>,
  limit: usize,
  refresh: bool,
) -> Vec<String> {
  if query.is_none() && language.is_none() {
    return resolver.get_branches(refresh).await.to_vec();
  }

  if refresh {
    resolver.get_branches(true).await;
  }
  let context = language.map(SearchContext::for_language);
  resolver
    .fuzzy_search(query.unwrap_or(""), limit, context.as_ref())
    .await
}

fn print_draft(draft: &IssueDraft, json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(draft)?);
    return Ok(());
  }

  println!("Title:  {}", draft.title);
  println!("Labels: {}", draft.labels.join(", "));
  println!("Fields:");
  for field in &draft.project_fields {
    println!("  {}: {}", field.field_name, field.text());
  }
  println!();
  println!("{}", draft.body);
  Ok(())
}

fn print_created(created: &CreatedIssue) {
  println!("#{} {}", created.issue.number, created.issue.html_url);
  match &created.link {
    Ok(report) => {
      println!("linked to project as {}", report.item.item_id);
      for skip in &report.skipped {
        let reason = match &skip.reason {
          SkipReason::FieldNotFound => "field not on board".to_string(),
          SkipReason::UnknownOption(option) => format!("no option '{}'", option),
          SkipReason::UpdateFailed(e) => e.clone(),
        };
        println!("  skipped {}: {}", skip.field_name, reason);
      }
    }
    Err(e) => println!("not linked: {}", e),
  }
}
