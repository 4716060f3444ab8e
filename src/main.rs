// Command-line front end over the article stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use travel_articles::models::Article;
use travel_articles::navigation::RecordingNavigator;
use travel_articles::store::{ActionOutcome, ArticleState};
use travel_articles::validation::{ArticleForm, FilterForm, LoginForm, RegisterForm, ValidationErrors};
use travel_articles::{api, init_tracing, AppContext, ClientConfig};

#[derive(Parser, Debug)]
#[command(name = "travel-articles", version, about = "Manage travel articles on a headless CMS")]
struct Cli {
    /// Base URL of the content API, e.g. https://cms.example.com/api
    #[arg(long, env = "TRAVEL_API_URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        /// Email or username
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// List articles, optionally filtered
    List {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// How many pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Show {
        document_id: String,
    },
    Create(ArticleArgs),
    Update {
        document_id: String,
        #[command(flatten)]
        fields: ArticleArgs,
    },
    Delete {
        document_id: String,
    },
    Categories,
    /// Upload an image and print its hosted URL
    Upload {
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ArticleArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    cover_image_url: Option<String>,
    /// Upload this file and use its URL as the cover image
    #[arg(long, conflicts_with = "cover_image_url")]
    cover_image: Option<PathBuf>,
    /// Numeric category id
    #[arg(long)]
    category: Option<String>,
}

impl ArticleArgs {
    /// Fills a form from the arguments, falling back to `current` for anything not given.
    async fn into_form(self, context: &AppContext, current: Option<&Article>) -> Result<ArticleForm> {
        let cover_image_url = match self.cover_image {
            Some(path) => Some(upload(context, &path).await?),
            None => self.cover_image_url,
        };
        let fallback = |value: Option<&String>| value.cloned().unwrap_or_default();
        Ok(ArticleForm {
            title: self
                .title
                .unwrap_or_else(|| fallback(current.and_then(|a| a.title.as_ref()))),
            description: self
                .description
                .unwrap_or_else(|| fallback(current.and_then(|a| a.description.as_ref()))),
            cover_image_url: cover_image_url
                .unwrap_or_else(|| fallback(current.and_then(|a| a.cover_image_url.as_ref()))),
            category: self.category.unwrap_or_else(|| {
                current
                    .and_then(|a| a.category.as_ref())
                    .map(|c| c.id.to_string())
                    .unwrap_or_default()
            }),
        })
    }
}

async fn upload(context: &AppContext, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let url = api::upload_image(&context.client, bytes, file_name).await?;
    Ok(url)
}

fn report_invalid(errors: ValidationErrors) -> anyhow::Error {
    for (field, messages) in errors.fields() {
        for message in messages {
            eprintln!("{}: {}", field, message);
        }
    }
    anyhow::anyhow!("invalid input")
}

fn finish(outcome: ActionOutcome, state: &ArticleState) -> Result<()> {
    match outcome {
        ActionOutcome::Succeeded | ActionOutcome::Skipped | ActionOutcome::Superseded => {
            if state.success.visible {
                println!("{}", state.success.message);
            }
            Ok(())
        }
        ActionOutcome::Failed => bail!("{}", state.failure.message),
        ActionOutcome::Unauthenticated => bail!("not logged in, run `travel-articles login` first"),
    }
}

fn print_article_line(article: &Article) {
    let posted = article
        .created_at
        .map(|at| at.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_owned());
    println!(
        "{}  {}  [{}]  {}",
        article.document_id,
        article.title_or_default(),
        article.category_name().unwrap_or(" "),
        posted
    );
}

fn print_article(article: &Article) {
    println!("{}", article.title_or_default());
    if let Some(category) = article.category_name() {
        println!("Category: {}", category);
    }
    if let Some(url) = &article.cover_image_url {
        println!("Cover: {}", url);
    }
    if let Some(description) = &article.description {
        println!("\n{}\n", description);
    }
    let comments = article.comments.as_deref().unwrap_or_default();
    println!("Comments ({})", comments.len());
    for comment in comments {
        let author = comment
            .user
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .unwrap_or("anonymous");
        println!("- {}: {}", author, comment.content.as_deref().unwrap_or(""));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    let navigator = Arc::new(RecordingNavigator::new());
    let context = AppContext::connect(config, navigator)
        .await
        .context("could not open the session store")?;

    match cli.command {
        Command::Login {
            identifier,
            password,
        } => {
            let form = LoginForm {
                identifier,
                password,
            };
            let outcome = context.auth.login(&form).await.map_err(report_invalid)?;
            let state = context.auth.snapshot();
            match (outcome, state.user) {
                (ActionOutcome::Succeeded, Some(user)) => println!("Logged in as {}", user.username),
                _ => bail!(state.error.unwrap_or_else(|| "Login failed".to_owned())),
            }
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
            };
            let outcome = context.auth.register(&form).await.map_err(report_invalid)?;
            if outcome != ActionOutcome::Succeeded {
                let state = context.auth.snapshot();
                bail!(state.error.unwrap_or_else(|| "Registration failed".to_owned()));
            }
            println!("Account created, you can now log in");
        }
        Command::Logout => {
            context.auth.logout().await;
            println!("Logged out");
        }
        Command::Whoami => match context.auth.restore().await {
            Some(user) => println!("{} <{}>", user.username, user.email),
            None => println!("Not logged in"),
        },
        Command::List {
            title,
            category,
            pages,
        } => {
            let filter = FilterForm { title, category };
            let outcome = context
                .articles
                .search(&filter)
                .await
                .map_err(report_invalid)?;
            finish(outcome, &context.articles.snapshot())?;
            for _ in 1..pages {
                let outcome = context.articles.load_more().await;
                if outcome == ActionOutcome::Skipped {
                    break;
                }
                finish(outcome, &context.articles.snapshot())?;
            }
            let state = context.articles.snapshot();
            for article in &state.articles {
                print_article_line(article);
            }
            println!(
                "-- page {} of {}",
                state.current_page(),
                state.total_pages.max(1)
            );
        }
        Command::Show { document_id } => {
            let outcome = context.articles.fetch_article(&document_id).await;
            let state = context.articles.snapshot();
            finish(outcome, &state)?;
            if let Some(article) = &state.article {
                print_article(article);
            }
        }
        Command::Create(fields) => {
            let form = fields.into_form(&context, None).await?;
            let outcome = context
                .articles
                .create_article(&form)
                .await
                .map_err(report_invalid)?;
            finish(outcome, &context.articles.snapshot())?;
        }
        Command::Update {
            document_id,
            fields,
        } => {
            let outcome = context.articles.fetch_article(&document_id).await;
            finish(outcome, &context.articles.snapshot())?;
            let current = context.articles.snapshot().article;
            let form = fields.into_form(&context, current.as_ref()).await?;
            let outcome = context
                .articles
                .update_article(&document_id, &form)
                .await
                .map_err(report_invalid)?;
            finish(outcome, &context.articles.snapshot())?;
        }
        Command::Delete { document_id } => {
            let outcome = context.articles.delete_article(&document_id).await;
            finish(outcome, &context.articles.snapshot())?;
        }
        Command::Categories => {
            let outcome = context.categories.fetch_categories().await;
            let state = context.categories.snapshot();
            if outcome == ActionOutcome::Unauthenticated {
                bail!("not logged in, run `travel-articles login` first");
            }
            if state.error {
                bail!("Failed to fetch categories.");
            }
            for category in &state.categories {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        Command::Upload { path } => {
            println!("{}", upload(&context, &path).await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}
