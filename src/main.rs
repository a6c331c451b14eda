use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use serde::Serialize;

use codezap::config::{AppPaths, Settings};
use codezap::errors::{CodezapError, Result};
use codezap::service::template::{TemplateDetail, TemplateRequest, TemplateSummary};
use codezap::credentials::{self, COOKIE_NAME};
use codezap::service::{auth, category, like, member, tag, template};
use codezap::storage::models::{
    Category, MemberIdentity, NewSourceCode, PageRequest, Tag, TemplateFilter,
};
use codezap::storage::sqlite::SqliteStorage;

#[derive(Parser)]
#[command(name = "codezap", version, about = "Share code templates")]
struct Cli {
    /// Output results as JSON
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Credential token printed by `codezap login`
    #[arg(long, env = "CODEZAP_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// `Cookie` header holding the token as `Authorization=<token>`; used when no --token is given
    #[arg(long, global = true)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a member account
    Signup {
        email: String,

        /// Display name, unique across members
        name: String,

        #[arg(long, env = "CODEZAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Check whether an email is still free
    CheckEmail { email: String },

    /// Check whether a member name is still free
    CheckName { name: String },

    /// Log in and print a credential token
    Login {
        email: String,

        #[arg(long, env = "CODEZAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the member the token belongs to
    Whoami,

    /// Manage your categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Create, browse and manage templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// List tags, optionally of one template or of one member's templates
    Tags {
        #[arg(long, conflicts_with = "member")]
        template: Option<i64>,

        #[arg(long)]
        member: Option<i64>,
    },

    /// Like a template
    Like { template_id: i64 },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Create a category
    Add { name: String },
    /// List a member's categories (yours by default)
    List {
        #[arg(long)]
        member: Option<i64>,
    },
    /// Delete an unused category
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Create a template from source files
    Create(TemplateArgs),

    /// Show a template with its files
    Get { id: i64 },

    /// Replace a template's fields, files and tags
    Update {
        id: i64,

        #[command(flatten)]
        args: TemplateArgs,
    },

    /// Delete templates
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Search templates
    List {
        /// Owner member id
        #[arg(long)]
        member: Option<i64>,

        /// Substring of title, description, filename or content
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(long)]
        category: Option<i64>,

        /// Tag id; repeat to require several
        #[arg(long = "tag")]
        tags: Vec<i64>,

        #[arg(long, default_value = "1")]
        page: i64,

        #[arg(long)]
        size: Option<i64>,
    },
}

#[derive(Args)]
struct TemplateArgs {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Category id
    #[arg(long)]
    category: i64,

    /// Source file to include; repeat for several
    #[arg(long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// Tag name; repeat for several
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            eprintln!("{}", serde_json::json!({"error": e.to_string()}));
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::resolve()?;
    let settings = Settings::default();
    let storage = SqliteStorage::open(&paths.db_path)?;
    let json = cli.json;
    let token = match (&cli.token, &cli.cookie) {
        (Some(token), _) => Some(token.as_str()),
        (None, Some(header)) => credentials::token_from_cookie_header(header),
        (None, None) => None,
    };

    match cli.command {
        Commands::Signup {
            email,
            name,
            password,
        } => {
            let identity = member::signup(&storage, &settings.argon2, &email, &password, &name)?;
            let message = format!("Signed up as {} (#{}).", identity.name, identity.id);
            report(json, message, Some(identity.id))
        }
        Commands::CheckEmail { email } => {
            let unique = member::is_unique_email(&storage, &email)?;
            if json {
                println!("{}", serde_json::json!({ "email": email, "unique": unique }));
            } else if unique {
                println!("{} is available.", email);
            } else {
                println!("{} is already registered.", email);
            }
            Ok(())
        }
        Commands::CheckName { name } => {
            let unique = member::is_unique_name(&storage, &name)?;
            if json {
                println!("{}", serde_json::json!({ "name": name, "unique": unique }));
            } else if unique {
                println!("\"{}\" is available.", name);
            } else {
                println!("\"{}\" is taken.", name);
            }
            Ok(())
        }
        Commands::Login { email, password } => {
            let token = member::login(&storage, &email, &password)?;
            if json {
                let cookie = format!("{}={}", COOKIE_NAME, token);
                println!("{}", serde_json::json!({ "token": token, "cookie": cookie }));
            } else {
                println!("{}", token);
            }
            Ok(())
        }
        Commands::Whoami => {
            let identity = current_member(&storage, token)?;
            if json {
                print_json(&identity)
            } else {
                println!("{} <{}> (#{})", identity.name, identity.email, identity.id);
                Ok(())
            }
        }
        Commands::Category { action } => cmd_category(&storage, token, action, json),
        Commands::Template { action } => cmd_template(&storage, &settings, token, action, json),
        Commands::Tags {
            template: template_id,
            member: member_id,
        } => {
            let tags = match (template_id, member_id) {
                (Some(id), _) => tag::tags_of(&storage, id)?,
                (None, Some(id)) => tag::tags_of_member(&storage, id)?,
                (None, None) => tag::all_tags(&storage)?,
            };
            if json {
                return print_json(&tags);
            }
            if tags.is_empty() {
                println!("No tags found.");
            }
            for tag in &tags {
                print_tag_row(tag);
            }
            Ok(())
        }
        Commands::Like { template_id } => {
            let identity = current_member(&storage, token)?;
            let created = like::like(&storage, identity.id, template_id)?;
            let message = if created {
                format!("Liked template #{}.", template_id)
            } else {
                format!("You already like template #{}.", template_id)
            };
            report(json, message, Some(template_id))
        }
    }
}

fn current_member(storage: &SqliteStorage, token: Option<&str>) -> Result<MemberIdentity> {
    let token = token.ok_or(CodezapError::AuthenticationFailed)?;
    auth::authenticate_token(storage, token)
}

fn cmd_category(
    storage: &SqliteStorage,
    token: Option<&str>,
    action: CategoryAction,
    json: bool,
) -> Result<()> {
    match action {
        CategoryAction::Add { name } => {
            let identity = current_member(storage, token)?;
            let created = category::create(storage, &identity, &name)?;
            let message = format!("Created category \"{}\" (#{}).", created.name, created.id);
            report(json, message, Some(created.id))
        }
        CategoryAction::List { member: member_id } => {
            let member_id = match member_id {
                Some(id) => id,
                None => current_member(storage, token)?.id,
            };
            let categories = category::list(storage, member_id)?;
            if json {
                return print_json(&categories);
            }
            if categories.is_empty() {
                println!("No categories found.");
            }
            for category in &categories {
                print_category_row(category);
            }
            Ok(())
        }
        CategoryAction::Delete { id } => {
            let identity = current_member(storage, token)?;
            category::delete(storage, &identity, id)?;
            report(json, format!("Deleted category #{}.", id), Some(id))
        }
    }
}

fn cmd_template(
    storage: &SqliteStorage,
    settings: &Settings,
    token: Option<&str>,
    action: TemplateAction,
    json: bool,
) -> Result<()> {
    match action {
        TemplateAction::Create(args) => {
            let identity = current_member(storage, token)?;
            let request = template_request(args)?;
            let id = template::create(storage, &identity, &request)?;
            report(json, format!("Created template #{}.", id), Some(id))
        }
        TemplateAction::Get { id } => {
            let detail = template::get(storage, id)?;
            if json {
                return print_json(&detail);
            }
            print_template_detail(&detail);
            Ok(())
        }
        TemplateAction::Update { id, args } => {
            let identity = current_member(storage, token)?;
            let request = template_request(args)?;
            template::update(storage, &identity, id, &request)?;
            report(json, format!("Updated template #{}.", id), Some(id))
        }
        TemplateAction::Delete { ids } => {
            let identity = current_member(storage, token)?;
            let removed = template::delete_by_ids(storage, &identity, &ids)?;
            report(json, format!("Deleted {} template(s).", removed), None)
        }
        TemplateAction::List {
            member: member_id,
            keyword,
            category: category_id,
            tags,
            page,
            size,
        } => {
            let filter = TemplateFilter {
                member_id,
                keyword,
                category_id,
                tag_ids: tags,
            };
            let request = PageRequest {
                page,
                size: size.unwrap_or(settings.page_size),
            };
            let found = template::search(storage, &filter, request)?;
            if json {
                return print_json(&found);
            }
            if found.items.is_empty() {
                println!("No templates found.");
                return Ok(());
            }
            for summary in &found.items {
                print_template_row(summary);
            }
            println!(
                "page {}/{} ({} template(s))",
                page.max(1),
                found.total_pages,
                found.total_elements
            );
            Ok(())
        }
    }
}

fn template_request(args: TemplateArgs) -> Result<TemplateRequest> {
    let source_codes = args
        .sources
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>>>()?;
    Ok(TemplateRequest {
        title: args.title,
        description: args.description,
        category_id: args.category,
        source_codes,
        tags: args.tags,
    })
}

fn read_source(path: &Path) -> Result<NewSourceCode> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CodezapError::InvalidInput(format!("{} is not a file", path.display())))?;
    let content = std::fs::read_to_string(path)?;
    Ok(NewSourceCode { filename, content })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn report(json: bool, message: String, id: Option<i64>) -> Result<()> {
    if json {
        print_json(&StatusResponse {
            success: true,
            message,
            id,
        })
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn print_tag_row(tag: &Tag) {
    println!("{:>4} {}", tag.id, tag.name);
}

fn print_category_row(category: &Category) {
    println!("{:>4} {}", category.id, category.name);
}

fn print_template_row(summary: &TemplateSummary) {
    let title = if summary.title.chars().count() > 50 {
        let cut: String = summary.title.chars().take(47).collect();
        format!("{}...", cut)
    } else {
        summary.title.clone()
    };
    let tags = if summary.tags.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = summary.tags.iter().map(|t| t.name.as_str()).collect();
        format!(" [{}]", names.join(", "))
    };
    println!(
        "{:>4} {}  {}{}",
        summary.id,
        summary.updated_at.format("%Y-%m-%d"),
        title,
        tags
    );
}

fn print_template_detail(detail: &TemplateDetail) {
    println!("ID:       {}", detail.id);
    println!("Title:    {}", detail.title);
    if !detail.description.is_empty() {
        println!("About:    {}", detail.description);
    }
    println!("Owner:    {} (#{})", detail.member.name, detail.member.id);
    println!("Category: {} (#{})", detail.category.name, detail.category.id);
    println!("Likes:    {}", detail.likes_count);
    println!("Created:  {}", detail.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated:  {}", detail.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if !detail.tags.is_empty() {
        let names: Vec<&str> = detail.tags.iter().map(|t| t.name.as_str()).collect();
        println!("Tags:     {}", names.join(", "));
    }
    for code in &detail.source_codes {
        println!("── {} ──────────────", code.filename);
        println!("{}", code.content);
    }
}
