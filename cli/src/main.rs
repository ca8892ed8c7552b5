use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use client::api::auth::{self, ProfileUpdate, Registration};
use client::api::types::FileUpload;
use client::api::{blogs, categories, comments, users};
use client::session::token;
use client::{ApiClient, AuthState, ClientConfig, CredentialStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("session expired; run `inkwell auth login` to sign in again")]
    SessionExpired,
    #[error("not logged in; run `inkwell auth login` first")]
    NotLoggedIn,
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read password from stdin: {0}")]
    PasswordRead(std::io::Error),
    #[error(transparent)]
    Client(client::Error),
    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<client::Error> for CliError {
    fn from(error: client::Error) -> Self {
        match error {
            client::Error::SessionExpired => Self::SessionExpired,
            other => Self::Client(other),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "inkwell", about = "Inkwell blogging platform CLI")]
struct Cli {
    #[arg(long, env = "INKWELL_BASE_URL", default_value = ClientConfig::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "INKWELL_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Profile(ProfileCommand),
    Blog(BlogCommand),
    Comment(CommentCommand),
    Category(CategoryCommand),
    User(UserCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    /// Register a new account; a verification code is emailed.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Profile picture file")]
        picture: Option<PathBuf>,
    },
    /// Confirm the emailed verification code.
    Verify {
        user_id: String,
        code: String,
    },
    /// Request a fresh verification code.
    ResendCode {
        email: String,
    },
    /// Log in with a username or email identifier.
    Login {
        identifier: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },
    /// Log out and clear the stored session.
    Logout,
    /// Show the local session state without touching the network.
    Status,
    /// Fetch the logged-in user's profile from the server.
    Whoami,
    /// Start password recovery.
    ForgotPassword {
        email: String,
    },
    /// Finish password recovery with the emailed token.
    ResetPassword {
        token: String,
        #[arg(long, help = "New password (read from stdin if not provided)")]
        password: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    /// Update display name and/or profile picture.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        picture: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct BlogCommand {
    #[command(subcommand)]
    command: BlogSubcommand,
}

#[derive(Subcommand, Debug)]
enum BlogSubcommand {
    List,
    Read {
        blog_id: String,
    },
    ByUser {
        user_id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long, help = "Cover image file")]
        image: Option<PathBuf>,
    },
    Update {
        blog_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long, help = "Cover image file")]
        image: Option<PathBuf>,
    },
    Delete {
        blog_id: String,
    },
}

#[derive(Args, Debug)]
struct CommentCommand {
    #[command(subcommand)]
    command: CommentSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentSubcommand {
    List {
        blog_id: String,
    },
    Add {
        blog_id: String,
        text: String,
    },
    Edit {
        blog_id: String,
        comment_id: String,
        text: String,
    },
    Delete {
        blog_id: String,
        comment_id: String,
    },
}

#[derive(Args, Debug)]
struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Subcommand, Debug)]
enum CategorySubcommand {
    List,
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    Show {
        user_id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(error) = run().await {
        eprintln!("error: {error}");
        process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let api = build_api(&cli)?;

    match cli.command {
        Command::Auth(auth) => run_auth(&api, auth.command).await,
        Command::Profile(profile) => run_profile(&api, profile.command).await,
        Command::Blog(blog) => run_blog(&api, blog.command).await,
        Command::Comment(comment) => run_comment(&api, comment.command).await,
        Command::Category(category) => run_category(&api, category.command).await,
        Command::User(user) => run_user(&api, user.command).await,
    }
}

fn build_api(cli: &Cli) -> Result<ApiClient, CliError> {
    let mut config = ClientConfig::new(&cli.base_url);
    if let Some(path) = &cli.session_file {
        config = config.with_session_file(path.clone());
    }
    let store = CredentialStore::new(config.session_file.clone());
    let auth = AuthState::init(store);
    Ok(ApiClient::new(&config, auth)?)
}

async fn run_auth(api: &ApiClient, command: AuthSubcommand) -> Result<(), CliError> {
    match command {
        AuthSubcommand::Register {
            name,
            username,
            email,
            password,
            picture,
        } => {
            let registration = Registration {
                name,
                username,
                email,
                password: resolve_password(password)?,
                profile_picture: picture.as_deref().map(read_upload).transpose()?,
            };
            let response = auth::register(api, &registration).await?;
            print_json(&json!({ "userId": response.user_id }))?;
            eprintln!("verification code sent; confirm with `inkwell auth verify`");
            Ok(())
        }
        AuthSubcommand::Verify { user_id, code } => {
            auth::verify_email(api, &user_id, &code).await?;
            println!("ok");
            Ok(())
        }
        AuthSubcommand::ResendCode { email } => {
            auth::resend_code(api, &email).await?;
            println!("ok");
            Ok(())
        }
        AuthSubcommand::Login {
            identifier,
            password,
        } => {
            let session = auth::login(api, &identifier, &resolve_password(password)?).await?;
            print_json(&serde_json::to_value(&session.user)?)?;
            Ok(())
        }
        AuthSubcommand::Logout => {
            auth::logout(api).await?;
            println!("ok");
            Ok(())
        }
        AuthSubcommand::Status => {
            let status = match api.auth().session() {
                Some(session) => json!({
                    "loggedIn": true,
                    "user": session.user,
                    "accessTokenExpired": token::is_expired(&session.access_token),
                }),
                None => json!({ "loggedIn": false }),
            };
            print_json(&status)
        }
        AuthSubcommand::Whoami => {
            let user = api.auth().user().ok_or(CliError::NotLoggedIn)?;
            let profile = users::get(api, &user.id).await?;
            print_json(&serde_json::to_value(&profile)?)
        }
        AuthSubcommand::ForgotPassword { email } => {
            auth::forgot_password(api, &email).await?;
            println!("ok");
            Ok(())
        }
        AuthSubcommand::ResetPassword { token, password } => {
            auth::reset_password(api, &token, &resolve_password(password)?).await?;
            println!("ok");
            Ok(())
        }
    }
}

async fn run_profile(api: &ApiClient, command: ProfileSubcommand) -> Result<(), CliError> {
    match command {
        ProfileSubcommand::Update { name, picture } => {
            let update = ProfileUpdate {
                name,
                picture: picture.as_deref().map(read_upload).transpose()?,
            };
            let user = auth::update_profile(api, &update).await?;
            print_json(&serde_json::to_value(&user)?)
        }
    }
}

async fn run_blog(api: &ApiClient, command: BlogSubcommand) -> Result<(), CliError> {
    match command {
        BlogSubcommand::List => {
            let all = blogs::list(api).await?;
            print_json(&serde_json::to_value(&all)?)
        }
        BlogSubcommand::Read { blog_id } => {
            let blog = blogs::get(api, &blog_id).await?;
            print_json(&serde_json::to_value(&blog)?)
        }
        BlogSubcommand::ByUser { user_id } => {
            let all = blogs::by_user(api, &user_id).await?;
            print_json(&serde_json::to_value(&all)?)
        }
        BlogSubcommand::Create {
            title,
            content,
            categories,
            image,
        } => {
            let draft = blogs::BlogDraft {
                title,
                content,
                categories,
                image: image.as_deref().map(read_upload).transpose()?,
            };
            let blog = blogs::create(api, &draft).await?;
            print_json(&serde_json::to_value(&blog)?)
        }
        BlogSubcommand::Update {
            blog_id,
            title,
            content,
            categories,
            image,
        } => {
            let draft = blogs::BlogDraft {
                title,
                content,
                categories,
                image: image.as_deref().map(read_upload).transpose()?,
            };
            let blog = blogs::update(api, &blog_id, &draft).await?;
            print_json(&serde_json::to_value(&blog)?)
        }
        BlogSubcommand::Delete { blog_id } => {
            blogs::delete(api, &blog_id).await?;
            println!("ok");
            Ok(())
        }
    }
}

async fn run_comment(api: &ApiClient, command: CommentSubcommand) -> Result<(), CliError> {
    match command {
        CommentSubcommand::List { blog_id } => {
            let all = comments::list(api, &blog_id).await?;
            print_json(&serde_json::to_value(&all)?)
        }
        CommentSubcommand::Add { blog_id, text } => {
            comments::post(api, &blog_id, &text).await?;
            println!("ok");
            Ok(())
        }
        CommentSubcommand::Edit {
            blog_id,
            comment_id,
            text,
        } => {
            comments::edit(api, &blog_id, &comment_id, &text).await?;
            println!("ok");
            Ok(())
        }
        CommentSubcommand::Delete {
            blog_id,
            comment_id,
        } => {
            comments::delete(api, &blog_id, &comment_id).await?;
            println!("ok");
            Ok(())
        }
    }
}

async fn run_category(api: &ApiClient, command: CategorySubcommand) -> Result<(), CliError> {
    match command {
        CategorySubcommand::List => {
            let all = categories::list(api).await?;
            print_json(&serde_json::to_value(&all)?)
        }
    }
}

async fn run_user(api: &ApiClient, command: UserSubcommand) -> Result<(), CliError> {
    match command {
        UserSubcommand::Show { user_id } => {
            let user = users::get(api, &user_id).await?;
            print_json(&serde_json::to_value(&user)?)
        }
    }
}

/// Use the provided password or read one line from stdin.
fn resolve_password(provided: Option<String>) -> Result<String, CliError> {
    if let Some(password) = provided {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush().map_err(CliError::PasswordRead)?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(CliError::PasswordRead)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn read_upload(path: &std::path::Path) -> Result<FileUpload, CliError> {
    FileUpload::from_path(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
