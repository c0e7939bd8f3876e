use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use rolegate_cli::{check_password, check_username, split_names};
use rolegate_config::DatabaseConfig;
use rolegate_core::hash_password;
use rolegate_db::{CredentialStore, PgCredentialStore, PgPool, init_db_pool, run_migrations};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "rolegate-cli")]
#[command(about = "rolegate CLI - Administrative tools for rolegate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List the permission catalogue
    Permissions,
    /// Create a role granting the given permissions
    CreateRole {
        /// Role name
        #[arg(short = 'n', long)]
        name: String,

        /// Comma separated permission names
        #[arg(short = 'p', long)]
        permissions: Option<String>,
    },
    /// Create a user account
    CreateUser {
        /// Username (prompted if not provided)
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Comma separated role names
        #[arg(short = 'r', long)]
        roles: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Permissions => handle_permissions(&pool).await,
        Commands::CreateRole { name, permissions } => {
            handle_create_role(&pool, &name, permissions.as_deref()).await
        }
        Commands::CreateUser {
            username,
            password,
            roles,
        } => handle_create_user(&pool, username, password, roles.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    Ok(init_db_pool(&config).await?)
}

async fn handle_migrate(pool: &PgPool) -> CliResult {
    run_migrations(pool).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_permissions(pool: &PgPool) -> CliResult {
    let store = PgCredentialStore::new(pool.clone());

    for permission in store.list_permissions().await? {
        match permission.description {
            Some(description) => println!("{:<16} {}", permission.name, description),
            None => println!("{}", permission.name),
        }
    }
    Ok(())
}

async fn handle_create_role(pool: &PgPool, name: &str, permissions: Option<&str>) -> CliResult {
    let store = PgCredentialStore::new(pool.clone());
    let role = store.create_role(name, &split_names(permissions)).await?;

    println!("\n✅ Role created successfully!");
    println!("   Id: {}", role.id);
    println!("   Name: {}", role.name);
    println!("   Permissions: {}", role.permissions.join(", "));
    Ok(())
}

async fn handle_create_user(
    pool: &PgPool,
    username: Option<String>,
    password: Option<String>,
    roles: Option<&str>,
) -> CliResult {
    let username = match username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    check_username(&username)?;

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };
    check_password(&password)?;

    let password_hash = hash_password(&password).map_err(|e| e.error.to_string())?;

    let store = PgCredentialStore::new(pool.clone());
    let user = store
        .create_user(&username, &password_hash, &split_names(roles))
        .await?;

    println!("\n✅ User created successfully!");
    println!("   Id: {}", user.id);
    println!("   Username: {}", user.username);
    println!("   Roles: {}", user.roles.join(", "));
    Ok(())
}
