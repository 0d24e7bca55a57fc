//! Server entry point.
//!
//! Resolves settings from the environment, connects to whichever database the
//! resolver picked, wires the services together and serves the Axum router.

use std::{env, sync::Arc};

use anyhow::Context;
use application::{
    AccountService, AccountServiceDependencies, BlogService, BlogServiceDependencies,
    RegisterUserRequest, SystemClock,
};
use config::Settings;
use infrastructure::{
    create_pool, ensure_schema, BcryptPasswordHasher, SqlBlogPostRepository, SqlUserRepository,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to resolve settings")?;
    settings.validate().context("invalid settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if settings.debug {
        tracing::warn!("settings (redacted): {}", settings.redacted());
    }

    let engine = settings.database.engine();
    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to the database")?;
    ensure_schema(&pool, engine)
        .await
        .context("failed to prepare the database schema")?;

    let post_repository = Arc::new(SqlBlogPostRepository::new(pool.clone(), engine));
    let user_repository = Arc::new(SqlUserRepository::new(pool, engine));
    let password_hasher = Arc::new(BcryptPasswordHasher::new(settings.server.bcrypt_cost));
    let clock = Arc::new(SystemClock);

    let blog_service = Arc::new(BlogService::new(BlogServiceDependencies {
        post_repository,
        clock: clock.clone(),
    }));
    let account_service = Arc::new(AccountService::new(AccountServiceDependencies {
        user_repository,
        password_hasher,
        clock,
    }));

    // `blogapi create-admin <username> <email> <password>` bootstraps the
    // first staff account, then exits.
    let args: Vec<String> = env::args().skip(1).collect();
    if let Some(command) = args.first() {
        if command == "create-admin" {
            let (username, email, password) = match &args[1..] {
                [username, email, password] => {
                    (username.clone(), email.clone(), password.clone())
                }
                _ => anyhow::bail!("usage: blogapi create-admin <username> <email> <password>"),
            };
            let admin = account_service
                .register_staff(RegisterUserRequest {
                    username,
                    email,
                    password,
                })
                .await
                .context("failed to create the staff account")?;
            tracing::info!(username = %admin.username, "staff account created");
            return Ok(());
        }
        anyhow::bail!("unknown command: {command}");
    }

    let token_service = Arc::new(TokenService::new(settings.jwt.clone()));
    let state = AppState::new(
        blog_service,
        account_service,
        token_service,
        Arc::new(settings.clone()),
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                settings.server.host, settings.server.port
            )
        })?;

    tracing::info!(
        "blog API listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
