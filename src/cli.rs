use actix_web::{App, HttpServer, web};
use clap::{Parser, Subcommand};
use std::io;
use tracing::info;

use crate::api::{
    auth::JwtAuth,
    health::health_config,
    job::{handlers::job_config, JobService},
    validation,
};
use crate::config::{AuthConfig, Config};
use crate::db;
use crate::logging::init_logging;
use crate::shutdown::ShutdownCoordinator;

#[derive(Parser)]
#[command(name = "jobly", about = "Job postings REST service")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print a signed bearer token
    Token {
        #[arg(long)]
        username: String,
        /// Grant access to the admin-only routes
        #[arg(long)]
        admin: bool,
    },
}

pub async fn run() -> io::Result<()> {
    let args = Cmd::parse();

    match args.command.unwrap_or(SubCommandType::Serve) {
        SubCommandType::Serve => {
            let config = Config::from_env().map_err(io::Error::other)?;
            init_logging(&config.log_dir)?;
            serve(config).await
        }
        SubCommandType::Migrate => {
            let config = Config::from_env().map_err(io::Error::other)?;
            init_logging(&config.log_dir)?;
            let pool = db::connection::get_connection(&config.database_url, 1)
                .await
                .map_err(io::Error::other)?;
            db::migrations::run_migrations(&pool)
                .await
                .map_err(io::Error::other)?;
            pool.close().await;
            Ok(())
        }
        SubCommandType::Token { username, admin } => {
            let token = issue_token(AuthConfig::from_env(), &username, admin)?;
            println!("{}", token);
            Ok(())
        }
    }
}

fn issue_token(auth: AuthConfig, username: &str, admin: bool) -> io::Result<String> {
    JwtAuth::new(auth.secret_key, auth.token_ttl_secs)
        .create_token(username, admin)
        .map_err(io::Error::other)
}

async fn serve(config: Config) -> io::Result<()> {
    let Config {
        database_url,
        auth,
        host,
        port,
        max_payload_size,
        max_db_connections,
        ..
    } = config;

    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .map_err(io::Error::other)?;

    info!("Starting jobly");
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Max database connections: {}", max_db_connections);
    info!("Database connection pool established");

    // Auto-migrate when starting the server
    db::migrations::run_migrations(&pool)
        .await
        .map_err(io::Error::other)?;

    let job_service = web::Data::new(JobService::new(pool.clone()));
    let jwt_auth = web::Data::new(JwtAuth::new(auth.secret_key, auth.token_ttl_secs));
    let server_pool = web::Data::new(pool.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_pool.clone())
            .app_data(job_service.clone())
            .app_data(jwt_auth.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .app_data(validation::query_config())
            .app_data(validation::path_config())
            .configure(health_config)
            .configure(job_config)
    })
    .bind((host.as_str(), port))?
    .run();

    info!("Server starting on http://{}:{}", host, port);

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cmd = Cmd::try_parse_from(["jobly"]).unwrap();
        assert!(cmd.command.is_none());
    }

    #[test]
    fn test_token_subcommand_flags() {
        let cmd =
            Cmd::try_parse_from(["jobly", "token", "--username", "admin", "--admin"]).unwrap();

        match cmd.command {
            Some(SubCommandType::Token { username, admin }) => {
                assert_eq!(username, "admin");
                assert!(admin);
            }
            _ => panic!("expected token subcommand"),
        }
    }

    #[test]
    fn test_issue_token_uses_auth_settings_only() {
        let auth = AuthConfig {
            secret_key: "cli-secret".to_string(),
            token_ttl_secs: 600,
        };

        let token = issue_token(auth, "admin", true).unwrap();

        let claims = JwtAuth::new("cli-secret", 600).validate_token(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 600);
    }
}
