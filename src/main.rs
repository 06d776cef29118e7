use anyhow::{anyhow, bail, Context};
use log::info;
use std::sync::Arc;

use planserver::core::config::AppConfig;
use planserver::core::shared::enums::Role;
use planserver::core::shared::state::AppState;
use planserver::core::shared::utils::{create_conn, now, run_migrations};
use planserver::directory::{insert_user, CreateUserRequest};
use planserver::main_module::run_axum_server;
use planserver::tasks::progress::recalculate_all_weights;

const USAGE: &str = "usage: planserver [serve | recalculate-weights | create-user <email> <role>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let pool = create_conn(&config.database_url, config.max_connections)
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    run_migrations(&pool).map_err(|e| anyhow!("failed to run migrations: {e}"))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => {
            info!("Starting planserver {}", env!("CARGO_PKG_VERSION"));
            let state = Arc::new(AppState::new(pool, config));
            run_axum_server(state).await?;
        }
        Some("recalculate-weights") => {
            let mut conn = pool.get()?;
            let touched =
                recalculate_all_weights(&mut conn).context("subtask weight recalculation failed")?;
            info!("Recalculated subtask weights for {touched} tasks");
        }
        Some("create-user") => {
            let (email, role) = match (args.get(1), args.get(2)) {
                (Some(email), Some(role)) => (email, role),
                _ => bail!("{USAGE}"),
            };
            let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
            let mut conn = pool.get()?;
            let request = CreateUserRequest {
                email: email.clone(),
                role,
                department_id: None,
            };
            let user = insert_user(&mut conn, &request, now()).context("could not create user")?;
            println!("{} {} {}", user.id, user.email, user.role);
        }
        Some(other) => bail!("unknown command '{other}'\n{USAGE}"),
    }
    Ok(())
}
