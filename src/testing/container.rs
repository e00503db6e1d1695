use crate::*;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::{Duration, Instant};
use testcontainers::{
    ContainerRequest, GenericImage, ImageExt,
    core::{IntoContainerPort as _, WaitFor, logs::LogFrame},
    runners::AsyncRunner as _,
};
use tokio::sync::OnceCell;

pub type Container = testcontainers::ContainerAsync<GenericImage>;

const PG_USER: &str = "postgres";
const PG_PASS: &str = "postgres";
const STARTUP_ATTEMPTS: u8 = 3;

/// Shared metastore container, started on first use.
pub async fn postgres() -> &'static Container {
    static POSTGRES: OnceCell<Container> = OnceCell::const_new();
    POSTGRES
        .get_or_init(|| async {
            let mut last_error = None;
            for attempt in 1..=STARTUP_ATTEMPTS {
                match container().await {
                    Ok(container) => return container,
                    Err(e) => {
                        error!("Metastore container attempt {attempt}/{STARTUP_ATTEMPTS}: {e}");
                        last_error = Some(e);
                    }
                }
            }
            panic!("Metastore container never started: {last_error:?}")
        })
        .await
}

/// Connection pool on `database` inside the shared container.
pub(super) async fn pool(database: &str) -> PgPool {
    let container: &Container = postgres().await;
    let url = format!(
        "postgres://{PG_USER}:{PG_PASS}@{}:{}/{database}",
        container.get_host().await.expect("container host"),
        container
            .get_host_port_ipv4(5432)
            .await
            .expect("container port")
    );
    PgPoolOptions::new()
        .max_connections(3)
        .connect(&url)
        .await
        .expect("test database connection")
}

async fn container() -> Result<Container> {
    debug!("Starting metastore container");
    let started = Instant::now();
    let container = image()
        .start()
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;
    debug!("Metastore container ready in {:#.2?}", started.elapsed());
    Ok(container)
}

fn image() -> ContainerRequest<GenericImage> {
    // Durability is irrelevant for throwaway catalogs.
    const PG_INIT_SQL: &[u8] = b"
        ALTER SYSTEM SET fsync = off;
        ALTER SYSTEM SET synchronous_commit = off;
        ALTER SYSTEM SET full_page_writes = off;";

    const fn gb(gb: u64) -> u64 {
        gb * 1024 * 1024 * 1024
    }

    let mut image = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_copy_to("/docker-entrypoint-initdb.d/init.sql", PG_INIT_SQL.to_vec())
        .with_env_var("POSTGRES_USER", PG_USER)
        .with_env_var("POSTGRES_PASSWORD", PG_PASS)
        .with_env_var("POSTGRES_DB", "postgres");

    if config().container_logs {
        image = image.with_log_consumer(|line: &LogFrame| trace!("[metastore] {line:?}"));
    }

    if config().container_ramdisked {
        image = image
            .with_env_var("PGDATA", "/dev/shm/pgdata")
            .with_shm_size(gb(1));
    }

    image.with_startup_timeout(Duration::from_secs(60))
}
