#![cfg(test)]
crate::reexport!(container);
crate::reexport!(context);
pub use rstest::*;

use crate::*;
use std::sync::Arc;

pub(crate) fn common_init() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Only initialize once for all tests
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env()) // <- reads RUST_LOG
            .with_test_writer() // ensures it integrates with `cargo test` output
            .init();
    });
}

const CATALOG: &str = r#"{
    "name": "hive",
    "schemas": [
        {"name": "default", "tables": [
            {"name": "events", "columns": [
                {"name": "id", "type": "bigint"},
                {"name": "payload", "type": "map<string,string>"},
                {"name": "created_at", "type": "timestamp"}
            ]},
            {"name": "users", "columns": [
                {"name": "id", "type": "bigint"},
                {"name": "email", "type": "varchar(255)"}
            ]}
        ]},
        {"name": "sales", "tables": [
            {"name": "orders", "columns": [
                {"name": "order_id", "type": "bigint"},
                {"name": "user_id", "type": "bigint"},
                {"name": "total", "type": "decimal(10,2)"}
            ]}
        ]}
    ]
}"#;

/// Small two-schema catalog shared by service-level tests.
#[fixture]
pub fn catalog() -> Arc<Database> {
    common_init();
    Arc::new(Database::from_json(CATALOG).expect("catalog fixture should parse"))
}

mod isolated_integration_tests {
    use super::*;

    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    #[ignore = "requires docker"]
    async fn can_connect(ctx: &mut IsolatedIntegrationTest) -> Result {
        sqlx::query("SELECT 1;").fetch_one(&ctx.pool).await?;
        Ok(())
    }

    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    #[ignore = "requires docker"]
    async fn can_read(ctx: &mut IsolatedIntegrationTest) -> Result {
        let database: String = sqlx::query_scalar("SELECT current_database();")
            .fetch_one(&ctx.pool)
            .await?;
        assert_eq!(ctx.database, database);
        Ok(())
    }

    #[test_context(IsolatedIntegrationTest)]
    #[rstest]
    #[case("CREATE TABLE a (id INT); CREATE TABLE b (id INT);", 2)]
    #[case("CREATE SCHEMA s;\nCREATE TABLE s.c (note TEXT);\n-- trailing comment", 1)]
    #[tokio::test]
    #[ignore = "requires docker"]
    async fn runs_scripts_statement_by_statement(
        ctx: &mut IsolatedIntegrationTest,
        #[case] script: &str,
        #[case] tables: i64,
    ) -> Result {
        ctx.run_script(script).await?;

        let actual: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema NOT IN ('pg_catalog', 'information_schema')",
        )
        .fetch_one(&ctx.pool)
        .await?;
        assert_eq!(tables, actual);
        Ok(())
    }
}
