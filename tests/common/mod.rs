#![allow(dead_code)]

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_shipping::db::{DbPool, establish_connection_pool};
use pushkind_shipping::models::order::{NewOrder, NewOrderItem};
use pushkind_shipping::schema::{order_items, orders};
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite database in a temporary directory, removed on drop.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        {
            let mut conn = pool.get().expect("get connection");
            conn.run_pending_migrations(MIGRATIONS)
                .expect("run migrations");
        }
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Inserts a processing order with the given `(sku, qty_ordered)` lines.
    /// Returns the order id and the ids of its lines.
    pub fn seed_order(&self, increment_id: &str, lines: &[(&str, f64)]) -> (i32, Vec<i32>) {
        let mut conn = self.pool.get().expect("get connection");
        let order_id = diesel::insert_into(orders::table)
            .values(NewOrder {
                increment_id,
                state: "processing",
                customer_email: Some("customer@example.com"),
            })
            .returning(orders::id)
            .get_result::<i32>(&mut conn)
            .expect("insert order");

        let item_ids = lines
            .iter()
            .map(|(sku, qty)| {
                diesel::insert_into(order_items::table)
                    .values(NewOrderItem {
                        order_id,
                        sku,
                        name: sku,
                        qty_ordered: *qty,
                    })
                    .returning(order_items::id)
                    .get_result::<i32>(&mut conn)
                    .expect("insert order item")
            })
            .collect();

        (order_id, item_ids)
    }
}
