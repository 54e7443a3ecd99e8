/// Database layer
///
/// - `pool`: Postgres connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
///
/// Entity SQL lives with the models; the `store` module wraps it in
/// connections and transactions.

pub mod migrations;
pub mod pool;
