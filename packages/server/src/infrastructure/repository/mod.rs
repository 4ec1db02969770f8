//! Message Repository の実装
//!
//! - `inmemory`: プロセス内の Vec を使った実装（DB 未設定時・テスト用）
//! - `postgres`: sqlx による PostgreSQL 実装

pub mod inmemory;
pub mod postgres;

pub use inmemory::InMemoryMessageRepository;
pub use postgres::PostgresMessageRepository;
