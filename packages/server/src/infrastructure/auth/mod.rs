//! Token validator の実装
//!
//! - `http`: 外部認証サービスに JSON で問い合わせる実装

pub mod http;

pub use http::HttpTokenValidator;
