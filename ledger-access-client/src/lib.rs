//! A Rust client library for ledger access nodes.
//!
//! This crate lets applications query an access node and subscribe to its
//! streams over two transports, translating wire messages into the domain
//! types of [`model`].
//!
//! # Key Components
//!
//! *   [`grpc::GrpcClient`]: The full API over gRPC, including the execution data
//!     and event subscriptions.
//! *   [`http::HttpClient`]: The read and submit API over REST/JSON.
//! *   [`subscription`]: The engine that turns one server stream into a channel
//!     of decoded values plus a single-slot error channel, with cooperative
//!     cancellation through a [`subscription::CancelToken`].
//! *   [`payload`]: Decoders for the JSON-CDC and CCF event payload encodings.
/// RLP messages signed by wallets to prove account ownership.
pub mod account_proof;
/// Defines configuration structures for the clients.
pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod model;
pub mod payload;
pub mod subscription;

pub use error::{AccessError, ApiError, Result};
pub use grpc::GrpcClient;
pub use http::HttpClient;
pub use subscription::{CancelToken, SubscribeOptions, Subscription};
