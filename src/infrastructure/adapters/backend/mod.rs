//! 合成后端适配器

mod fake_backend;
mod http_backend;

pub use fake_backend::{FakeBackendConfig, FakeFailure, FakeSynthesisBackend};
pub use http_backend::{HttpBackendConfig, HttpSynthesisBackend};
