//! Infrastructure Adapters - 外部能力适配器

pub mod backend;

pub use backend::{
    FakeBackendConfig, FakeFailure, FakeSynthesisBackend, HttpBackendConfig, HttpSynthesisBackend,
};
