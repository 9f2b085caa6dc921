pub mod app_builder;
pub mod auth;

// Re-export only what current tests actually import
pub use app_builder::create_test_app;
