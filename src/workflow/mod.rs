pub mod fill_ctx;
pub mod fill_flow;

pub use fill_ctx::FillCtx;
pub use fill_flow::FillFlow;
