pub mod builder;
pub mod handler;
pub mod listener;
pub mod response;
pub mod shutdown;
pub mod static_files;

pub use builder::ServerBuilder;
pub use handler::{AppState, RequestHandler, HEALTH_PATH, MODEL_INFO_PATH, PREDICTION_PATH};
pub use shutdown::shutdown_signal;
pub use static_files::StaticFiles;
