pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    BinaryInfo, BinaryOrigin, Container, DownloadEvent, DownloadRequest, Mode, Quality, Tool,
};
