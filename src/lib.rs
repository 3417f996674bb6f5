//! # bmp_lsb 库
//!
//! 本库包含 BMP 最低有效位隐写工具的核心逻辑：位编解码、载体流编解码、
//! 容器格式、容量校验以及编码 / 解码流水线。

// 声明库包含的所有模块。

pub mod capacity;
pub mod cli;
pub mod constants;
pub mod container;
pub mod error;
pub mod handler;
pub mod header;
pub mod pipeline;
pub mod steganography;
pub mod stream;

pub use error::StegError;
pub use pipeline::{OperationOutcome, decode, encode};
