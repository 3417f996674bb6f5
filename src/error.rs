//! # 错误类型模块
//!
//! 定义隐写核心返回的所有错误种类。命令行层再用 `anyhow` 为其附加上下文。

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegError {
    /// 输入文件不存在
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// 没有权限打开文件
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// 其余所有 I/O 错误
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 读写载体流时的 I/O 错误
    #[error("I/O error on the carrier stream")]
    Stream(#[source] io::Error),

    /// 源图像不足 54 字节，无法复制 BMP 头部
    #[error("Image is shorter than the 54-byte BMP header")]
    CorruptHeader,

    /// 无法跳过隐写图像的 BMP 头部
    #[error("Unable to seek past the BMP header")]
    SeekError(#[source] io::Error),

    /// 秘密文件超出图像的可用容量
    #[error("Not enough space in the image: required {required} bytes, available {available} bytes")]
    CapacityExceeded { required: usize, available: usize },

    /// 在某个字段中途耗尽了载体字节
    #[error("Carrier stream ended prematurely while processing the {field}")]
    StreamTruncated { field: &'static str },

    /// 解码出的长度字段为零或不合理
    #[error("Corrupt container: {0}")]
    CorruptContainer(String),

    /// 解码出的魔术字符串与期望值不符
    #[error("The magic string does not match the one embedded in the image")]
    AuthenticationFailed,

    /// 源与目标游标出现偏差，属于内部缺陷
    #[error("Source and destination streams are misaligned (source at {source_pos}, destination at {dest_pos})")]
    AlignmentFault { source_pos: u64, dest_pos: u64 },

    /// 传入编解码原语的参数无效
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl StegError {
    /// 将打开文件时的 `io::Error` 归类为对应的错误种类。
    pub fn open(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => StegError::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => StegError::PermissionDenied(path.to_path_buf()),
            _ => StegError::io(path, source),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        StegError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// 每种错误对应的进程退出码。
    pub fn exit_code(&self) -> i32 {
        match self {
            StegError::FileNotFound(_) => 2,
            StegError::PermissionDenied(_) => 3,
            StegError::Io { .. } | StegError::Stream(_) => 4,
            StegError::CorruptHeader => 5,
            StegError::SeekError(_) => 6,
            StegError::CapacityExceeded { .. } => 7,
            StegError::StreamTruncated { .. } => 8,
            StegError::CorruptContainer(_) => 9,
            StegError::AuthenticationFailed => 10,
            StegError::AlignmentFault { .. } => 11,
            StegError::InvalidArgument(_) => 12,
        }
    }
}

/// 在载体流中读取时出现的 `UnexpectedEof` 视为截断，其余为普通 I/O 错误。
pub(crate) fn read_error(field: &'static str, err: io::Error) -> StegError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        StegError::StreamTruncated { field }
    } else {
        StegError::Stream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_errors_are_classified_by_kind() {
        let path = Path::new("missing.bmp");
        let err = StegError::open(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, StegError::FileNotFound(p) if p == path));

        let err = StegError::open(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, StegError::PermissionDenied(_)));

        let err = StegError::open(path, io::Error::other("disk on fire"));
        assert!(matches!(err, StegError::Io { .. }));
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            StegError::FileNotFound(PathBuf::new()),
            StegError::PermissionDenied(PathBuf::new()),
            StegError::io(Path::new(""), io::Error::other("x")),
            StegError::CorruptHeader,
            StegError::SeekError(io::Error::other("x")),
            StegError::CapacityExceeded { required: 1, available: 0 },
            StegError::StreamTruncated { field: "payload" },
            StegError::CorruptContainer(String::new()),
            StegError::AuthenticationFailed,
            StegError::AlignmentFault { source_pos: 1, dest_pos: 2 },
            StegError::InvalidArgument(String::new()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(StegError::exit_code).collect();
        assert_eq!(StegError::Stream(io::Error::other("x")).exit_code(), 4);
        assert!(codes.iter().all(|&c| c > 1));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn eof_while_reading_is_truncation() {
        let err = read_error("magic string", io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, StegError::StreamTruncated { field: "magic string" }));

        let err = read_error("payload", io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, StegError::Stream(_)));
    }
}
