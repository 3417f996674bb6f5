//! # 编码 / 解码流水线模块
//!
//! 把头部复制、容量校验、容器字段编解码以及尾部复制串成完整流程，
//! 并负责所有文件句柄的打开与释放。任一步骤失败时，已创建的目标文件会被删除。

use crate::capacity::{capacity_budget, ensure_capacity};
use crate::constants::{BMP_HEADER_SIZE, MAX_EXTENSION_LEN, MAX_MAGIC_LEN, MAX_PAYLOAD_LEN};
use crate::container::{
    ContainerRecord, Extension, MagicString, extension_of, read_extension, read_magic,
    read_payload, read_payload_len,
};
use crate::error::StegError;
use crate::header::BmpHeader;
use crate::stream::copy_tail;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// 将载体图像头部原样复制到 `dest`，随后写入容器并复制剩余字节。
///
/// `carrier_bytes` 是头部之后的图像字节数，用于容量校验。
pub fn embed<R, W>(
    source: &mut R,
    dest: &mut W,
    carrier_bytes: usize,
    record: &ContainerRecord,
) -> Result<BmpHeader, StegError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut bytes = [0u8; BMP_HEADER_SIZE];
    source.read_exact(&mut bytes).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => StegError::CorruptHeader,
        _ => StegError::Stream(err),
    })?;
    dest.write_all(&bytes).map_err(StegError::Stream)?;
    let header = BmpHeader::new(bytes);
    debug!(
        "Copied BMP header ({}x{} pixels)",
        header.width(),
        header.height()
    );

    ensure_capacity(carrier_bytes, record.payload().len())?;
    record.write(source, dest)?;

    let copied = copy_tail(source, dest)?;
    debug!("Copied {copied} remaining image bytes");

    Ok(header)
}

/// 将 `secret` 隐写进 `source_image`，结果保存为 `dest_image`。
///
/// 目标文件总是被截断重写。失败时目标文件会被删除。
///
/// # Errors
///
/// * `InvalidArgument` - 魔术字符串为空或过长，或秘密文件没有可用的扩展名。
/// * `FileNotFound` / `PermissionDenied` / `Io` - 文件无法打开或读写。
/// * `CorruptHeader` - 源图像不足 54 字节。
/// * `CapacityExceeded` - 秘密文件超出图像容量。
/// * `StreamTruncated` - 容器字段写到一半时载体字节耗尽。
pub fn encode(
    source_image: &Path,
    secret: &Path,
    dest_image: &Path,
    magic: &str,
) -> Result<PathBuf, StegError> {
    let magic = parse_magic(magic)?;
    let extension = Extension::new(extension_of(secret)).map_err(|_| {
        StegError::InvalidArgument(format!(
            "secret file {} needs an extension of at most {} bytes",
            secret.display(),
            MAX_EXTENSION_LEN
        ))
    })?;

    let source = File::open(source_image).map_err(|err| StegError::open(source_image, err))?;
    let carrier_bytes = file_len(&source, source_image)?
        .checked_sub(BMP_HEADER_SIZE)
        .ok_or(StegError::CorruptHeader)?;
    ensure_distinct(source_image, dest_image)?;

    // 先按文件大小校验容量，再把秘密文件读入内存
    let mut secret_file = File::open(secret).map_err(|err| StegError::open(secret, err))?;
    let secret_len = payload_len(&secret_file, secret, carrier_bytes)?;
    ensure_capacity(carrier_bytes, secret_len)?;
    if secret_len > MAX_PAYLOAD_LEN {
        return Err(StegError::CapacityExceeded {
            required: secret_len,
            available: MAX_PAYLOAD_LEN,
        });
    }
    let mut payload = Vec::with_capacity(secret_len);
    secret_file
        .read_to_end(&mut payload)
        .map_err(|err| StegError::io(secret, err))?;
    ensure_capacity(carrier_bytes, payload.len())?;
    let record = ContainerRecord::new(magic, extension, payload)?;

    let header = write_stego(source, dest_image, carrier_bytes, &record)?;

    info!(
        "Hid {} bytes ({}) in {}x{} image {}",
        record.payload().len(),
        record.extension(),
        header.width(),
        header.height(),
        dest_image.display()
    );
    Ok(dest_image.to_path_buf())
}

/// 目标文件创建成功后才由本函数负责清理。
fn write_stego(
    source: File,
    dest_image: &Path,
    carrier_bytes: usize,
    record: &ContainerRecord,
) -> Result<BmpHeader, StegError> {
    let dest = File::create(dest_image).map_err(|err| StegError::open(dest_image, err))?;

    let result = (|| {
        let mut source = BufReader::new(source);
        let mut dest = BufWriter::new(dest);
        let header = embed(&mut source, &mut dest, carrier_bytes, record)?;
        dest.flush().map_err(|err| StegError::io(dest_image, err))?;
        Ok(header)
    })();
    if result.is_err() {
        remove_partial(dest_image);
    }
    result
}

/// 目标已存在且与载体图像指向同一文件时拒绝编码，否则截断目标会毁掉载体。
fn ensure_distinct(source_image: &Path, dest_image: &Path) -> Result<(), StegError> {
    if !dest_image.exists() {
        return Ok(());
    }
    let source = fs::canonicalize(source_image).map_err(|err| StegError::io(source_image, err))?;
    let dest = fs::canonicalize(dest_image).map_err(|err| StegError::io(dest_image, err))?;
    if source == dest {
        return Err(StegError::InvalidArgument(format!(
            "output image {} is the carrier image itself",
            dest_image.display()
        )));
    }
    Ok(())
}

/// 文件长度；超出 `usize` 的部分在本平台上本就无法寻址，按 `usize::MAX` 处理。
fn file_len(file: &File, path: &Path) -> Result<usize, StegError> {
    let len = file.metadata().map_err(|err| StegError::io(path, err))?.len();
    Ok(usize::try_from(len).unwrap_or(usize::MAX))
}

fn payload_len(file: &File, path: &Path, carrier_bytes: usize) -> Result<usize, StegError> {
    let len = file.metadata().map_err(|err| StegError::io(path, err))?.len();
    usize::try_from(len).map_err(|_| StegError::CapacityExceeded {
        required: usize::MAX,
        available: capacity_budget(carrier_bytes),
    })
}

/// 从 `stego_image` 中恢复秘密文件，保存为 `dest_base` + 解码出的扩展名。
///
/// 目标文件在载荷长度解码完成后才会创建；只有本次创建的目标文件会在失败时被删除，
/// 此前已存在的同名文件在创建之前的任何失败中都保持不变。
///
/// # Errors
///
/// * `SeekError` - 图像不足 54 字节，无法跳过头部。
/// * `AuthenticationFailed` - 魔术字符串不匹配。
/// * `CorruptContainer` - 长度字段为 0 或不合理。
/// * `StreamTruncated` - 图像在容器中途结束。
pub fn decode(stego_image: &Path, dest_base: &Path, magic: &str) -> Result<PathBuf, StegError> {
    let magic = parse_magic(magic)?;

    let file = File::open(stego_image).map_err(|err| StegError::open(stego_image, err))?;
    let image_len = file
        .metadata()
        .map_err(|err| StegError::io(stego_image, err))?
        .len();
    if image_len < BMP_HEADER_SIZE as u64 {
        return Err(StegError::SeekError(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("image is only {image_len} bytes long"),
        )));
    }

    let mut source = BufReader::new(file);
    source
        .seek(SeekFrom::Start(BMP_HEADER_SIZE as u64))
        .map_err(StegError::SeekError)?;

    read_magic(&mut source, &magic)?;
    let extension = read_extension(&mut source)?;
    let len = read_payload_len(&mut source)?;
    let output = output_path(dest_base, &extension);

    write_secret(&mut source, &output, len)?;

    info!("Recovered {len} bytes into {}", output.display());
    Ok(output)
}

/// 目标文件创建成功后才由本函数负责清理。
fn write_secret<R: Read>(source: &mut R, output: &Path, len: usize) -> Result<(), StegError> {
    let file = File::create(output).map_err(|err| StegError::open(output, err))?;

    let result = (|| {
        let mut dest = BufWriter::new(file);
        read_payload(len, source, &mut dest)?;
        dest.flush().map_err(|err| StegError::io(output, err))
    })();
    if result.is_err() {
        remove_partial(output);
    }
    result
}

/// 读取图像头部，并返回头部之后可用作载体的字节数。
pub fn inspect(image: &Path) -> Result<(BmpHeader, usize), StegError> {
    let mut file = File::open(image).map_err(|err| StegError::open(image, err))?;
    let mut bytes = [0u8; BMP_HEADER_SIZE];
    file.read_exact(&mut bytes).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => StegError::CorruptHeader,
        _ => StegError::io(image, err),
    })?;
    let image_len = file_len(&file, image)?;

    Ok((BmpHeader::new(bytes), image_len.saturating_sub(BMP_HEADER_SIZE)))
}

/// 目标路径为基础路径直接拼接扩展名，例如 `out/secret` + `.txt`。
pub fn output_path(dest_base: &Path, extension: &Extension) -> PathBuf {
    let mut name = OsString::from(dest_base.as_os_str());
    name.push(extension.to_string());
    PathBuf::from(name)
}

fn parse_magic(magic: &str) -> Result<MagicString, StegError> {
    MagicString::new(magic).map_err(|_| {
        StegError::InvalidArgument(format!(
            "magic string must be between 1 and {MAX_MAGIC_LEN} bytes"
        ))
    })
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed partial output {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("Unable to remove partial output {}: {err}", path.display()),
    }
}

/// 供绑定层使用的操作结果：成功标志、可读信息以及输出路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    pub output_path: Option<PathBuf>,
}

impl From<Result<PathBuf, StegError>> for OperationOutcome {
    fn from(result: Result<PathBuf, StegError>) -> Self {
        match result {
            Ok(path) => Self {
                success: true,
                message: format!("Operation succeeded: {}", path.display()),
                output_path: Some(path),
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                output_path: None,
            },
        }
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
