//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责准备路径与魔术字符串、调用隐写流水线以及向用户报告结果。

use crate::capacity::{capacity_budget, check_capacity, container_footprint};
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{CARRIER_BYTES_PER_BYTE, MAX_MAGIC_LEN};
use crate::container::extension_of;
use crate::pipeline::{decode, encode, inspect};
use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Password;
use std::fs;
use std::path::{Path, PathBuf};

/// 未指定输出路径时，隐写图像的默认文件名。
const DEFAULT_STEGO_NAME: &str = "stego.bmp";

/// 未指定输出路径时，恢复文件的默认基础名。
const DEFAULT_SECRET_BASE: &str = "secret";

/// 取得魔术字符串：优先使用命令行或环境变量，否则在终端提示输入。
fn resolve_magic(magic: Option<String>) -> Result<String> {
    match magic {
        Some(magic) => Ok(magic),
        None => Password::new()
            .with_prompt("Magic string")
            .interact()
            .context("Unable to read the magic string from the terminal"),
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责确定输出路径、检查覆盖保护、取得魔术字符串，
/// 然后调用编码流水线将秘密文件写入目标图像。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`，或目标与载体图像是同一文件。
/// * 无法读取输入的图像或秘密文件。
/// * 图像文件没有足够的空间来隐藏秘密文件。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| default_stego_path(&args.image));

    anyhow::ensure!(
        args.force || !dest.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );

    let magic = resolve_magic(args.magic)?;

    let dest = encode(&args.image, &args.secret, &dest, &magic).with_context(|| {
        format!(
            "Failed to hide {} in {}",
            args.secret.to_string_lossy().red().bold(),
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责确定输出基础路径、取得魔术字符串，然后调用解码流水线。
/// 最终文件名为基础路径加上图像中记录的扩展名。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 魔术字符串不匹配，或图像中不包含有效的隐写数据。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let base = args
        .output
        .unwrap_or_else(|| default_secret_base(&args.image));
    let magic = resolve_magic(args.magic)?;

    let output = decode(&args.image, &base, &magic).with_context(|| {
        format!(
            "Failed to recover a hidden file from '{}'. \nThe image may not contain hidden data or the magic string is wrong.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully recovered and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 打印图像尺寸、载体字节数与容量预算；若给出秘密文件，
/// 还会报告完整容器所需的字节数以及能否放入图像。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let (header, carrier_bytes) = inspect(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Image: {} ({}x{} pixels)",
        args.image.to_string_lossy().bold(),
        header.width(),
        header.height()
    );
    println!("Carrier bytes after header: {}", carrier_bytes);
    println!(
        "Capacity budget: {} bytes",
        capacity_budget(carrier_bytes).to_string().green().bold()
    );

    if let Some(secret) = args.secret {
        let report = SecretFit::measure(&secret, args.magic.as_deref(), carrier_bytes)?;
        println!(
            "Secret {}: {} bytes, container {} bytes ({} carrier bytes)",
            secret.to_string_lossy().bold(),
            report.payload_len,
            report.footprint,
            report.footprint.saturating_mul(CARRIER_BYTES_PER_BYTE)
        );
        if report.fits {
            println!("{}", "The secret fits in the image.".green().bold());
        } else {
            println!("{}", "The secret does not fit in the image.".red().bold());
        }
    }

    Ok(())
}

/// 秘密文件与图像容量的比对结果。
#[derive(Debug, PartialEq, Eq)]
pub struct SecretFit {
    pub payload_len: usize,
    pub footprint: usize,
    pub fits: bool,
}

impl SecretFit {
    /// 未给出魔术字符串时按最大长度估算。
    pub fn measure(secret: &Path, magic: Option<&str>, carrier_bytes: usize) -> Result<Self> {
        let payload_len = fs::metadata(secret)
            .with_context(|| {
                format!(
                    "Unable to read secret file: {}",
                    secret.to_string_lossy().red().bold()
                )
            })?
            .len();
        let payload_len = usize::try_from(payload_len).unwrap_or(usize::MAX);
        let magic_len = magic.map_or(MAX_MAGIC_LEN, str::len);
        let footprint = container_footprint(magic_len, extension_of(secret).len(), payload_len);
        let fits = check_capacity(carrier_bytes, payload_len)
            && footprint.saturating_mul(CARRIER_BYTES_PER_BYTE) <= carrier_bytes;

        Ok(Self {
            payload_len,
            footprint,
            fits,
        })
    }
}

/// 隐写图像的默认输出路径：载体图像同目录下的 `stego.bmp`。
pub fn default_stego_path(image: &Path) -> PathBuf {
    image.with_file_name(DEFAULT_STEGO_NAME)
}

/// 恢复文件的默认基础路径：图像同目录下的 `secret`。
pub fn default_secret_base(image: &Path) -> PathBuf {
    image.with_file_name(DEFAULT_SECRET_BASE)
}
