//! # 容量校验模块
//!
//! 在写入任何目标字节之前，根据图像大小判断秘密文件能否放得下。
//!
//! 注意：`capacity_budget` 只为原始载荷计算预算，没有把魔术字符串、扩展名
//! 以及长度字段占用的 `(1 + magic + 1 + ext + 4) * 8` 个载体字节算进去，
//! 因此它略微高估了真实容量。这些字段超出时会在编码中途以
//! `StreamTruncated` 失败。特别地，载荷恰好等于预算时校验一定通过，
//! 但编码一定会在载荷字段中途以 `StreamTruncated { field: "payload" }` 失败。
//! `container_footprint` 给出精确的占用量。

use crate::constants::{CAPACITY_SAFETY_MARGIN, CARRIER_BYTES_PER_BYTE, PAYLOAD_LEN_FIELD_SIZE};
use crate::error::StegError;

/// 头部之后的 `carrier_bytes` 个字节最多能容纳多少载荷字节。
pub fn capacity_budget(carrier_bytes: usize) -> usize {
    carrier_bytes.saturating_sub(CAPACITY_SAFETY_MARGIN) / CARRIER_BYTES_PER_BYTE
}

pub fn check_capacity(carrier_bytes: usize, secret_len: usize) -> bool {
    secret_len <= capacity_budget(carrier_bytes)
}

/// 与 `check_capacity` 相同，但失败时返回 `CapacityExceeded`。
pub fn ensure_capacity(carrier_bytes: usize, secret_len: usize) -> Result<(), StegError> {
    if !check_capacity(carrier_bytes, secret_len) {
        return Err(StegError::CapacityExceeded {
            required: secret_len,
            available: capacity_budget(carrier_bytes),
        });
    }
    Ok(())
}

/// 完整容器 (含所有长度前缀) 在数据字节层面的大小。
pub fn container_footprint(magic_len: usize, extension_len: usize, payload_len: usize) -> usize {
    (1 + 1 + PAYLOAD_LEN_FIELD_SIZE)
        .saturating_add(magic_len)
        .saturating_add(extension_len)
        .saturating_add(payload_len)
}
