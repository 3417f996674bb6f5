//! # 载体流编解码模块
//!
//! 在图像字节流上逐字节驱动位编解码器：每个数据字节消耗 8 个载体字节。
//! 编码时源与目标的游标必须始终同步前进。

use crate::constants::CARRIER_BYTES_PER_BYTE;
use crate::error::{StegError, read_error};
use crate::steganography::{CarrierBlock, decode_byte, encode_byte};
use std::io::{self, Read, Seek, Write};

/// 将 `data` 隐写进从 `source` 读出的载体字节，并把结果写入 `dest`。
///
/// `field` 仅用于错误信息，标明当前正在处理的容器字段。
/// 空的 `data` 不消耗任何载体字节。
///
/// # Errors
///
/// * `StreamTruncated` - `source` 中剩余的载体字节不足。
/// * `AlignmentFault` - 调用结束后源与目标的位置不一致。
pub fn encode_bytes<R, W>(
    data: &[u8],
    source: &mut R,
    dest: &mut W,
    field: &'static str,
) -> Result<(), StegError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    for &value in data {
        let mut block: CarrierBlock = [0; CARRIER_BYTES_PER_BYTE];
        source
            .read_exact(&mut block)
            .map_err(|err| read_error(field, err))?;
        dest.write_all(&encode_byte(value, block))
            .map_err(StegError::Stream)?;
    }

    ensure_aligned(source, dest)
}

/// 从 `source` 中恢复 `count` 个数据字节。
///
/// # Errors
///
/// * `InvalidArgument` - `count` 为 0。
/// * `StreamTruncated` - `source` 在恢复完成前耗尽。
pub fn decode_bytes<R: Read>(
    count: usize,
    source: &mut R,
    field: &'static str,
) -> Result<Vec<u8>, StegError> {
    if count == 0 {
        return Err(StegError::InvalidArgument(format!(
            "cannot decode zero bytes for the {field}"
        )));
    }

    (0..count)
        .map(|_| {
            let mut block: CarrierBlock = [0; CARRIER_BYTES_PER_BYTE];
            source
                .read_exact(&mut block)
                .map_err(|err| read_error(field, err))?;
            Ok(decode_byte(&block))
        })
        .collect()
}

/// 将 `source` 余下的字节原样复制到 `dest`，直到源结束。
pub fn copy_tail<R, W>(source: &mut R, dest: &mut W) -> Result<u64, StegError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let copied = io::copy(source, dest).map_err(StegError::Stream)?;
    ensure_aligned(source, dest)?;
    Ok(copied)
}

fn ensure_aligned<R: Seek, W: Seek>(source: &mut R, dest: &mut W) -> Result<(), StegError> {
    let source_pos = source.stream_position().map_err(StegError::Stream)?;
    let dest_pos = dest.stream_position().map_err(StegError::Stream)?;
    if source_pos != dest_pos {
        return Err(StegError::AlignmentFault {
            source_pos,
            dest_pos,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, SeekFrom};

    #[test]
    fn encode_then_decode_recovers_data() {
        let mut source = Cursor::new(vec![0x5Au8; 64]);
        let mut dest = Cursor::new(Vec::new());

        encode_bytes(b"KEY123", &mut source, &mut dest, "magic string").unwrap();
        assert_eq!(source.position(), 48);
        assert_eq!(dest.position(), 48);

        let mut stego = Cursor::new(dest.into_inner());
        let recovered = decode_bytes(6, &mut stego, "magic string").unwrap();
        assert_eq!(recovered, b"KEY123");
    }

    #[test]
    fn encode_fails_when_source_runs_out() {
        let mut source = Cursor::new(vec![0u8; 12]);
        let mut dest = Cursor::new(Vec::new());

        let err = encode_bytes(b"ab", &mut source, &mut dest, "payload").unwrap_err();
        assert!(matches!(err, StegError::StreamTruncated { field: "payload" }));
    }

    #[test]
    fn encode_detects_misaligned_cursors() {
        let mut source = Cursor::new(vec![0u8; 16]);
        let mut dest = Cursor::new(Vec::new());
        dest.seek(SeekFrom::Start(3)).unwrap();

        let err = encode_bytes(b"a", &mut source, &mut dest, "payload").unwrap_err();
        assert!(matches!(
            err,
            StegError::AlignmentFault {
                source_pos: 8,
                dest_pos: 11
            }
        ));
    }

    #[test]
    fn empty_data_consumes_nothing() {
        let mut source = Cursor::new(vec![0u8; 8]);
        let mut dest = Cursor::new(Vec::new());

        encode_bytes(&[], &mut source, &mut dest, "payload").unwrap();
        assert_eq!(source.position(), 0);
        assert!(dest.get_ref().is_empty());
    }

    #[test]
    fn decode_rejects_zero_count() {
        let mut source = Cursor::new(vec![0u8; 8]);
        let err = decode_bytes(0, &mut source, "extension").unwrap_err();
        assert!(matches!(err, StegError::InvalidArgument(_)));
    }

    #[test]
    fn decode_fails_on_partial_block() {
        let mut source = Cursor::new(vec![1u8; 10]);
        let err = decode_bytes(2, &mut source, "extension").unwrap_err();
        assert!(matches!(err, StegError::StreamTruncated { field: "extension" }));
    }

    #[test]
    fn tail_copy_keeps_streams_aligned() {
        let mut source = Cursor::new((0u8..100).collect::<Vec<_>>());
        let mut dest = Cursor::new(Vec::new());
        source.seek(SeekFrom::Start(40)).unwrap();
        dest.write_all(&[0u8; 40]).unwrap();

        let copied = copy_tail(&mut source, &mut dest).unwrap();
        assert_eq!(copied, 60);
        assert_eq!(&dest.get_ref()[40..], &source.get_ref()[40..]);
    }
}
