//! # 容器格式模块
//!
//! 定义紧跟在 BMP 头部之后的字段顺序，字段之间没有填充：
//!
//! | 字段 | 大小 |
//! |---|---|
//! | 魔术字符串长度 | 1 字节 |
//! | 魔术字符串 | 长度字节 |
//! | 扩展名长度 | 1 字节 |
//! | 扩展名 (含 ".") | 长度字节 |
//! | 载荷长度 | 4 字节小端 u32 |
//! | 载荷 | 长度字节 |
//!
//! 编码与解码严格按照同一顺序进行，任何字段都不能跳过或推断。

use crate::constants::{
    MAX_EXTENSION_LEN, MAX_MAGIC_LEN, MAX_PAYLOAD_LEN, PAYLOAD_DECODE_CHUNK,
    PAYLOAD_LEN_FIELD_SIZE,
};
use crate::error::StegError;
use crate::stream::{decode_bytes, encode_bytes};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::fmt;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// 长度在 `1..=MAX` 之间、带单字节长度前缀的字节串。
#[derive(Clone, PartialEq, Eq)]
pub struct BoundedBytes<const MAX: usize> {
    bytes: Vec<u8>,
}

impl<const MAX: usize> BoundedBytes<MAX> {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, StegError> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() > MAX {
            return Err(StegError::InvalidArgument(format!(
                "length must be between 1 and {MAX} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn len_prefix(&self) -> u8 {
        // MAX 不超过 u8::MAX，构造时已检查
        self.bytes.len() as u8
    }
}

impl<const MAX: usize> fmt::Debug for BoundedBytes<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.bytes))
    }
}

impl<const MAX: usize> fmt::Display for BoundedBytes<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

/// 用于认证隐写图像的魔术字符串。
pub type MagicString = BoundedBytes<MAX_MAGIC_LEN>;

/// 秘密文件的扩展名，包含前导 "."。
pub type Extension = BoundedBytes<MAX_EXTENSION_LEN>;

/// 从文件名中取出扩展名：从最后一个 "." 到结尾。
///
/// 没有 "." 或 "." 位于文件名开头 (如 `.bashrc`) 时返回空串。
pub fn extension_of(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[dot..].to_string(),
        _ => String::new(),
    }
}

/// 载荷长度字段的小端编码。
pub fn encode_len(len: u32) -> [u8; PAYLOAD_LEN_FIELD_SIZE] {
    let mut buf = [0u8; PAYLOAD_LEN_FIELD_SIZE];
    LittleEndian::write_u32(&mut buf, len);
    buf
}

pub fn decode_len(bytes: &[u8; PAYLOAD_LEN_FIELD_SIZE]) -> u32 {
    LittleEndian::read_u32(bytes)
}

/// 一次编码所需的全部容器字段。
#[derive(Debug)]
pub struct ContainerRecord {
    magic: MagicString,
    extension: Extension,
    payload: Vec<u8>,
}

impl ContainerRecord {
    pub fn new(
        magic: MagicString,
        extension: Extension,
        payload: Vec<u8>,
    ) -> Result<Self, StegError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(StegError::CapacityExceeded {
                required: payload.len(),
                available: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            magic,
            extension,
            payload,
        })
    }

    pub fn magic(&self) -> &MagicString {
        &self.magic
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// 按固定顺序把所有字段隐写进载体流。
    pub fn write<R, W>(&self, source: &mut R, dest: &mut W) -> Result<(), StegError>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        encode_bytes(&[self.magic.len_prefix()], source, dest, "magic string length")?;
        encode_bytes(self.magic.as_bytes(), source, dest, "magic string")?;
        debug!("Encoded magic string of {} bytes", self.magic.len());

        encode_bytes(&[self.extension.len_prefix()], source, dest, "extension length")?;
        encode_bytes(self.extension.as_bytes(), source, dest, "extension")?;
        debug!("Encoded extension {}", self.extension);

        // 构造时已保证不超过 MAX_PAYLOAD_LEN
        let payload_len = self.payload.len() as u32;
        encode_bytes(&encode_len(payload_len), source, dest, "payload length")?;
        encode_bytes(&self.payload, source, dest, "payload")?;
        debug!("Encoded payload of {payload_len} bytes");

        Ok(())
    }
}

fn read_u8<R: Read>(source: &mut R, field: &'static str) -> Result<u8, StegError> {
    let bytes = decode_bytes(1, source, field)?;
    Ok(bytes[0])
}

/// 解码魔术字符串并与 `expected` 逐字节比较。
///
/// # Errors
///
/// * `CorruptContainer` - 长度为 0 或超过上限。
/// * `AuthenticationFailed` - 内容与 `expected` 不一致。
pub fn read_magic<R: Read>(source: &mut R, expected: &MagicString) -> Result<(), StegError> {
    let len = usize::from(read_u8(source, "magic string length")?);
    if len == 0 || len > MAX_MAGIC_LEN {
        return Err(StegError::CorruptContainer(format!(
            "magic string length {len} is outside 1..={MAX_MAGIC_LEN}"
        )));
    }

    let magic = decode_bytes(len, source, "magic string")?;
    if magic != expected.as_bytes() {
        return Err(StegError::AuthenticationFailed);
    }
    debug!("Authenticated magic string");
    Ok(())
}

pub fn read_extension<R: Read>(source: &mut R) -> Result<Extension, StegError> {
    let len = usize::from(read_u8(source, "extension length")?);
    if len == 0 || len > MAX_EXTENSION_LEN {
        return Err(StegError::CorruptContainer(format!(
            "extension length {len} is outside 1..={MAX_EXTENSION_LEN}"
        )));
    }

    let extension = Extension::new(decode_bytes(len, source, "extension")?)?;
    debug!("Decoded extension {extension}");
    Ok(extension)
}

/// 解码载荷长度。长度为 0 是合法的空载荷。
pub fn read_payload_len<R: Read>(source: &mut R) -> Result<usize, StegError> {
    let bytes = decode_bytes(PAYLOAD_LEN_FIELD_SIZE, source, "payload length")?;
    let mut buf = [0u8; PAYLOAD_LEN_FIELD_SIZE];
    buf.copy_from_slice(&bytes);

    let len = decode_len(&buf) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Err(StegError::CorruptContainer(format!(
            "payload length {len} exceeds the {MAX_PAYLOAD_LEN}-byte ceiling"
        )));
    }
    debug!("Decoded payload length {len}");
    Ok(len)
}

/// 分批解码 `len` 个载荷字节并直接写入 `dest`。
pub fn read_payload<R: Read, W: Write>(
    len: usize,
    source: &mut R,
    dest: &mut W,
) -> Result<(), StegError> {
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(PAYLOAD_DECODE_CHUNK);
        let bytes = decode_bytes(chunk, source, "payload")?;
        dest.write_all(&bytes).map_err(StegError::Stream)?;
        remaining -= chunk;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(magic: &str, ext: &str, payload: &[u8]) -> ContainerRecord {
        ContainerRecord::new(
            MagicString::new(magic).unwrap(),
            Extension::new(ext).unwrap(),
            payload.to_vec(),
        )
        .unwrap()
    }

    fn embed(record: &ContainerRecord, carrier_len: usize) -> Vec<u8> {
        let mut source = Cursor::new(vec![0xAAu8; carrier_len]);
        let mut dest = Cursor::new(Vec::new());
        record.write(&mut source, &mut dest).unwrap();
        dest.into_inner()
    }

    #[test]
    fn extension_uses_last_dot() {
        assert_eq!(extension_of(Path::new("notes.txt")), ".txt");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Path::new("dir.v2/README")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
        assert_eq!(extension_of(Path::new("trailing.")), ".");
    }

    #[test]
    fn length_codec_is_little_endian() {
        assert_eq!(encode_len(0), [0, 0, 0, 0]);
        assert_eq!(encode_len(1), [1, 0, 0, 0]);
        assert_eq!(encode_len(0xFFFF_FFFF), [0xFF; 4]);
        assert_eq!(encode_len(0x0102_0304), [4, 3, 2, 1]);
        for value in [0, 1, 0xFFFF_FFFF] {
            assert_eq!(decode_len(&encode_len(value)), value);
        }
    }

    #[test]
    fn bounded_bytes_rejects_empty_and_oversized() {
        assert!(MagicString::new("").is_err());
        assert!(MagicString::new("x".repeat(MAX_MAGIC_LEN)).is_ok());
        assert!(MagicString::new("x".repeat(MAX_MAGIC_LEN + 1)).is_err());
        assert!(Extension::new(".a").is_ok());
    }

    #[test]
    fn fields_are_decoded_in_written_order() {
        let record = record("KEY123", ".txt", b"hello");
        let stego = embed(&record, 2000);
        let mut source = Cursor::new(stego);

        read_magic(&mut source, record.magic()).unwrap();
        assert_eq!(read_extension(&mut source).unwrap().as_bytes(), b".txt");
        assert_eq!(read_payload_len(&mut source).unwrap(), 5);

        let mut out = Vec::new();
        read_payload(5, &mut source, &mut out).unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(source.position() as usize, (1 + 6 + 1 + 4 + 4 + 5) * 8);
    }

    #[test]
    fn wrong_magic_is_an_authentication_failure() {
        let stego = embed(&record("KEY123", ".txt", b"hi"), 1000);
        let expected = MagicString::new("WRONG").unwrap();

        let err = read_magic(&mut Cursor::new(stego), &expected).unwrap_err();
        assert!(matches!(err, StegError::AuthenticationFailed));
    }

    #[test]
    fn zero_magic_length_is_corrupt() {
        let carrier = vec![0u8; 64];
        let expected = MagicString::new("KEY").unwrap();
        let err = read_magic(&mut Cursor::new(carrier), &expected).unwrap_err();
        assert!(matches!(err, StegError::CorruptContainer(_)));
    }

    #[test]
    fn oversized_extension_length_is_corrupt() {
        // 扩展名长度字节解码为 0xFF
        let carrier = vec![0x01u8; 8];
        let err = read_extension(&mut Cursor::new(carrier)).unwrap_err();
        assert!(matches!(err, StegError::CorruptContainer(_)));
    }

    #[test]
    fn payload_length_above_ceiling_is_corrupt() {
        let carrier = vec![0x01u8; 32];
        let err = read_payload_len(&mut Cursor::new(carrier)).unwrap_err();
        assert!(matches!(err, StegError::CorruptContainer(_)));
    }

    #[test]
    fn empty_payload_round_trips() {
        let stego = embed(&record("K", ".bin", b""), 200);
        let mut source = Cursor::new(stego);

        read_magic(&mut source, &MagicString::new("K").unwrap()).unwrap();
        read_extension(&mut source).unwrap();
        assert_eq!(read_payload_len(&mut source).unwrap(), 0);

        let mut out = Vec::new();
        read_payload(0, &mut source, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn payload_larger_than_one_chunk_is_streamed() {
        let payload: Vec<u8> = (0..PAYLOAD_DECODE_CHUNK * 2 + 17)
            .map(|i| (i % 251) as u8)
            .collect();
        let record = record("K", ".bin", &payload);
        let stego = embed(&record, (payload.len() + 64) * 8);
        let mut source = Cursor::new(stego);

        read_magic(&mut source, record.magic()).unwrap();
        read_extension(&mut source).unwrap();
        let len = read_payload_len(&mut source).unwrap();

        let mut out = Vec::new();
        read_payload(len, &mut source, &mut out).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn writing_into_a_short_carrier_truncates() {
        let record = record("KEY123", ".txt", b"hello");
        let mut source = Cursor::new(vec![0u8; 10]);
        let mut dest = Cursor::new(Vec::new());

        let err = record.write(&mut source, &mut dest).unwrap_err();
        assert!(matches!(err, StegError::StreamTruncated { field: "magic string" }));
    }
}
