use crate::constants::{BMP_HEADER_SIZE, BMP_HEIGHT_OFFSET, BMP_WIDTH_OFFSET};
use byteorder::{ByteOrder, LittleEndian};

/// 原样保留的 54 字节 BMP 头部。
///
/// 除宽高外不做任何解析，像素格式被假定为未压缩的 24 位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    bytes: [u8; BMP_HEADER_SIZE],
}

impl BmpHeader {
    pub fn new(bytes: [u8; BMP_HEADER_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; BMP_HEADER_SIZE] {
        &self.bytes
    }

    pub fn width(&self) -> i32 {
        LittleEndian::read_i32(&self.bytes[BMP_WIDTH_OFFSET..])
    }

    /// 负值表示自上而下存储的图像。
    pub fn height(&self) -> i32 {
        LittleEndian::read_i32(&self.bytes[BMP_HEIGHT_OFFSET..])
    }

    /// 按 24 位像素估算的像素数据大小 (宽 × 高 × 3)。
    pub fn pixel_bytes(&self) -> u64 {
        u64::from(self.width().unsigned_abs()) * u64::from(self.height().unsigned_abs()) * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_dimensions_little_endian() {
        let mut bytes = [0u8; BMP_HEADER_SIZE];
        bytes[0] = b'B';
        bytes[1] = b'M';
        LittleEndian::write_i32(&mut bytes[18..22], 640);
        LittleEndian::write_i32(&mut bytes[22..26], -480);

        let header = BmpHeader::new(bytes);
        assert_eq!(header.width(), 640);
        assert_eq!(header.height(), -480);
        assert_eq!(header.pixel_bytes(), 640 * 480 * 3);
        assert_eq!(&header.as_bytes()[..2], b"BM");
    }
}
