/// BMP 文件的标准头部大小 (字节)。
/// 隐写操作将跳过这个头部，从像素数据开始。
pub const BMP_HEADER_SIZE: usize = 54;

/// 头部中图像宽度字段的偏移量 (小端 i32)。
pub const BMP_WIDTH_OFFSET: usize = 18;

/// 头部中图像高度字段的偏移量 (小端 i32)。
pub const BMP_HEIGHT_OFFSET: usize = 22;

/// 隐写一个数据字节所需的载体字节数。
/// 每个载体字节只存储 1 bit (最低有效位)，因此 8 bits 需要 8 个载体字节。
pub const CARRIER_BYTES_PER_BYTE: usize = 8;

/// 计算容量时额外保留的安全字节数。
pub const CAPACITY_SAFETY_MARGIN: usize = 1;

/// 魔术字符串的最大长度 (字节)。
pub const MAX_MAGIC_LEN: usize = 20;

/// 文件扩展名 (含前导 ".") 的最大长度 (字节)。
pub const MAX_EXTENSION_LEN: usize = 20;

/// 载荷长度字段的字节数 (小端 u32)。
pub const PAYLOAD_LEN_FIELD_SIZE: usize = 4;

/// 可接受的最大载荷大小：100 MiB。
pub const MAX_PAYLOAD_LEN: usize = 100 * 1024 * 1024;

/// 解码载荷时每批次恢复的字节数。
pub const PAYLOAD_DECODE_CHUNK: usize = 4096;
