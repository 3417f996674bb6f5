use crate::constants::CARRIER_BYTES_PER_BYTE;

/// 一个数据字节所对应的载体字节组。
pub type CarrierBlock = [u8; CARRIER_BYTES_PER_BYTE];

/// 将 `value` 逐位写入 8 个载体字节的最低有效位，低位在前。
///
/// 第 `i` 个载体字节的 LSB 被替换为 `(value >> i) & 1`，其余 7 位保持不变。
pub fn encode_byte(value: u8, carriers: CarrierBlock) -> CarrierBlock {
    let mut block = carriers;
    for (i, byte) in block.iter_mut().enumerate() {
        *byte = (*byte & 0xFE) | ((value >> i) & 1);
    }
    block
}

/// `encode_byte` 的逆运算：只读取每个载体字节的最低有效位。
pub fn decode_byte(carriers: &CarrierBlock) -> u8 {
    carriers
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &byte)| acc | ((byte & 1) << i))
}
