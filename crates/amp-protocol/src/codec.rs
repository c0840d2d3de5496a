//! 寄存器字编解码
//!
//! 32 位数值拆成两个 16 位字：高 16 位在前（字序大端），每个字按原样传输，
//! 不做字内字节交换。编解码本身不会失败；`*_words` 系列函数额外校验字数，
//! 用于处理传输层返回的变长结果。

use crate::ProtocolError;

/// i32 编码为两个寄存器字 `[高字, 低字]`
///
/// ```rust
/// use amp_protocol::encode32;
///
/// assert_eq!(encode32(100_000), [0x0001, 0x86A0]);
/// assert_eq!(encode32(-1), [0xFFFF, 0xFFFF]);
/// ```
#[inline]
pub fn encode32(value: i32) -> [u16; 2] {
    let raw = value as u32;
    [(raw >> 16) as u16, (raw & 0xFFFF) as u16]
}

/// 两个寄存器字 `[高字, 低字]` 解码为 i32（[`encode32`] 的逆运算）
#[inline]
pub fn decode32(words: [u16; 2]) -> i32 {
    (((words[0] as u32) << 16) | words[1] as u32) as i32
}

/// 单个寄存器字按有符号数解释（电流、温度、速度等可为负的遥测）
#[inline]
pub fn decode16_signed(word: u16) -> i16 {
    word as i16
}

/// 单个寄存器字按无符号数解释（电压、报警码、状态码）
#[inline]
pub fn decode16_unsigned(word: u16) -> u16 {
    word
}

/// i16 编码为单个寄存器字（补码原样传输）
#[inline]
pub fn encode16(value: i16) -> u16 {
    value as u16
}

/// 从传输层返回的字切片解码 32 位值
///
/// 字数必须恰好为 2。
pub fn decode32_words(words: &[u16]) -> Result<i32, ProtocolError> {
    match words {
        [hi, lo] => Ok(decode32([*hi, *lo])),
        _ => Err(ProtocolError::InvalidLength {
            expected: 2,
            actual: words.len(),
        }),
    }
}

/// 从传输层返回的字切片取出单个 16 位字
///
/// 字数必须恰好为 1。
pub fn single_word(words: &[u16]) -> Result<u16, ProtocolError> {
    match words {
        [word] => Ok(*word),
        _ => Err(ProtocolError::InvalidLength {
            expected: 1,
            actual: words.len(),
        }),
    }
}
