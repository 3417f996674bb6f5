//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 BMP 图像中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 BMP 图像中隐藏或恢复任意文件。\n\
                  设置 RUST_LOG=debug 可查看每个容器字段的处理日志。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量查询)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将任意文件隐藏到 BMP 图像中。
    Hide(HideArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 查看 BMP 图像的尺寸及可隐藏的最大字节数。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用作载体的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的秘密文件路径，必须带有扩展名。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 结果图像的输出路径，默认为载体图像同目录下的 `stego.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 魔术字符串，省略时将在终端提示输入。
    #[arg(short, long, env = "BMP_LSB_MAGIC", hide_env_values = true)]
    pub magic: Option<String>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文件的基础路径 (不含扩展名)，默认为图像同目录下的 `secret`。
    /// 解码出的扩展名会直接拼接在后面。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 魔术字符串，省略时将在终端提示输入。
    #[arg(short, long, env = "BMP_LSB_MAGIC", hide_env_values = true)]
    pub magic: Option<String>,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 可选：检查该文件能否放入图像。
    #[arg(short, long)]
    pub secret: Option<PathBuf>,

    /// 可选：计算容器大小时使用的魔术字符串，省略时按最大长度估算。
    #[arg(short, long, env = "BMP_LSB_MAGIC", hide_env_values = true)]
    pub magic: Option<String>,
}
