use bmp_lsb::{
    cli::{Cli, Commands},
    error::StegError,
    handler::{handle_capacity, handle_hide, handle_recover},
};
use clap::Parser;
use colored::Colorize;

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数。失败时以错误种类对应的退出码结束进程
fn main() {
    // RUST_LOG 控制日志级别
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args),
    };

    if let Err(err) = result {
        eprintln!("{} {:?}", "Error:".red().bold(), err);
        let code = err
            .downcast_ref::<StegError>()
            .map_or(1, StegError::exit_code);
        std::process::exit(code);
    }
}
