use anyhow::Result;
use clap::Parser;
use rubric_grader::cli::Cli;
use rubric_grader::config::Config;
use rubric_grader::logger;
use rubric_grader::orchestrator::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env(),
    };

    // 初始化日志
    logger::init_with_verbose(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).run(cli.command).await?;

    Ok(())
}
