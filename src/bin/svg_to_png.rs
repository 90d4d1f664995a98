use clap::Parser;
use media_kit::config::load_file_config;
use media_kit::utils::{logger, validation::Validate};
use media_kit::{plan_icon_jobs, BatchEngine, IconArgs, MediaError, RunReport, SvgRasterizer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = IconArgs::parse();
    let started_at = chrono::Utc::now();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let file_config = load_file_config(args.config.as_deref()).unwrap_or_else(|e| fail(&e));
    let settings = args.resolve(&file_config);
    if args.verbose {
        tracing::debug!("Icon settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        fail(&e);
    }

    // 輸入檔不存在時直接結束，不做任何轉換
    let jobs = plan_icon_jobs(&settings).unwrap_or_else(|e| fail(&e));

    tracing::info!("🎨 Converting '{}'...", settings.input.display());

    let monitor_enabled = args.monitor || file_config.monitoring_enabled();
    let engine =
        BatchEngine::new_with_monitoring(SvgRasterizer::new(), settings.workers, monitor_enabled);
    let summary = engine.run(jobs).await;

    for outcome in summary.failures() {
        eprintln!(
            "❌ {} ({}) failed",
            outcome.job.output.display(),
            outcome.job.kind
        );
    }
    println!(
        "\n✅ All conversions finished: {} created, {} failed",
        summary.succeeded, summary.failed
    );

    if let Some(path) = &args.report {
        RunReport::new("svg-to-png", &settings.input, started_at, &summary).write_to(path)?;
        println!("📁 Report saved to: {}", path.display());
    }

    Ok(())
}

fn fail(e: &MediaError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}
