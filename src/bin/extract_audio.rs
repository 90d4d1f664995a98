use clap::Parser;
use media_kit::app::audio::absolute_root;
use media_kit::config::load_file_config;
use media_kit::utils::{logger, validation::Validate};
use media_kit::{
    plan_audio_jobs, probe_encoder, AudioArgs, BatchEngine, MediaError, OpusExtractor, RunReport,
};

const RULE: &str = "======================================================================";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AudioArgs::parse();
    let started_at = chrono::Utc::now();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let file_config = load_file_config(args.config.as_deref()).unwrap_or_else(|e| fail(&e));
    let settings = args.resolve(&file_config);
    if args.verbose {
        tracing::debug!("Audio settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        fail(&e);
    }

    // 先確認編碼器存在，否則以非零結束碼離開
    match probe_encoder(&settings.encoder).await {
        Ok(version) => tracing::info!("'{}' found: {}", settings.encoder, version),
        Err(e) => {
            eprintln!("{}", RULE);
            fail(&e);
        }
    }

    let root = absolute_root(&settings.root).unwrap_or_else(|e| fail(&e));
    tracing::info!(
        "🔍 Searching '{}' for .{} files",
        root.display(),
        settings.input_extension
    );
    tracing::info!(
        "Output: Opus (.{}), bitrate {}, application {}",
        settings.output_extension,
        settings.bitrate,
        settings.application
    );

    let jobs = plan_audio_jobs(&settings).unwrap_or_else(|e| fail(&e));
    if jobs.is_empty() {
        println!("\nNo .{} files found.", settings.input_extension);
        return Ok(());
    }

    println!(
        "\nFound {} .{} file(s) to process.",
        jobs.len(),
        settings.input_extension
    );

    let monitor_enabled = args.monitor || file_config.monitoring_enabled();
    let engine = BatchEngine::new_with_monitoring(
        OpusExtractor::from_settings(&settings),
        settings.workers,
        monitor_enabled,
    );
    tracing::info!("Using {} parallel worker(s)", engine.workers());

    let summary = engine.run(jobs).await;

    println!("\n{}", RULE);
    println!("🎉 Batch processing finished.");
    println!("Video files processed: {}", summary.total);
    println!("Audio files created:   {}", summary.succeeded);
    if summary.failed > 0 {
        println!("Failed:                {}", summary.failed);
        for outcome in summary.failures() {
            println!("  ❌ {}", outcome.job.input.display());
        }
    }
    println!("{}", RULE);

    if let Some(path) = &args.report {
        RunReport::new("extract-audio", &root, started_at, &summary).write_to(path)?;
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
