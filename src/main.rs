use std::sync::Arc;

use anyhow::Context;

use graph_checker::classifier::{Classifier, OnnxClassifier};
use graph_checker::config::BotConfig;
use graph_checker::error::ClassifierError;
use graph_checker::feed::HttpFeed;
use graph_checker::media::{HttpImageFetcher, ImageFetcher, decode_image};
use graph_checker::pipeline::{MediaLocator, MentionProcessor, ResponseComposer, SocialFeed, run_once};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().context("Failed to load configuration")?;

    eprintln!("🔎 graph-checker v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Signature: {}", config.signature_path.display());

    // ── One-shot mode ───────────────────────────────────────────────────
    if let Some(url) = config.image_to_classify.as_deref() {
        let label = classify_url(&config, url)
            .await
            .with_context(|| format!("Failed to classify {url}"))?;
        println!("{label}");
        return Ok(());
    }

    eprintln!("   Feed: {}", config.feed_base_url);
    eprintln!(
        "   Recency window: {}h, concurrency: {}",
        config.pipeline.recency_window.as_secs() / 3600,
        config.pipeline.max_concurrency
    );

    // ── Classifier (loaded once, dropped at the end of the run) ─────────
    let signature_path = config.signature_path.clone();
    let classifier: Arc<dyn Classifier> = Arc::new(
        tokio::task::spawn_blocking(move || OnnxClassifier::from_signature_file(signature_path))
            .await
            .context("Classifier loader panicked")?
            .context("Failed to load classifier")?,
    );

    let feed: Arc<dyn SocialFeed> = Arc::new(
        HttpFeed::new(
            &config.feed_base_url,
            config.feed_token.clone(),
            config.feed_timeout,
        )
        .context("Failed to create feed client")?,
    );

    let report = {
        let fetcher = HttpImageFetcher::new(config.pipeline.fetch_timeout)
            .context("Failed to create image fetcher")?;
        let processor = MentionProcessor::new(
            Arc::new(fetcher),
            classifier,
            Arc::new(ResponseComposer::new()),
            config.pipeline.clone(),
        );
        run_once(feed, &processor, config.since_id.as_deref())
            .await
            .context("Run aborted: could not list mentions")?
    };

    eprintln!(
        "   Done: {} listed, {} considered, {} marked, {} replied",
        report.listed, report.considered, report.marked, report.replied
    );
    for failure in &report.mention_failures {
        eprintln!("   ✗ mention {}: {}", failure.mention_id, failure.error);
    }
    for failure in &report.platform_failures {
        eprintln!("   ✗ platform: {failure}");
    }

    Ok(())
}

/// Download one image, classify it, and return the raw model label.
async fn classify_url(config: &BotConfig, url: &str) -> graph_checker::error::Result<String> {
    let fetcher = HttpImageFetcher::new(config.pipeline.fetch_timeout)?;
    let bytes = fetcher.fetch(&MediaLocator::new(url)).await?;
    let image = decode_image(&bytes)?;

    let signature_path = config.signature_path.clone();
    let label = tokio::task::spawn_blocking(move || {
        let classifier = OnnxClassifier::from_signature_file(signature_path)?;
        classifier.predict_label(&image)
    })
    .await
    .map_err(|e| ClassifierError::TaskAborted(e.to_string()))??;

    Ok(label)
}
