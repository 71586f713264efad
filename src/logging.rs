use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログ出力を初期化する（標準エラーへ）
///
/// RUST_LOG があればそちらを優先する。
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "menu_pipeline=debug,menu_pipeline_common=debug"
    } else {
        "warn"
    };

    // テストなどで二重に初期化された場合は無視
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
