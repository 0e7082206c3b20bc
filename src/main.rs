use minecraft_bedrock_proxy::config::ProxyConfig;
use std::path::Path;

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_owned());
    let config = ProxyConfig::load(Path::new(&config_path))?;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if config.thread_pool_size > 0 {
        runtime.worker_threads(config.thread_pool_size);
    }

    runtime.build()?.block_on(minecraft_bedrock_proxy::run(config))
}
