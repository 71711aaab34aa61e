use shardvault::{config::EngineConfig, ShardvaultApp};

fn main() -> anyhow::Result<()> {
    ShardvaultApp::new(EngineConfig::default()).run()
}
