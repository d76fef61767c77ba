use anyhow::Result;
use log::{info, warn};
use zk_arcade_client::{ArcadeConfig, GameType, QuestNumberClient, StopFlagClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = ArcadeConfig::from_env()?;
    info!("Probing zk-arcade API at {}", config.base_url);

    let stop_flag = StopFlagClient::from_config(&config);
    let state = stop_flag.fetch().await;
    if state.error {
        warn!("Stop flag fetch failed");
    } else {
        info!("Stop flag: stop={}", state.stop);
    }

    let quests = QuestNumberClient::from_config(&config);
    for game_type in [GameType::Beast, GameType::Parity] {
        match quests.get_quest_number(game_type, Some(0)).await {
            Ok(Some(n)) => info!("{} game 0 quest number: {}", game_type, n),
            Ok(None) => info!("{} game 0 query disabled", game_type),
            Err(e) => warn!("{} game 0 quest number unavailable: {}", game_type, e),
        }
    }

    Ok(())
}
