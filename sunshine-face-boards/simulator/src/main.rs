//! 主机模拟器
//! 在 embassy 线程执行器上运行表盘、同步服务、取图任务和模拟配套设备

mod drivers;
mod script;

use std::time::{SystemTime, UNIX_EPOCH};

use embassy_executor::Spawner;
use embassy_futures::join::join5;
use embassy_time::Duration;
use simulated_rtc::{DEFAULT_BASE_MILLIS, SimulatedClock};
use static_cell::StaticCell;
use sunshine_face_common::*;
use sunshine_face_core::{
    FaceManager, FetchService, SessionGeneration, SyncEndpoints, SyncService, SyncSession,
    TimeService, WeatherStore,
};

use drivers::{ConsoleDisplay, SimulatedAssets, SimulatedCompanion, broadcast_task};

const SCREEN_SIZE: u16 = 320;
const COMPANION_LATENCY: Duration = Duration::from_millis(120);
const FETCH_LATENCY: Duration = Duration::from_millis(250);
const BROADCAST_PERIOD: Duration = Duration::from_secs(4);

static FACE_EVENTS: FaceChannel<FaceEvent> = FaceChannel::new();
static SYNC_CONTROL: FaceChannel<SyncControl> = FaceChannel::new();
static DATA_BATCHES: FaceChannel<DataEventBatch> = FaceChannel::new();
static FETCH_REQUESTS: FaceChannel<FetchRequest> = FaceChannel::new();
static FETCH_COMPLETIONS: FaceChannel<FetchCompletion> = FaceChannel::new();
static GENERATION: SessionGeneration = SessionGeneration::new();

static CONFIG: StaticCell<FaceConfig> = StaticCell::new();
static CLOCK: StaticCell<SimulatedClock> = StaticCell::new();
static WEATHER: StaticCell<WeatherStore> = StaticCell::new();

/// 第一个参数是可选的 JSON 配置文件
fn load_config() -> FaceConfig {
    let Some(path) = std::env::args().nth(1) else {
        info!("Using default configuration");
        return FaceConfig::default();
    };

    match std::fs::read(&path) {
        Ok(bytes) => match FaceConfig::from_json(&bytes) {
            Ok(config) => {
                info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                warn!("Invalid configuration in {}: {:?}, using defaults", path, e);
                FaceConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path, e);
            FaceConfig::default()
        }
    }
}

fn host_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(DEFAULT_BASE_MILLIS)
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Sunshine face simulator starting");

    let config = CONFIG.init(load_config());
    let clock: &'static SimulatedClock = CLOCK.init(SimulatedClock::new(host_time_millis(), 0));
    let weather = WEATHER.init(WeatherStore::new(WeatherState::new(
        config.display.initial_high.as_str(),
        config.display.initial_low.as_str(),
    )));
    let (writer, reader) = weather.split();

    let mut face = FaceManager::new(
        TimeService::new(clock),
        reader,
        ConsoleDisplay::new(SCREEN_SIZE, SCREEN_SIZE),
        SYNC_CONTROL.sender(),
        &config.display,
    );

    let session = SyncSession::new(writer, &GENERATION, &config.sync);
    let mut sync = SyncService::new(
        session,
        SimulatedCompanion::new(COMPANION_LATENCY, true),
        &config.sync,
        SyncEndpoints {
            control: SYNC_CONTROL.receiver(),
            batches: DATA_BATCHES.receiver(),
            completions: FETCH_COMPLETIONS.receiver(),
            requests: FETCH_REQUESTS.sender(),
            face_events: FACE_EVENTS.sender(),
        },
    );

    let mut fetch = FetchService::new(
        SimulatedAssets::new(config.display.icon_size, FETCH_LATENCY),
        &GENERATION,
        FETCH_REQUESTS.receiver(),
        FETCH_COMPLETIONS.sender(),
    );

    join5(
        face.run(FACE_EVENTS.receiver()),
        sync.run(),
        fetch.run(),
        broadcast_task(
            DATA_BATCHES.sender(),
            config.sync.weather_path.as_str(),
            BROADCAST_PERIOD,
        ),
        script::lifecycle_task(FACE_EVENTS.sender(), clock),
    )
    .await;
}
